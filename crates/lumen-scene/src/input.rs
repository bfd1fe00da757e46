//! Keyboard input model: modifier flags, key events, and the per-keycode
//! intercept registry.
//!
//! Intercept matching is EXACT on modifier flags: an intercept registered
//! for `CTRL` does not fire on `CTRL|SHIFT`. Any matching intercept
//! suppresses default focus routing for that event.

use std::collections::HashMap;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Modifier key bitmask.
///
/// Built from wire names by [`KeyModifiers::from_names`]; unknown names are
/// ignored (fail-open, matching the tween registry's policy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyModifiers(u32);

impl KeyModifiers {
    pub const NONE: Self = Self(0);
    pub const CTRL: Self = Self(1 << 0);
    pub const ALT: Self = Self(1 << 1);
    pub const SHIFT: Self = Self(1 << 2);

    /// Build a mask from wire names ("ctrl", "alt", "shift").
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut flags = Self::NONE;
        for name in names {
            match name.as_ref().to_ascii_lowercase().as_str() {
                "ctrl" | "control" => flags = flags | Self::CTRL,
                "alt" => flags = flags | Self::ALT,
                "shift" => flags = flags | Self::SHIFT,
                other => debug!(name = other, "ignoring unknown key modifier"),
            }
        }
        flags
    }

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl BitOr for KeyModifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Press or release edge of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyState {
    Pressed,
    Released,
}

/// A keyboard event as routed by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub code: u32,
    pub modifiers: KeyModifiers,
    pub state: KeyState,
}

impl KeyEvent {
    pub fn pressed(code: u32, modifiers: KeyModifiers) -> Self {
        Self {
            code,
            modifiers,
            state: KeyState::Pressed,
        }
    }

    pub fn released(code: u32, modifiers: KeyModifiers) -> Self {
        Self {
            code,
            modifiers,
            state: KeyState::Released,
        }
    }
}

/// One intercept registration: `client` receives the keycode when the event
/// flags equal `modifiers` exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyIntercept {
    pub client: String,
    pub modifiers: KeyModifiers,
}

/// Per-keycode intercept registry.
///
/// Registration order is preserved per keycode; `(modifiers, client)` pairs
/// are unique within one keycode.
#[derive(Debug, Default)]
pub struct KeyInterceptTable {
    intercepts: HashMap<u32, Vec<KeyIntercept>>,
}

impl KeyInterceptTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an intercept. Returns false on a duplicate
    /// `(modifiers, client)` pair for the keycode.
    pub fn add(&mut self, code: u32, client: &str, modifiers: KeyModifiers) -> bool {
        let entries = self.intercepts.entry(code).or_default();
        if entries
            .iter()
            .any(|entry| entry.modifiers == modifiers && entry.client == client)
        {
            return false;
        }
        entries.push(KeyIntercept {
            client: client.to_string(),
            modifiers,
        });
        true
    }

    /// Remove an intercept. Silent when the pair was never registered;
    /// returns whether an entry was removed.
    pub fn remove(&mut self, code: u32, client: &str, modifiers: KeyModifiers) -> bool {
        let Some(entries) = self.intercepts.get_mut(&code) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|entry| !(entry.modifiers == modifiers && entry.client == client));
        let removed = entries.len() != before;
        if entries.is_empty() {
            self.intercepts.remove(&code);
        }
        removed
    }

    /// Drop every registration owned by `client`, across all keycodes.
    pub fn remove_client(&mut self, client: &str) {
        self.intercepts.retain(|_, entries| {
            entries.retain(|entry| entry.client != client);
            !entries.is_empty()
        });
    }

    /// Clients whose intercepts match the event exactly, in registration
    /// order.
    pub fn matching(&self, code: u32, modifiers: KeyModifiers) -> Vec<&str> {
        self.intercepts
            .get(&code)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.modifiers == modifiers)
                    .map(|entry| entry.client.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.intercepts.is_empty()
    }
}
