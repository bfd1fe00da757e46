//! Scene events drained by the embedding layer.
//!
//! The scene collects everything the outside world needs to hear about,
//! meaning the once-per-frame batched animation update and key-event
//! deliveries, into an [`EventQueue`]. The embedder (IPC layer, test
//! harness) drains the queue after each tick; nothing is pushed when
//! nothing changed.

use std::collections::VecDeque;

use serde::Serialize;

use crate::input::KeyEvent;

/// Sparse per-client change entry within one animation frame.
///
/// Only fields whose animation start and end values differ are populated;
/// a field that never changes is never reported even while the animation
/// runs. Opacity is applied to the surface but is not part of the outbound
/// contract.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SurfaceDelta {
    pub client: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sx: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sy: Option<f64>,
}

impl SurfaceDelta {
    pub fn new(client: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            ..Self::default()
        }
    }

    /// True when no field changed (such a delta is never emitted).
    pub fn is_empty(&self) -> bool {
        self.x.is_none()
            && self.y.is_none()
            && self.w.is_none()
            && self.h.is_none()
            && self.sx.is_none()
            && self.sy.is_none()
    }
}

/// The aggregated animation update for one frame: every client whose
/// transform changed this tick, at most one event per frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationFrame {
    pub surfaces: Vec<SurfaceDelta>,
}

/// Everything the scene reports outward.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneEvent {
    /// Batched animation changes for one tick.
    Animation(AnimationFrame),
    /// A key event delivered to `client` by the dispatch algorithm.
    Key { client: String, event: KeyEvent },
}

impl SceneEvent {
    /// The client a key event was delivered to, if this is one.
    pub fn key_client(&self) -> Option<&str> {
        match self {
            Self::Key { client, .. } => Some(client),
            Self::Animation(_) => None,
        }
    }
}

/// FIFO queue of scene events, drained once per frame by the embedder.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<SceneEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SceneEvent) {
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<SceneEvent> {
        self.events.pop_front()
    }

    pub fn peek(&self) -> Option<&SceneEvent> {
        self.events.front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drain all pending events in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = SceneEvent> + '_ {
        self.events.drain(..)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyModifiers;

    #[test]
    fn test_delta_is_empty() {
        let mut delta = SurfaceDelta::new("app1");
        assert!(delta.is_empty());
        delta.sx = Some(2.0);
        assert!(!delta.is_empty());
    }

    #[test]
    fn test_queue_fifo_order() {
        let mut queue = EventQueue::new();
        assert!(queue.is_empty());

        queue.push(SceneEvent::Key {
            client: "a".to_string(),
            event: KeyEvent::pressed(10, KeyModifiers::NONE),
        });
        queue.push(SceneEvent::Key {
            client: "b".to_string(),
            event: KeyEvent::pressed(11, KeyModifiers::NONE),
        });
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.pop().unwrap().key_client(), Some("a"));
        assert_eq!(queue.pop().unwrap().key_client(), Some("b"));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_queue_drain_empties() {
        let mut queue = EventQueue::new();
        queue.push(SceneEvent::Animation(AnimationFrame { surfaces: vec![] }));
        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(drained.len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_delta_serializes_sparse() {
        let delta = SurfaceDelta {
            client: "app1".to_string(),
            x: Some(100),
            ..SurfaceDelta::default()
        };
        let json = serde_json::to_string(&delta).unwrap();
        assert_eq!(json, r#"{"client":"app1","x":100}"#);
    }

    #[test]
    fn test_animation_event_serializes_tagged() {
        let event = SceneEvent::Animation(AnimationFrame {
            surfaces: vec![SurfaceDelta {
                client: "app1".to_string(),
                y: Some(-4),
                ..SurfaceDelta::default()
            }],
        });
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"animation","surfaces":[{"client":"app1","y":-4}]}"#
        );
    }
}
