//! The per-frame animation engine.
//!
//! The [`Animator`] owns every in-flight [`ActiveAnimation`] and advances
//! them all in one pass per tick. It writes interpolated values straight
//! into the surface registry and reports one aggregated [`AnimationFrame`]
//! per tick, or nothing when no animation changed anything.
//!
//! Removal is two-pass: completed records are collected during the scan and
//! dropped afterwards, so the scan itself never mutates the record list.

use std::collections::HashMap;

use tracing::debug;

use crate::events::{AnimationFrame, SurfaceDelta};
use crate::surface::{Resolution, Surface};

use super::record::{ActiveAnimation, AnimationRequest, Phase};

/// The scene's surface registry, keyed by lowercased client name.
pub type SurfaceMap = HashMap<String, Surface>;

/// Time-driven interpolation engine over the surface registry.
#[derive(Debug, Default)]
pub struct Animator {
    active: Vec<ActiveAnimation>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while an animation targets `name`.
    pub fn is_animating(&self, name: &str) -> bool {
        self.active.iter().any(|record| record.target == name)
    }

    pub fn count(&self) -> usize {
        self.active.len()
    }

    /// Insert an animation for `target`.
    ///
    /// If a record already exists for the target it is silently
    /// fast-forwarded first (end values applied, hint cleared, record
    /// removed) before the new record snapshots the now-final current
    /// state. A missing target is a silent no-op.
    pub fn add(
        &mut self,
        target: &str,
        request: AnimationRequest,
        now: f64,
        surfaces: &mut SurfaceMap,
        resolution: Resolution,
    ) {
        if !surfaces.contains_key(target) {
            debug!(client = %target, "ignoring animation for unknown target");
            return;
        }
        self.fast_forward(target, surfaces, resolution);

        let Some(surface) = surfaces.get_mut(target) else {
            return;
        };
        let record = ActiveAnimation::new(target.to_string(), surface.snapshot(), &request, now);
        surface.set_animating(true);
        self.active.push(record);
    }

    /// Advance every record to `now`. Returns the aggregated change event
    /// for this tick, or `None` when no animation produced a change.
    pub fn advance(
        &mut self,
        now: f64,
        surfaces: &mut SurfaceMap,
        resolution: Resolution,
    ) -> Option<AnimationFrame> {
        if self.active.is_empty() {
            return None;
        }

        let mut deltas: Vec<SurfaceDelta> = Vec::new();
        let mut done: Vec<usize> = Vec::new();

        for (index, record) in self.active.iter().enumerate() {
            let Some(surface) = surfaces.get_mut(&record.target) else {
                // Target destroyed while the record was in flight.
                done.push(index);
                continue;
            };

            match record.phase(now) {
                Phase::Pending => {}
                Phase::Active => {
                    let elapsed = now - record.start_time;
                    let t = (elapsed / record.duration).fract();
                    let d = record.tween.evaluate(t);
                    let applied = record.interpolated(d, resolution);
                    surface.apply(applied, resolution);
                    if let Some(delta) = record.delta(&applied) {
                        deltas.push(delta);
                    }
                }
                Phase::Completing => {
                    // Exact end values, not the last interpolation step.
                    let applied = record.end_clamped(resolution);
                    surface.apply(applied, resolution);
                    surface.set_animating(false);
                    done.push(index);
                    if let Some(delta) = record.delta(&applied) {
                        deltas.push(delta);
                    }
                }
            }
        }

        for index in done.into_iter().rev() {
            self.active.remove(index);
        }

        if deltas.is_empty() {
            None
        } else {
            Some(AnimationFrame { surfaces: deltas })
        }
    }

    /// Cancel-and-snap: apply exact end values, clear the hint, remove the
    /// record. No event. Returns whether a record existed.
    pub fn fast_forward(
        &mut self,
        target: &str,
        surfaces: &mut SurfaceMap,
        resolution: Resolution,
    ) -> bool {
        let Some(index) = self.active.iter().position(|record| record.target == target) else {
            return false;
        };
        let record = self.active.remove(index);
        if let Some(surface) = surfaces.get_mut(target) {
            surface.apply(record.end_clamped(resolution), resolution);
            surface.set_animating(false);
        }
        true
    }

    /// Cancel-in-place: clear the hint and remove the record, leaving the
    /// target at its last interpolated state. No event. Returns whether a
    /// record existed.
    pub fn stop(&mut self, target: &str, surfaces: &mut SurfaceMap) -> bool {
        let Some(index) = self.active.iter().position(|record| record.target == target) else {
            return false;
        };
        self.active.remove(index);
        if let Some(surface) = surfaces.get_mut(target) {
            surface.set_animating(false);
        }
        true
    }

    /// Drop any record for `target` without touching the surface (used when
    /// the target itself is being destroyed).
    pub fn drop_target(&mut self, target: &str) {
        self.active.retain(|record| record.target != target);
    }
}
