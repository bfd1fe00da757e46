//! Animation requests and in-flight records.
//!
//! An [`AnimationRequest`] describes the destination a caller asked for;
//! any field left `None` defaults to the target's current value at add time
//! and is therefore a no-op for that field. The [`ActiveAnimation`] record
//! freezes both endpoints and the absolute timeline when it is inserted, so
//! later mutations of the surface do not retarget a running animation.

use crate::events::SurfaceDelta;
use crate::surface::{Resolution, TransformSnapshot};

use super::tween::Tween;

/// Caller-facing description of one property transition.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationRequest {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    /// Destination opacity as a ratio in `[0, 1]`.
    pub opacity: Option<f64>,
    /// Seconds, clamped to `>= 0`. Zero means "snap on the next tick".
    pub duration: f64,
    /// Seconds before interpolation begins.
    pub delay: f64,
    pub tween: Tween,
}

impl AnimationRequest {
    pub fn new(duration: f64) -> Self {
        Self {
            x: None,
            y: None,
            width: None,
            height: None,
            scale_x: None,
            scale_y: None,
            opacity: None,
            duration,
            delay: 0.0,
            tween: Tween::Linear,
        }
    }

    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_x(mut self, x: i32) -> Self {
        self.x = Some(x);
        self
    }

    pub fn with_y(mut self, y: i32) -> Self {
        self.y = Some(y);
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = Some(scale_x);
        self.scale_y = Some(scale_y);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_tween(mut self, tween: Tween) -> Self {
        self.tween = tween;
        self
    }
}

/// Lifecycle phase of a record at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// Before the delay has elapsed: no mutation, no event contribution.
    Pending,
    /// Interpolating between the endpoints.
    Active,
    /// At or past the end time (or zero duration): force exact end values
    /// and remove.
    Completing,
}

/// One in-flight animation. At most one exists per target at any time.
#[derive(Debug, Clone)]
pub struct ActiveAnimation {
    pub(crate) target: String,
    pub(crate) start: TransformSnapshot,
    pub(crate) end: TransformSnapshot,
    pub(crate) duration: f64,
    pub(crate) start_time: f64,
    pub(crate) end_time: f64,
    pub(crate) tween: Tween,
}

impl ActiveAnimation {
    /// Freeze a request against the target's current state.
    pub(crate) fn new(
        target: String,
        current: TransformSnapshot,
        request: &AnimationRequest,
        now: f64,
    ) -> Self {
        let duration = request.duration.max(0.0);
        let delay = request.delay.max(0.0);
        let end = TransformSnapshot {
            x: request.x.unwrap_or(current.x),
            y: request.y.unwrap_or(current.y),
            width: request.width.unwrap_or(current.width),
            height: request.height.unwrap_or(current.height),
            scale_x: request.scale_x.unwrap_or(current.scale_x),
            scale_y: request.scale_y.unwrap_or(current.scale_y),
            opacity: request
                .opacity
                .map(|o| o.clamp(0.0, 1.0))
                .unwrap_or(current.opacity),
        };
        Self {
            target,
            start: current,
            end,
            duration,
            start_time: now + delay,
            end_time: now + delay + duration,
            tween: request.tween,
        }
    }

    pub(crate) fn phase(&self, now: f64) -> Phase {
        if now < self.start_time {
            Phase::Pending
        } else if self.duration <= 0.0 || now >= self.end_time {
            Phase::Completing
        } else {
            Phase::Active
        }
    }

    /// Interpolate between the endpoints with blend factor `d`, clamping the
    /// fields that have hard bounds. `d` may leave `[0, 1]` for overshooting
    /// tweens; sizes clamp to the screen and opacity to `[0, 1]` regardless.
    pub(crate) fn interpolated(&self, d: f64, resolution: Resolution) -> TransformSnapshot {
        TransformSnapshot {
            x: blend(f64::from(self.start.x), f64::from(self.end.x), d).round() as i32,
            y: blend(f64::from(self.start.y), f64::from(self.end.y), d).round() as i32,
            width: blend_size(self.start.width, self.end.width, d, resolution.width),
            height: blend_size(self.start.height, self.end.height, d, resolution.height),
            scale_x: blend(self.start.scale_x, self.end.scale_x, d),
            scale_y: blend(self.start.scale_y, self.end.scale_y, d),
            opacity: blend(self.start.opacity, self.end.opacity, d).clamp(0.0, 1.0),
        }
    }

    /// Exact end values with the standing size clamp applied. Used at
    /// completion and fast-forward so the boundary carries no float drift.
    pub(crate) fn end_clamped(&self, resolution: Resolution) -> TransformSnapshot {
        TransformSnapshot {
            width: self.end.width.min(resolution.width),
            height: self.end.height.min(resolution.height),
            ..self.end
        }
    }

    /// Sparse change entry for the applied values: only fields whose start
    /// and end endpoints differ are reported. Returns `None` when the record
    /// changes nothing worth reporting.
    pub(crate) fn delta(&self, applied: &TransformSnapshot) -> Option<SurfaceDelta> {
        let mut delta = SurfaceDelta::new(self.target.clone());
        if self.start.x != self.end.x {
            delta.x = Some(applied.x);
        }
        if self.start.y != self.end.y {
            delta.y = Some(applied.y);
        }
        if self.start.width != self.end.width {
            delta.w = Some(applied.width);
        }
        if self.start.height != self.end.height {
            delta.h = Some(applied.height);
        }
        if self.start.scale_x != self.end.scale_x {
            delta.sx = Some(applied.scale_x);
        }
        if self.start.scale_y != self.end.scale_y {
            delta.sy = Some(applied.scale_y);
        }
        if delta.is_empty() { None } else { Some(delta) }
    }
}

fn blend(a: f64, b: f64, d: f64) -> f64 {
    a + (b - a) * d
}

fn blend_size(a: u32, b: u32, d: f64, max: u32) -> u32 {
    blend(f64::from(a), f64::from(b), d)
        .round()
        .clamp(0.0, f64::from(max)) as u32
}
