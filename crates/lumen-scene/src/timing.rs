//! Clocks for the frame loop and the animation engine.
//!
//! All timing in the scene core flows through the [`Clock`] trait so that a
//! scene can run against real time in production and against a scripted
//! timeline in tests. Timestamps are monotonic seconds as `f64`; the origin
//! is arbitrary (only differences matter).

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic time source consumed by [`Scene`](crate::compositor::Scene).
pub trait Clock {
    /// Current time in seconds. Must never decrease between calls.
    fn now(&self) -> f64;
}

/// Wall clock anchored at construction, backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose zero point is "now".
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock for tests and deterministic headless drivers.
///
/// Cloning yields a handle onto the same timeline, so a test can keep one
/// handle while the scene owns another:
///
/// ```
/// use lumen_scene::timing::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// handle.advance(0.5);
/// assert_eq!(clock.now(), 0.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time: Rc<Cell<f64>>,
}

impl ManualClock {
    /// Create a clock starting at t = 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump the timeline to an absolute time.
    pub fn set(&self, seconds: f64) {
        self.time.set(seconds);
    }

    /// Move the timeline forward by `delta` seconds.
    pub fn advance(&self, delta: f64) {
        self.time.set(self.time.get() + delta);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.time.get()
    }
}
