//! Scene core of the Lumen compositor shell.
//!
//! This crate is the single-threaded heart of the shell: a z-ordered
//! collection of client surfaces with focus tracking and key-intercept
//! routing ([`compositor::Scene`]), driven once per frame, plus the
//! animation engine that interpolates surface transforms over time
//! ([`animation::Animator`]).
//!
//! Rendering, input sourcing, and transport are collaborators, not
//! residents: pixels live behind [`surface::SurfaceBackend`], time behind
//! [`timing::Clock`], and everything the outside world needs to hear lands
//! in an event queue the embedder drains each tick.
//!
//! ```
//! use lumen_scene::animation::AnimationRequest;
//! use lumen_scene::compositor::Scene;
//! use lumen_scene::surface::Resolution;
//! use lumen_scene::timing::ManualClock;
//!
//! let clock = ManualClock::new();
//! let mut scene = Scene::with_clock(Resolution::default(), Box::new(clock.clone()));
//!
//! scene.create_display("player", None);
//! scene.add_animation("player", AnimationRequest::new(1.0).with_x(200));
//!
//! clock.advance(0.5);
//! scene.update();
//!
//! assert_eq!(scene.bounds("player").unwrap().x, 100);
//! assert_eq!(scene.drain_events().count(), 1);
//! ```

pub mod animation;
pub mod compositor;
pub mod events;
pub mod input;
pub mod surface;
pub mod timing;

pub use animation::{AnimationRequest, Animator, Tween};
pub use compositor::Scene;
pub use events::{AnimationFrame, EventQueue, SceneEvent, SurfaceDelta};
pub use input::{KeyEvent, KeyModifiers, KeyState};
pub use surface::{Bounds, Resolution, Surface, SurfaceBackend};
pub use timing::{Clock, ManualClock, MonotonicClock};
