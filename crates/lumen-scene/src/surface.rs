//! Per-client surface state.
//!
//! A [`Surface`] is one client application's entry in the compositor: its
//! position, size, scale, opacity, visibility, and hole-punch flag, plus the
//! `animating` hint the animator toggles for the rendering backend. The
//! backend itself stays behind the [`SurfaceBackend`] trait; this crate
//! only drives the transform-setter contract and never touches pixels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Screen resolution used to clamp surface sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        // Stock set-top output mode.
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// A surface's rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

/// Full transform snapshot of a surface, used by the animator for its
/// start/end endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformSnapshot {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub scale_x: f64,
    pub scale_y: f64,
    pub opacity: f64,
}

/// Transform-setter contract of the rendering backend.
///
/// One handle per client surface. The scene core calls these as state
/// changes; compositing, hole-punch rectangle computation, and blitting all
/// happen on the other side.
pub trait SurfaceBackend {
    fn set_position(&mut self, x: i32, y: i32);
    fn set_size(&mut self, width: u32, height: u32);
    fn set_scale(&mut self, scale_x: f64, scale_y: f64);
    fn set_opacity(&mut self, opacity: f64);
    fn set_animating(&mut self, animating: bool);
}

/// One client entry in the compositor.
///
/// Names are stored lowercased; the owning scene keys every lookup the same
/// way. Setters keep local state and the backend handle in sync.
pub struct Surface {
    name: String,
    display_name: Option<String>,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    scale_x: f64,
    scale_y: f64,
    opacity: f64,
    visible: bool,
    hole_punch: bool,
    animating: bool,
    backend: Option<Box<dyn SurfaceBackend>>,
}

impl Surface {
    /// Create a surface with default transform state: origin position, full
    /// screen size, unit scale, fully opaque, visible.
    pub fn new(name: impl Into<String>, display_name: Option<String>, resolution: Resolution) -> Self {
        Self {
            name: name.into(),
            display_name,
            x: 0,
            y: 0,
            width: resolution.width,
            height: resolution.height,
            scale_x: 1.0,
            scale_y: 1.0,
            opacity: 1.0,
            visible: true,
            hole_punch: false,
            animating: false,
            backend: None,
        }
    }

    /// Attach (or replace) the rendering backend handle for this surface.
    pub fn attach_backend(&mut self, backend: Box<dyn SurfaceBackend>) {
        self.backend = Some(backend);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            x: self.x,
            y: self.y,
            w: self.width,
            h: self.height,
        }
    }

    pub fn scale(&self) -> (f64, f64) {
        (self.scale_x, self.scale_y)
    }

    /// Opacity as a ratio in `[0, 1]`.
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn hole_punch(&self) -> bool {
        self.hole_punch
    }

    /// Rendering optimization hint: true while an animation targets this
    /// surface. Not a correctness gate.
    pub fn animating(&self) -> bool {
        self.animating
    }

    pub fn snapshot(&self) -> TransformSnapshot {
        TransformSnapshot {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            opacity: self.opacity,
        }
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
        if let Some(backend) = self.backend.as_mut() {
            backend.set_position(x, y);
        }
    }

    /// Set the size, clamped to the screen resolution.
    pub fn set_size(&mut self, width: u32, height: u32, resolution: Resolution) {
        self.width = width.min(resolution.width);
        self.height = height.min(resolution.height);
        if let Some(backend) = self.backend.as_mut() {
            backend.set_size(self.width, self.height);
        }
    }

    pub fn set_scale(&mut self, scale_x: f64, scale_y: f64) {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        if let Some(backend) = self.backend.as_mut() {
            backend.set_scale(scale_x, scale_y);
        }
    }

    /// Set the opacity ratio, clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity.clamp(0.0, 1.0);
        if let Some(backend) = self.backend.as_mut() {
            backend.set_opacity(self.opacity);
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_hole_punch(&mut self, hole_punch: bool) {
        self.hole_punch = hole_punch;
    }

    pub fn set_animating(&mut self, animating: bool) {
        self.animating = animating;
        if let Some(backend) = self.backend.as_mut() {
            backend.set_animating(animating);
        }
    }

    /// Apply a full snapshot, clamping size and opacity on the way in.
    pub fn apply(&mut self, snapshot: TransformSnapshot, resolution: Resolution) {
        self.set_position(snapshot.x, snapshot.y);
        self.set_size(snapshot.width, snapshot.height, resolution);
        self.set_scale(snapshot.scale_x, snapshot.scale_y);
        self.set_opacity(snapshot.opacity);
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("name", &self.name)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("scale_x", &self.scale_x)
            .field("scale_y", &self.scale_y)
            .field("opacity", &self.opacity)
            .field("visible", &self.visible)
            .field("hole_punch", &self.hole_punch)
            .field("animating", &self.animating)
            .field("backend", &self.backend.as_ref().map(|_| "..."))
            .finish()
    }
}
