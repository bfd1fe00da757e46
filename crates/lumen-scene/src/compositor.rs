//! The compositor scene: z-ordered client surfaces, focus, key intercepts,
//! and the per-frame update entry point.
//!
//! All operations are keyed by case-insensitive client name and follow the
//! permissive contract of the surrounding control API: an unknown name is a
//! no-op returning `false`, never an error, and the update loop survives any
//! failed operation.
//!
//! One [`Scene`] is one independent compositor; nothing here is global.
//! Construction injects the clock, so tests run whole scenes against a
//! scripted timeline.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::animation::{AnimationRequest, Animator};
use crate::events::{EventQueue, SceneEvent};
use crate::input::{KeyEvent, KeyInterceptTable, KeyModifiers};
use crate::surface::{Bounds, Resolution, Surface, SurfaceBackend};
use crate::timing::{Clock, MonotonicClock};

/// A z-ordered collection of client surfaces with focus and key routing.
pub struct Scene {
    surfaces: HashMap<String, Surface>,
    /// Client names front-to-back; index 0 is frontmost.
    stack: Vec<String>,
    focus: Option<String>,
    intercepts: KeyInterceptTable,
    animator: Animator,
    resolution: Resolution,
    clock: Box<dyn Clock>,
    events: EventQueue,
    /// Only the first surface ever created receives automatic focus.
    focus_granted_once: bool,
}

impl Scene {
    /// Create a scene driven by the real monotonic clock.
    pub fn new(resolution: Resolution) -> Self {
        Self::with_clock(resolution, Box::new(MonotonicClock::new()))
    }

    /// Create a scene with an injected time source.
    pub fn with_clock(resolution: Resolution, clock: Box<dyn Clock>) -> Self {
        Self {
            surfaces: HashMap::new(),
            stack: Vec::new(),
            focus: None,
            intercepts: KeyInterceptTable::new(),
            animator: Animator::new(),
            resolution,
            clock,
            events: EventQueue::new(),
            focus_granted_once: false,
        }
    }

    fn key(name: &str) -> String {
        name.to_ascii_lowercase()
    }

    // ------------------------------------------------------------------
    // Lifecycle and z-order
    // ------------------------------------------------------------------

    /// Create a client surface at the front of the z-order. Fails if the
    /// name is already taken. The first surface ever created is focused.
    pub fn create_display(&mut self, name: &str, display_name: Option<&str>) -> bool {
        let key = Self::key(name);
        if self.surfaces.contains_key(&key) {
            warn!(client = %key, "create_display: name already exists");
            return false;
        }

        let surface = Surface::new(key.clone(), display_name.map(str::to_string), self.resolution);
        self.surfaces.insert(key.clone(), surface);
        self.stack.insert(0, key.clone());

        if !self.focus_granted_once {
            self.focus = Some(key.clone());
            self.focus_granted_once = true;
        }
        debug!(client = %key, "created display");
        true
    }

    /// Attach a rendering backend handle to a client surface.
    pub fn attach_backend(&mut self, name: &str, backend: Box<dyn SurfaceBackend>) -> bool {
        let key = Self::key(name);
        match self.surfaces.get_mut(&key) {
            Some(surface) => {
                surface.attach_backend(backend);
                true
            }
            None => false,
        }
    }

    /// Destroy a client surface. Clears focus if it was focused (focus is
    /// not handed to any other surface), drops its animation record and key
    /// intercepts.
    pub fn kill(&mut self, name: &str) -> bool {
        let key = Self::key(name);
        if self.surfaces.remove(&key).is_none() {
            return false;
        }
        self.stack.retain(|entry| entry != &key);
        if self.focus.as_deref() == Some(key.as_str()) {
            self.focus = None;
        }
        self.animator.drop_target(&key);
        self.intercepts.remove_client(&key);
        debug!(client = %key, "killed display");
        true
    }

    pub fn move_to_front(&mut self, name: &str) -> bool {
        let key = Self::key(name);
        let Some(position) = self.stack.iter().position(|entry| entry == &key) else {
            return false;
        };
        let entry = self.stack.remove(position);
        self.stack.insert(0, entry);
        true
    }

    pub fn move_to_back(&mut self, name: &str) -> bool {
        let key = Self::key(name);
        let Some(position) = self.stack.iter().position(|entry| entry == &key) else {
            return false;
        };
        let entry = self.stack.remove(position);
        self.stack.push(entry);
        true
    }

    /// Reinsert `name` immediately behind `target` in the z-order. Fails
    /// when either is missing or they are the same surface.
    pub fn move_behind(&mut self, name: &str, target: &str) -> bool {
        let key = Self::key(name);
        let target_key = Self::key(target);
        if key == target_key {
            return false;
        }
        if !self.stack.iter().any(|entry| entry == &target_key) {
            return false;
        }
        let Some(position) = self.stack.iter().position(|entry| entry == &key) else {
            return false;
        };
        let entry = self.stack.remove(position);
        // Target index may have shifted after the removal.
        let target_position = self
            .stack
            .iter()
            .position(|candidate| candidate == &target_key)
            .expect("target verified present");
        self.stack.insert(target_position + 1, entry);
        true
    }

    /// Front-to-back stacking order (frontmost first).
    pub fn stacking_order(&self) -> Vec<&str> {
        self.stack.iter().map(String::as_str).collect()
    }

    /// Surfaces in front-to-back order, for the rendering backend.
    pub fn front_to_back(&self) -> impl Iterator<Item = &Surface> + '_ {
        self.stack.iter().filter_map(|name| self.surfaces.get(name))
    }

    pub fn surface(&self, name: &str) -> Option<&Surface> {
        self.surfaces.get(&Self::key(name))
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    // ------------------------------------------------------------------
    // Focus and key routing
    // ------------------------------------------------------------------

    pub fn set_focus(&mut self, name: &str) -> bool {
        let key = Self::key(name);
        if !self.surfaces.contains_key(&key) {
            return false;
        }
        self.focus = Some(key);
        true
    }

    pub fn focused(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    /// Register a key intercept for a client. Fails on an unknown client
    /// and on a duplicate `(modifiers, client)` pair for the keycode.
    pub fn add_key_intercept(&mut self, name: &str, code: u32, modifiers: KeyModifiers) -> bool {
        let key = Self::key(name);
        if !self.surfaces.contains_key(&key) {
            return false;
        }
        self.intercepts.add(code, &key, modifiers)
    }

    /// Remove a key intercept. Silent when the pair was never registered.
    pub fn remove_key_intercept(&mut self, name: &str, code: u32, modifiers: KeyModifiers) -> bool {
        let key = Self::key(name);
        if !self.surfaces.contains_key(&key) {
            return false;
        }
        self.intercepts.remove(code, &key, modifiers)
    }

    /// Route a key press. Every intercept whose flags equal the event's
    /// exactly receives it; any match suppresses focus delivery. Returns
    /// whether anyone received the event.
    pub fn on_key_press(&mut self, code: u32, modifiers: KeyModifiers) -> bool {
        self.dispatch_key(KeyEvent::pressed(code, modifiers))
    }

    /// Route a key release with the same algorithm as presses.
    pub fn on_key_release(&mut self, code: u32, modifiers: KeyModifiers) -> bool {
        self.dispatch_key(KeyEvent::released(code, modifiers))
    }

    fn dispatch_key(&mut self, event: KeyEvent) -> bool {
        let intercepted: Vec<String> = self
            .intercepts
            .matching(event.code, event.modifiers)
            .into_iter()
            .map(str::to_string)
            .collect();

        if !intercepted.is_empty() {
            for client in intercepted {
                self.events.push(SceneEvent::Key { client, event });
            }
            return true;
        }

        if let Some(client) = self.focus.clone() {
            self.events.push(SceneEvent::Key { client, event });
            return true;
        }
        false
    }

    // ------------------------------------------------------------------
    // Transform state
    // ------------------------------------------------------------------

    pub fn bounds(&self, name: &str) -> Option<Bounds> {
        self.surface(name).map(Surface::bounds)
    }

    /// Partial bounds update; omitted fields keep their current value.
    /// Width and height clamp to the screen resolution.
    pub fn set_bounds(
        &mut self,
        name: &str,
        x: Option<i32>,
        y: Option<i32>,
        w: Option<u32>,
        h: Option<u32>,
    ) -> bool {
        let resolution = self.resolution;
        let Some(surface) = self.surfaces.get_mut(&Self::key(name)) else {
            return false;
        };
        let current = surface.bounds();
        surface.set_position(x.unwrap_or(current.x), y.unwrap_or(current.y));
        surface.set_size(w.unwrap_or(current.w), h.unwrap_or(current.h), resolution);
        true
    }

    pub fn scale(&self, name: &str) -> Option<(f64, f64)> {
        self.surface(name).map(Surface::scale)
    }

    pub fn set_scale(&mut self, name: &str, sx: Option<f64>, sy: Option<f64>) -> bool {
        let Some(surface) = self.surfaces.get_mut(&Self::key(name)) else {
            return false;
        };
        let (current_x, current_y) = surface.scale();
        surface.set_scale(sx.unwrap_or(current_x), sy.unwrap_or(current_y));
        true
    }

    /// Opacity as an integer percentage in `[0, 100]`.
    pub fn opacity(&self, name: &str) -> Option<u32> {
        self.surface(name)
            .map(|surface| (surface.opacity() * 100.0).round() as u32)
    }

    /// Compose `percent` multiplicatively against the current opacity and
    /// clamp. `set_opacity(50)` on an opaque surface yields 50%; a second
    /// call yields 25%. This accumulation is the documented contract, not a
    /// plain assignment.
    pub fn set_opacity(&mut self, name: &str, percent: u32) -> bool {
        let Some(surface) = self.surfaces.get_mut(&Self::key(name)) else {
            return false;
        };
        let composed = surface.opacity() * (f64::from(percent) / 100.0);
        surface.set_opacity(composed);
        true
    }

    pub fn visibility(&self, name: &str) -> Option<bool> {
        self.surface(name).map(Surface::visible)
    }

    pub fn set_visibility(&mut self, name: &str, visible: bool) -> bool {
        let Some(surface) = self.surfaces.get_mut(&Self::key(name)) else {
            return false;
        };
        surface.set_visible(visible);
        true
    }

    pub fn hole_punch(&self, name: &str) -> Option<bool> {
        self.surface(name).map(Surface::hole_punch)
    }

    pub fn set_hole_punch(&mut self, name: &str, hole_punch: bool) -> bool {
        let Some(surface) = self.surfaces.get_mut(&Self::key(name)) else {
            return false;
        };
        surface.set_hole_punch(hole_punch);
        true
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Change the clamp bound used for subsequent size writes.
    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.resolution = Resolution::new(width, height);
    }

    // ------------------------------------------------------------------
    // Animation entry points
    // ------------------------------------------------------------------

    /// Submit an animation for a client. The request's unspecified fields
    /// default to the client's current transform. Replaces (by
    /// fast-forwarding) any animation already in flight for the client.
    pub fn add_animation(&mut self, name: &str, request: AnimationRequest) -> bool {
        let key = Self::key(name);
        if !self.surfaces.contains_key(&key) {
            return false;
        }
        let now = self.clock.now();
        self.animator
            .add(&key, request, now, &mut self.surfaces, self.resolution);
        true
    }

    /// Snap an in-flight animation to its end state. No event is emitted.
    pub fn fast_forward_animation(&mut self, name: &str) -> bool {
        let key = Self::key(name);
        self.animator
            .fast_forward(&key, &mut self.surfaces, self.resolution)
    }

    /// Cancel an in-flight animation in place, leaving the surface at its
    /// last interpolated state. No event is emitted.
    pub fn stop_animation(&mut self, name: &str) -> bool {
        let key = Self::key(name);
        self.animator.stop(&key, &mut self.surfaces)
    }

    pub fn is_animating(&self, name: &str) -> bool {
        self.animator.is_animating(&Self::key(name))
    }

    // ------------------------------------------------------------------
    // Frame loop
    // ------------------------------------------------------------------

    /// The once-per-tick entry point: advances every animation and queues
    /// the batched change event when anything moved.
    pub fn update(&mut self) {
        let now = self.clock.now();
        self.update_at(now);
    }

    /// [`update`](Self::update) against an explicit timestamp.
    pub fn update_at(&mut self, now: f64) {
        if let Some(frame) = self
            .animator
            .advance(now, &mut self.surfaces, self.resolution)
        {
            self.events.push(SceneEvent::Animation(frame));
        }
    }

    /// Drain everything the scene reported since the last drain.
    pub fn drain_events(&mut self) -> impl Iterator<Item = SceneEvent> + '_ {
        self.events.drain()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::ManualClock;

    fn scene() -> (Scene, ManualClock) {
        let clock = ManualClock::new();
        let scene = Scene::with_clock(Resolution::new(1280, 720), Box::new(clock.clone()));
        (scene, clock)
    }

    #[test]
    fn test_create_display_rejects_duplicate() {
        let (mut scene, _clock) = scene();
        assert!(scene.create_display("app1", None));
        assert!(!scene.create_display("app1", None));
        // Lookups are case-insensitive, so a different casing is still a
        // duplicate.
        assert!(!scene.create_display("App1", None));
        assert_eq!(scene.surface_count(), 1);
    }

    #[test]
    fn test_first_display_gets_focus() {
        let (mut scene, _clock) = scene();
        scene.create_display("app1", None);
        scene.create_display("app2", None);
        assert_eq!(scene.focused(), Some("app1"));
    }

    #[test]
    fn test_new_displays_stack_in_front() {
        let (mut scene, _clock) = scene();
        scene.create_display("a", None);
        scene.create_display("b", None);
        scene.create_display("c", None);
        assert_eq!(scene.stacking_order(), ["c", "b", "a"]);
    }

    #[test]
    fn test_move_to_back_reorders() {
        let (mut scene, _clock) = scene();
        // Build z-order [A, B, C] front-first.
        scene.create_display("c", None);
        scene.create_display("b", None);
        scene.create_display("a", None);
        assert_eq!(scene.stacking_order(), ["a", "b", "c"]);

        assert!(scene.move_to_back("A"));
        assert_eq!(scene.stacking_order(), ["b", "c", "a"]);
    }

    #[test]
    fn test_move_to_front_reorders() {
        let (mut scene, _clock) = scene();
        scene.create_display("c", None);
        scene.create_display("b", None);
        scene.create_display("a", None);

        assert!(scene.move_to_front("c"));
        assert_eq!(scene.stacking_order(), ["c", "a", "b"]);
    }

    #[test]
    fn test_move_behind_reinserts_after_target() {
        let (mut scene, _clock) = scene();
        scene.create_display("c", None);
        scene.create_display("b", None);
        scene.create_display("a", None);

        assert!(scene.move_behind("a", "b"));
        assert_eq!(scene.stacking_order(), ["b", "a", "c"]);

        assert!(!scene.move_behind("a", "ghost"));
        assert!(!scene.move_behind("ghost", "b"));
        assert!(!scene.move_behind("a", "a"));
    }

    #[test]
    fn test_kill_clears_focus_without_promotion() {
        let (mut scene, _clock) = scene();
        scene.create_display("app1", None);
        scene.create_display("app2", None);
        assert_eq!(scene.focused(), Some("app1"));

        assert!(scene.kill("app1"));
        assert_eq!(scene.focused(), None);
        assert_eq!(scene.surface_count(), 1);

        // Later creations do not inherit the automatic focus grant.
        scene.create_display("app3", None);
        assert_eq!(scene.focused(), None);
    }

    #[test]
    fn test_kill_unknown_is_noop() {
        let (mut scene, _clock) = scene();
        assert!(!scene.kill("ghost"));
    }

    #[test]
    fn test_set_focus_requires_existing_client() {
        let (mut scene, _clock) = scene();
        scene.create_display("app1", None);
        scene.create_display("app2", None);

        assert!(scene.set_focus("APP2"));
        assert_eq!(scene.focused(), Some("app2"));

        assert!(!scene.set_focus("ghost"));
        assert_eq!(scene.focused(), Some("app2"));
    }

    #[test]
    fn test_intercept_beats_focus_on_exact_flags() {
        let (mut scene, _clock) = scene();
        scene.create_display("y", None);
        scene.create_display("x", None);
        scene.set_focus("y");
        assert!(scene.add_key_intercept("x", 10, KeyModifiers::CTRL));

        // Exact match: only the interceptor hears it.
        assert!(scene.on_key_press(10, KeyModifiers::CTRL));
        let events: Vec<_> = scene.drain_events().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key_client(), Some("x"));

        // Superset of the registered flags does not match; falls through to
        // the focused client.
        assert!(scene.on_key_press(10, KeyModifiers::CTRL | KeyModifiers::SHIFT));
        let events: Vec<_> = scene.drain_events().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key_client(), Some("y"));
    }

    #[test]
    fn test_key_falls_to_focus_without_intercepts() {
        let (mut scene, _clock) = scene();
        scene.create_display("app1", None);

        assert!(scene.on_key_press(36, KeyModifiers::NONE));
        assert!(scene.on_key_release(36, KeyModifiers::NONE));

        let events: Vec<_> = scene.drain_events().collect();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.key_client() == Some("app1")));
    }

    #[test]
    fn test_key_with_no_focus_and_no_intercepts_goes_nowhere() {
        let (mut scene, _clock) = scene();
        scene.create_display("app1", None);
        scene.kill("app1");
        scene.create_display("app2", None);

        assert!(!scene.on_key_press(36, KeyModifiers::NONE));
        assert!(!scene.has_pending_events());
    }

    #[test]
    fn test_intercept_delivers_to_all_matches() {
        let (mut scene, _clock) = scene();
        scene.create_display("a", None);
        scene.create_display("b", None);
        scene.add_key_intercept("a", 10, KeyModifiers::NONE);
        scene.add_key_intercept("b", 10, KeyModifiers::NONE);

        scene.on_key_press(10, KeyModifiers::NONE);
        let clients: Vec<_> = scene
            .drain_events()
            .filter_map(|e| e.key_client().map(str::to_string))
            .collect();
        assert_eq!(clients, ["a", "b"]);
    }

    #[test]
    fn test_add_key_intercept_duplicate_and_unknown() {
        let (mut scene, _clock) = scene();
        scene.create_display("app1", None);

        assert!(scene.add_key_intercept("app1", 10, KeyModifiers::CTRL));
        assert!(!scene.add_key_intercept("app1", 10, KeyModifiers::CTRL));
        assert!(!scene.add_key_intercept("ghost", 10, KeyModifiers::CTRL));

        assert!(scene.remove_key_intercept("app1", 10, KeyModifiers::CTRL));
        assert!(!scene.remove_key_intercept("app1", 10, KeyModifiers::CTRL));
    }

    #[test]
    fn test_kill_removes_intercepts() {
        let (mut scene, _clock) = scene();
        scene.create_display("x", None);
        scene.create_display("y", None);
        scene.set_focus("y");
        scene.add_key_intercept("x", 10, KeyModifiers::NONE);

        scene.kill("x");
        scene.on_key_press(10, KeyModifiers::NONE);

        let events: Vec<_> = scene.drain_events().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key_client(), Some("y"));
    }

    #[test]
    fn test_set_bounds_partial_update() {
        let (mut scene, _clock) = scene();
        scene.create_display("app1", None);

        assert!(scene.set_bounds("app1", Some(10), None, Some(640), None));
        assert_eq!(
            scene.bounds("app1"),
            Some(Bounds { x: 10, y: 0, w: 640, h: 720 })
        );

        // Oversize writes clamp to the screen.
        scene.set_bounds("app1", None, None, Some(4000), Some(4000));
        assert_eq!(
            scene.bounds("app1"),
            Some(Bounds { x: 10, y: 0, w: 1280, h: 720 })
        );

        assert!(!scene.set_bounds("ghost", Some(1), None, None, None));
    }

    #[test]
    fn test_set_scale_partial_update() {
        let (mut scene, _clock) = scene();
        scene.create_display("app1", None);

        assert!(scene.set_scale("app1", Some(2.0), None));
        assert_eq!(scene.scale("app1"), Some((2.0, 1.0)));
    }

    #[test]
    fn test_opacity_composes_multiplicatively() {
        let (mut scene, _clock) = scene();
        scene.create_display("app1", None);
        assert_eq!(scene.opacity("app1"), Some(100));

        assert!(scene.set_opacity("app1", 50));
        assert_eq!(scene.opacity("app1"), Some(50));

        // Composes against the current ratio, not an assignment.
        assert!(scene.set_opacity("app1", 50));
        assert_eq!(scene.opacity("app1"), Some(25));

        // Clamped at the top.
        assert!(scene.set_opacity("app1", 100_000));
        assert_eq!(scene.opacity("app1"), Some(100));
    }

    #[test]
    fn test_visibility_and_hole_punch() {
        let (mut scene, _clock) = scene();
        scene.create_display("app1", None);

        assert_eq!(scene.visibility("app1"), Some(true));
        assert!(scene.set_visibility("app1", false));
        assert_eq!(scene.visibility("app1"), Some(false));

        assert_eq!(scene.hole_punch("app1"), Some(false));
        assert!(scene.set_hole_punch("app1", true));
        assert_eq!(scene.hole_punch("app1"), Some(true));
    }

    #[test]
    fn test_update_queues_batched_animation_event() {
        let (mut scene, clock) = scene();
        scene.create_display("app1", None);
        scene.add_animation("app1", AnimationRequest::new(1.0).with_x(100));

        clock.advance(0.5);
        scene.update();

        let events: Vec<_> = scene.drain_events().collect();
        assert_eq!(events.len(), 1);
        match &events[0] {
            SceneEvent::Animation(frame) => {
                assert_eq!(frame.surfaces.len(), 1);
                assert_eq!(frame.surfaces[0].x, Some(50));
            }
            other => panic!("expected animation event, got {:?}", other),
        }

        // A tick with nothing in flight queues nothing.
        clock.advance(1.0);
        scene.update();
        scene.update();
        let events: Vec<_> = scene.drain_events().collect();
        assert_eq!(events.len(), 1, "completion frame only");
    }

    #[test]
    fn test_kill_mid_animation_drops_record() {
        let (mut scene, clock) = scene();
        scene.create_display("app1", None);
        scene.add_animation("app1", AnimationRequest::new(1.0).with_x(100));
        assert!(scene.is_animating("app1"));

        scene.kill("app1");
        assert!(!scene.is_animating("app1"));

        clock.advance(0.5);
        scene.update();
        assert!(!scene.has_pending_events());
    }

    #[test]
    fn test_animation_ops_on_missing_client() {
        let (mut scene, _clock) = scene();
        assert!(!scene.add_animation("ghost", AnimationRequest::new(1.0).with_x(5)));
        assert!(!scene.fast_forward_animation("ghost"));
        assert!(!scene.stop_animation("ghost"));
    }

    #[test]
    fn test_front_to_back_iterates_stack_order() {
        let (mut scene, _clock) = scene();
        scene.create_display("back", None);
        scene.create_display("front", None);

        let names: Vec<_> = scene.front_to_back().map(|s| s.name().to_string()).collect();
        assert_eq!(names, ["front", "back"]);
    }

    #[test]
    fn test_set_resolution_changes_clamp_bound() {
        let (mut scene, _clock) = scene();
        scene.create_display("app1", None);

        scene.set_resolution(1920, 1080);
        scene.set_bounds("app1", None, None, Some(1900), Some(1000));
        assert_eq!(
            scene.bounds("app1"),
            Some(Bounds { x: 0, y: 0, w: 1900, h: 1000 })
        );
    }
}
