//! Applies decoded requests to a scene.

use tracing::info;

use lumen_scene::animation::AnimationRequest;
use lumen_scene::input::KeyModifiers;
use lumen_scene::{Scene, Tween};

use crate::messages::{ApiRequest, ApiResponse, ResponsePayload};

/// Apply one request to the scene and report the outcome.
///
/// Query methods answer `success: false` with no payload when the client is
/// unknown; mutations follow the scene's permissive boolean contract.
pub fn dispatch(scene: &mut Scene, request: ApiRequest) -> ApiResponse {
    match request {
        ApiRequest::CreateDisplay { client, display } => {
            ApiResponse::flag(scene.create_display(&client, display.as_deref()))
        }
        ApiRequest::LaunchApplication { client, uri, mime } => {
            let created = scene.create_display(&client, None);
            if created {
                // The embedder owns the process table; the shell only
                // provides the surface.
                info!(client = %client, uri = %uri, mime = %mime, "application launch requested");
            }
            ApiResponse::flag(created)
        }
        ApiRequest::Kill { client } => ApiResponse::flag(scene.kill(&client)),
        ApiRequest::SetBounds { client, x, y, w, h } => {
            ApiResponse::flag(scene.set_bounds(&client, x, y, w, h))
        }
        ApiRequest::GetBounds { client } => match scene.bounds(&client) {
            Some(bounds) => ApiResponse::with(ResponsePayload::Bounds {
                x: bounds.x,
                y: bounds.y,
                w: bounds.w,
                h: bounds.h,
            }),
            None => ApiResponse::fail(),
        },
        ApiRequest::SetScale { client, sx, sy } => {
            ApiResponse::flag(scene.set_scale(&client, sx, sy))
        }
        ApiRequest::GetScale { client } => match scene.scale(&client) {
            Some((sx, sy)) => ApiResponse::with(ResponsePayload::Scale { sx, sy }),
            None => ApiResponse::fail(),
        },
        ApiRequest::SetOpacity { client, opacity } => {
            ApiResponse::flag(scene.set_opacity(&client, opacity))
        }
        ApiRequest::GetOpacity { client } => match scene.opacity(&client) {
            Some(opacity) => ApiResponse::with(ResponsePayload::Opacity { opacity }),
            None => ApiResponse::fail(),
        },
        ApiRequest::SetVisibility { client, visible } => {
            ApiResponse::flag(scene.set_visibility(&client, visible))
        }
        ApiRequest::GetVisibility { client } => match scene.visibility(&client) {
            Some(visible) => ApiResponse::with(ResponsePayload::Visibility { visible }),
            None => ApiResponse::fail(),
        },
        ApiRequest::SetHolePunch { client, hole_punch } => {
            ApiResponse::flag(scene.set_hole_punch(&client, hole_punch))
        }
        ApiRequest::GetHolePunch { client } => match scene.hole_punch(&client) {
            Some(hole_punch) => ApiResponse::with(ResponsePayload::HolePunch { hole_punch }),
            None => ApiResponse::fail(),
        },
        ApiRequest::AddAnimation {
            client,
            duration,
            x,
            y,
            w,
            h,
            sx,
            sy,
            a,
            delay,
            tween,
        } => {
            let mut animation = AnimationRequest::new(duration).with_delay(delay);
            animation.x = x;
            animation.y = y;
            animation.width = w;
            animation.height = h;
            animation.scale_x = sx;
            animation.scale_y = sy;
            animation.opacity = a.map(|percent| f64::from(percent) / 100.0);
            animation.tween = tween.unwrap_or(Tween::Linear);
            ApiResponse::flag(scene.add_animation(&client, animation))
        }
        ApiRequest::AddKeyIntercept {
            client,
            key_code,
            modifiers,
        } => ApiResponse::flag(scene.add_key_intercept(
            &client,
            key_code,
            KeyModifiers::from_names(&modifiers),
        )),
        ApiRequest::RemoveKeyIntercept {
            client,
            key_code,
            modifiers,
        } => ApiResponse::flag(scene.remove_key_intercept(
            &client,
            key_code,
            KeyModifiers::from_names(&modifiers),
        )),
        ApiRequest::MoveToFront { client } => ApiResponse::flag(scene.move_to_front(&client)),
        ApiRequest::MoveToBack { client } => ApiResponse::flag(scene.move_to_back(&client)),
        ApiRequest::MoveBehind { client, target } => {
            ApiResponse::flag(scene.move_behind(&client, &target))
        }
        ApiRequest::SetFocus { client } => ApiResponse::flag(scene.set_focus(&client)),
        ApiRequest::GetFocused => ApiResponse::with(ResponsePayload::Focused {
            client: scene.focused().map(str::to_string),
        }),
        ApiRequest::SetScreenResolution { w, h } => {
            scene.set_resolution(w, h);
            ApiResponse::ok()
        }
        ApiRequest::GetScreenResolution => {
            let resolution = scene.resolution();
            ApiResponse::with(ResponsePayload::Resolution {
                w: resolution.width,
                h: resolution.height,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::decode_request;
    use lumen_scene::surface::Resolution;
    use lumen_scene::timing::ManualClock;

    fn scene() -> (Scene, ManualClock) {
        let clock = ManualClock::new();
        let scene = Scene::with_clock(Resolution::new(1280, 720), Box::new(clock.clone()));
        (scene, clock)
    }

    fn apply(scene: &mut Scene, raw: &str) -> ApiResponse {
        dispatch(scene, decode_request(raw).unwrap())
    }

    #[test]
    fn test_create_then_duplicate() {
        let (mut scene, _clock) = scene();
        let response = apply(&mut scene, r#"{"method":"createDisplay","params":{"client":"app1"}}"#);
        assert!(response.success);

        let response = apply(&mut scene, r#"{"method":"createDisplay","params":{"client":"app1"}}"#);
        assert!(!response.success);
        assert_eq!(scene.surface_count(), 1);
    }

    #[test]
    fn test_bounds_round_trip_through_api() {
        let (mut scene, _clock) = scene();
        apply(&mut scene, r#"{"method":"createDisplay","params":{"client":"app1"}}"#);
        apply(
            &mut scene,
            r#"{"method":"setBounds","params":{"client":"app1","x":10,"y":20,"w":640,"h":360}}"#,
        );

        let response = apply(&mut scene, r#"{"method":"getBounds","params":{"client":"app1"}}"#);
        assert_eq!(
            response.payload,
            Some(ResponsePayload::Bounds { x: 10, y: 20, w: 640, h: 360 })
        );

        let response = apply(&mut scene, r#"{"method":"getBounds","params":{"client":"ghost"}}"#);
        assert!(!response.success);
        assert_eq!(response.payload, None);
    }

    #[test]
    fn test_add_animation_drives_scene() {
        let (mut scene, clock) = scene();
        apply(&mut scene, r#"{"method":"createDisplay","params":{"client":"app1"}}"#);
        apply(&mut scene, r#"{"method":"setBounds","params":{"client":"app1","x":0}}"#);

        let response = apply(
            &mut scene,
            r#"{"method":"addAnimation","params":{"client":"app1","duration":1.0,"x":100}}"#,
        );
        assert!(response.success);
        assert!(scene.is_animating("app1"));

        clock.advance(0.5);
        scene.update();
        assert_eq!(scene.bounds("app1").unwrap().x, 50);
    }

    #[test]
    fn test_animation_opacity_percentage_converts() {
        let (mut scene, clock) = scene();
        apply(&mut scene, r#"{"method":"createDisplay","params":{"client":"app1"}}"#);

        apply(
            &mut scene,
            r#"{"method":"addAnimation","params":{"client":"app1","duration":1.0,"a":40}}"#,
        );
        clock.advance(2.0);
        scene.update();

        assert_eq!(scene.opacity("app1"), Some(40));
    }

    #[test]
    fn test_key_intercept_flow_through_api() {
        let (mut scene, _clock) = scene();
        apply(&mut scene, r#"{"method":"createDisplay","params":{"client":"focusapp"}}"#);
        apply(&mut scene, r#"{"method":"createDisplay","params":{"client":"overlay"}}"#);

        let response = apply(
            &mut scene,
            r#"{"method":"addKeyIntercept","params":{"client":"overlay","keyCode":36,"modifiers":["ctrl"]}}"#,
        );
        assert!(response.success);

        scene.on_key_press(36, KeyModifiers::CTRL);
        let clients: Vec<_> = scene
            .drain_events()
            .filter_map(|e| e.key_client().map(str::to_string))
            .collect();
        assert_eq!(clients, ["overlay"]);
    }

    #[test]
    fn test_focus_and_resolution_queries() {
        let (mut scene, _clock) = scene();
        apply(&mut scene, r#"{"method":"createDisplay","params":{"client":"app1"}}"#);

        let response = apply(&mut scene, r#"{"method":"getFocused"}"#);
        assert_eq!(
            response.payload,
            Some(ResponsePayload::Focused { client: Some("app1".to_string()) })
        );

        apply(&mut scene, r#"{"method":"setScreenResolution","params":{"w":1920,"h":1080}}"#);
        let response = apply(&mut scene, r#"{"method":"getScreenResolution"}"#);
        assert_eq!(
            response.payload,
            Some(ResponsePayload::Resolution { w: 1920, h: 1080 })
        );
    }

    #[test]
    fn test_move_behind_through_api() {
        let (mut scene, _clock) = scene();
        for client in ["c", "b", "a"] {
            apply(
                &mut scene,
                &format!(r#"{{"method":"createDisplay","params":{{"client":"{client}"}}}}"#),
            );
        }

        let response = apply(
            &mut scene,
            r#"{"method":"moveBehind","params":{"client":"a","target":"b"}}"#,
        );
        assert!(response.success);
        assert_eq!(scene.stacking_order(), ["b", "a", "c"]);
    }
}
