//! Wire shapes of the remote-control protocol: one struct-like variant per
//! method, decoded once and handed to the dispatcher.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use lumen_scene::events::SurfaceDelta;
use lumen_scene::input::KeyState;
use lumen_scene::{SceneEvent, Tween};

/// Inbound remote-control call.
///
/// The wire form is `{"method": "...", "params": {...}}`; parameter names
/// follow the protocol's camelCase convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "camelCase")]
pub enum ApiRequest {
    CreateDisplay {
        client: String,
        #[serde(default)]
        display: Option<String>,
    },
    /// Create the display for an application the embedder is about to
    /// launch. Process spawning itself happens outside the shell.
    LaunchApplication {
        client: String,
        uri: String,
        mime: String,
    },
    Kill {
        client: String,
    },
    SetBounds {
        client: String,
        #[serde(default)]
        x: Option<i32>,
        #[serde(default)]
        y: Option<i32>,
        #[serde(default)]
        w: Option<u32>,
        #[serde(default)]
        h: Option<u32>,
    },
    GetBounds {
        client: String,
    },
    SetScale {
        client: String,
        #[serde(default)]
        sx: Option<f64>,
        #[serde(default)]
        sy: Option<f64>,
    },
    GetScale {
        client: String,
    },
    /// Opacity is an integer percentage on the wire; it composes
    /// multiplicatively against the client's current opacity.
    SetOpacity {
        client: String,
        opacity: u32,
    },
    GetOpacity {
        client: String,
    },
    SetVisibility {
        client: String,
        visible: bool,
    },
    GetVisibility {
        client: String,
    },
    SetHolePunch {
        client: String,
        #[serde(rename = "holePunch")]
        hole_punch: bool,
    },
    GetHolePunch {
        client: String,
    },
    AddAnimation {
        client: String,
        duration: f64,
        #[serde(default)]
        x: Option<i32>,
        #[serde(default)]
        y: Option<i32>,
        #[serde(default)]
        w: Option<u32>,
        #[serde(default)]
        h: Option<u32>,
        #[serde(default)]
        sx: Option<f64>,
        #[serde(default)]
        sy: Option<f64>,
        /// Destination opacity percentage.
        #[serde(default)]
        a: Option<u32>,
        #[serde(default)]
        delay: f64,
        #[serde(default)]
        tween: Option<Tween>,
    },
    AddKeyIntercept {
        client: String,
        #[serde(rename = "keyCode")]
        key_code: u32,
        #[serde(default)]
        modifiers: Vec<String>,
    },
    RemoveKeyIntercept {
        client: String,
        #[serde(rename = "keyCode")]
        key_code: u32,
        #[serde(default)]
        modifiers: Vec<String>,
    },
    MoveToFront {
        client: String,
    },
    MoveToBack {
        client: String,
    },
    MoveBehind {
        client: String,
        target: String,
    },
    SetFocus {
        client: String,
    },
    GetFocused,
    SetScreenResolution {
        w: u32,
        h: u32,
    },
    GetScreenResolution,
}

/// Outcome of one dispatched request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    /// Flattened into the response object; absent for payload-free methods.
    #[serde(flatten)]
    pub payload: Option<ResponsePayload>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            payload: None,
        }
    }

    pub fn fail() -> Self {
        Self {
            success: false,
            payload: None,
        }
    }

    pub fn with(payload: ResponsePayload) -> Self {
        Self {
            success: true,
            payload: Some(payload),
        }
    }

    /// Collapse a boolean operation result into a payload-free response.
    pub fn flag(success: bool) -> Self {
        Self {
            success,
            payload: None,
        }
    }
}

/// Typed result payload for the query methods, flattened into the response
/// object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    Bounds { x: i32, y: i32, w: u32, h: u32 },
    Scale { sx: f64, sy: f64 },
    Opacity { opacity: u32 },
    Visibility { visible: bool },
    HolePunch {
        #[serde(rename = "holePunch")]
        hole_punch: bool,
    },
    Focused { client: Option<String> },
    Resolution { w: u32, h: u32 },
}

/// Outbound notification toward the remote controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", content = "params", rename_all = "camelCase")]
pub enum ShellNotification {
    /// At most one per frame: the clients whose transforms changed, sparse
    /// per-field.
    OnAnimation(Vec<SurfaceDelta>),
    OnKeyDown {
        client: String,
        #[serde(rename = "keyCode")]
        key_code: u32,
        flags: u32,
    },
    OnKeyUp {
        client: String,
        #[serde(rename = "keyCode")]
        key_code: u32,
        flags: u32,
    },
}

impl From<SceneEvent> for ShellNotification {
    fn from(event: SceneEvent) -> Self {
        match event {
            SceneEvent::Animation(frame) => Self::OnAnimation(frame.surfaces),
            SceneEvent::Key { client, event } => match event.state {
                KeyState::Pressed => Self::OnKeyDown {
                    client,
                    key_code: event.code,
                    flags: event.modifiers.bits(),
                },
                KeyState::Released => Self::OnKeyUp {
                    client,
                    key_code: event.code,
                    flags: event.modifiers.bits(),
                },
            },
        }
    }
}

/// Failure at the decode boundary. The scene core never raises these; a
/// request that decodes but names an unknown client comes back as
/// `success: false` instead.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed request: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Decode one raw JSON request.
pub fn decode_request(raw: &str) -> Result<ApiRequest, ApiError> {
    Ok(serde_json::from_str(raw)?)
}
