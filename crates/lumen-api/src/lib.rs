//! Remote-control message types for the Lumen shell.
//!
//! The transport (socket server, WebSocket bridge) hands raw JSON to
//! [`decode_request`] and gets a strongly typed [`ApiRequest`] back;
//! [`dispatch`] applies it to a scene. Decoding happens exactly once at this
//! boundary, so the scene core never sees dynamic maps.
//!
//! Outbound traffic is the mirror image: drained
//! [`SceneEvent`](lumen_scene::SceneEvent)s convert into
//! [`ShellNotification`]s, ready for the transport to encode.

mod dispatch;
mod messages;

pub use dispatch::dispatch;
pub use messages::{
    ApiError, ApiRequest, ApiResponse, ResponsePayload, ShellNotification, decode_request,
};
