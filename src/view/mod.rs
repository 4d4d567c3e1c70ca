//! Presentation seams: renderer hooks, the plain-text renderer and
//! interaction dispatch.
//!
//! Nothing here mutates list state except [`dispatch_interaction`], which
//! routes quoted-message taps through the session's jump operation.

pub mod hooks;
pub mod interaction;
pub mod text;

pub use hooks::{render_range, visible_message_ids, ListEnd, ListStatus, MessageItem, RenderHooks, Rendered};
pub use interaction::{dispatch_interaction, Gesture, ListInteractions};
pub use text::TextRenderer;
