//! Interaction callbacks and gesture dispatch.

use crate::model::{ListError, Message, MessageId};
use crate::state::session::{ConversationSession, JumpOutcome};
use crate::view_state::slots::Slot;
use crate::view_state::types::SlotIndex;

/// A user gesture on a list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Plain tap on the message body.
    Tap,
    /// Open the replies of a message.
    OpenThread,
    /// Swipe to reply.
    Swipe,
    /// Tap on the quoted-message preview inside a message.
    QuotedTap,
}

/// Host callbacks for user interaction. Every callback defaults to a no-op.
pub trait ListInteractions {
    /// A regular message was tapped.
    fn on_message_tap(&mut self, _message: &Message) {}

    /// A system notice was tapped.
    fn on_system_message_tap(&mut self, _message: &Message) {}

    /// The thread under a message should open.
    fn on_thread_open(&mut self, _message: &Message) {}

    /// Swipe-to-reply on a message.
    fn on_swipe_reply(&mut self, _message: &Message) {}

    /// A quoted-message tap turned into a jump.
    fn on_quoted_navigation(&mut self, _quoted: &MessageId, _outcome: &JumpOutcome) {}
}

/// Resolve `slot` and route `gesture` to the matching callback.
///
/// Gestures on structural slots, and gestures that do not apply to the
/// message under them, are ignored. A quoted tap jumps to the quoted
/// message through [`ConversationSession::jump_to_message`] and returns the
/// outcome so the host can scroll or run the fetch.
///
/// # Errors
///
/// Returns `ListError::NotAttached` if a quoted tap arrives while no
/// conversation is attached.
pub fn dispatch_interaction<I: ListInteractions + ?Sized>(
    session: &mut ConversationSession,
    slot: SlotIndex,
    gesture: Gesture,
    callbacks: &mut I,
) -> Result<Option<JumpOutcome>, ListError> {
    let message = match session.sequence().resolve(slot) {
        Some(Slot::Message { message, .. }) => message.clone(),
        Some(Slot::ParentMessage) => match session.parent() {
            Some(parent) => parent.clone(),
            None => return Ok(None),
        },
        _ => return Ok(None),
    };

    match gesture {
        Gesture::Tap if message.is_system() => callbacks.on_system_message_tap(&message),
        Gesture::Tap => callbacks.on_message_tap(&message),
        Gesture::OpenThread => {
            if message.has_replies() && !message.is_thread_reply() {
                callbacks.on_thread_open(&message);
            }
        }
        Gesture::Swipe => {
            if !message.is_system() && !message.is_deleted() && !message.is_ephemeral() {
                callbacks.on_swipe_reply(&message);
            }
        }
        Gesture::QuotedTap => {
            let Some(quoted) = message.quoted_message_id() else {
                return Ok(None);
            };
            let outcome = session.jump_to_message(quoted)?;
            tracing::debug!(id = %quoted, "quoted message navigation");
            callbacks.on_quoted_navigation(quoted, &outcome);
            return Ok(Some(outcome));
        }
    }
    Ok(None)
}
