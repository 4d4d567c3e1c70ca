//! List state machine (pure).
//!
//! All state transitions are pure functions testable without a renderer or
//! a network: fetches leave the session as [`FetchRequest`] values and come
//! back through [`ConversationSession::complete_fetch`].

pub mod anchor;
pub mod message_store;
pub mod pagination;
pub mod session;

// Re-export for convenience
pub use anchor::{AnchorAdjustment, AnchorState, ScrollAnchorController, Transition};
pub use message_store::MessageStore;
pub use pagination::{FetchDirection, FetchRequest, FetchTicket, PaginationCoordinator};
pub use session::{
    AttachOutcome, AttachRequest, ConversationSession, Effects, FetchOutcome, JumpOutcome,
    ListOptions, LiveChange, LiveEvent,
};
