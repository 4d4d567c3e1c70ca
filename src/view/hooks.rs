//! Renderer hooks and the dispatch from resolved slots to them.
//!
//! Hooks only see borrowed values and return an output; they cannot reach
//! back into the session. [`render_range`] walks a slot range of the flat
//! item/separator sequence and asks the hooks for one output per position.

use chrono::NaiveDate;

use crate::model::{ConversationKey, Message, MessageId};
use crate::state::session::ConversationSession;
use crate::view_state::classifier::{Separator, SpacingRules};
use crate::view_state::slots::{FlatSlot, SeparatorSlot, Slot, SpacerSize};
use crate::view_state::types::{SlotIndex, ViewportEdge};

/// Which end of the conversation a loader sits at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListEnd {
    /// Older messages.
    Historical,
    /// Newer messages.
    Live,
}

/// Per-message presentation flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageItem {
    /// Item slot the message occupies.
    pub slot: SlotIndex,
    /// Target of the last jump, until the host finishes the highlight.
    pub highlighted: bool,
    /// Sent by the local user.
    pub own: bool,
}

/// Host-visible list status that is not part of the message window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListStatus {
    /// A fetch is in flight at the start edge.
    pub loading_start: bool,
    /// A fetch is in flight at the end edge.
    pub loading_end: bool,
    /// Last fetch failure, shown at the loader of the edge it happened on.
    pub error: Option<(ViewportEdge, String)>,
}

impl ListStatus {
    /// Loading flags from the session's in-flight requests.
    pub fn of(session: &ConversationSession) -> Self {
        let pagination = session.pagination();
        Self {
            loading_start: pagination.in_flight_at(ViewportEdge::Start),
            loading_end: pagination.in_flight_at(ViewportEdge::End),
            error: None,
        }
    }

    /// Attach the last fetch failure at `edge`.
    pub fn with_error(mut self, edge: ViewportEdge, message: impl Into<String>) -> Self {
        self.error = Some((edge, message.into()));
        self
    }

    /// Whether a fetch is in flight at `edge`.
    pub fn is_loading(&self, edge: ViewportEdge) -> bool {
        match edge {
            ViewportEdge::Start => self.loading_start,
            ViewportEdge::End => self.loading_end,
        }
    }

    fn error_at(&self, edge: ViewportEdge) -> Option<&str> {
        self.error
            .as_ref()
            .filter(|(failed, _)| *failed == edge)
            .map(|(_, message)| message.as_str())
    }
}

/// Presentation callbacks, one per kind of list entry.
///
/// Returning `None` leaves the position blank. Structural hooks default to
/// rendering nothing; `system_message` defaults to `message`.
pub trait RenderHooks {
    /// What a hook produces for one list position.
    type Output;

    /// A regular chat message.
    fn message(&self, message: &Message, item: MessageItem) -> Self::Output;

    /// A system notice (joins, renames and the like).
    fn system_message(&self, message: &Message, item: MessageItem) -> Self::Output {
        self.message(message, item)
    }

    /// Divider in front of the first message of `date`.
    fn date_divider(&self, date: NaiveDate) -> Self::Output;

    /// Gap between two messages of the same day.
    fn spacing(&self, rules: SpacingRules) -> Option<Self::Output>;

    /// Fixed gap around the loaders.
    fn spacer(&self, _size: SpacerSize) -> Option<Self::Output> {
        None
    }

    /// Shown in a loader slot while a page is in flight.
    fn loading_indicator(&self, _end: ListEnd) -> Option<Self::Output> {
        None
    }

    /// Shown in the live-end loader slot of an empty, idle list.
    fn empty_state(&self) -> Option<Self::Output> {
        None
    }

    /// Last fetch failure, shown in the loader slot of the failed edge.
    fn error(&self, _end: ListEnd, _message: &str) -> Option<Self::Output> {
        None
    }

    /// Item next to the oldest loaded message.
    fn header(&self, _key: &ConversationKey) -> Option<Self::Output> {
        None
    }

    /// Item next to the newest loaded message.
    fn footer(&self, _key: &ConversationKey) -> Option<Self::Output> {
        None
    }

    /// Root message of a thread, in the parent-message slot.
    fn thread_parent(&self, _parent: &Message) -> Option<Self::Output> {
        None
    }

    /// Separator between the thread root and its replies.
    fn thread_separator(&self, _parent: &Message) -> Option<Self::Output> {
        None
    }
}

/// One rendered position of the flat sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered<T> {
    /// Position in the flat item/separator sequence.
    pub flat: usize,
    /// What the hooks produced.
    pub output: T,
}

/// Render item slots `first..=last` and the separators between them, in
/// slot order.
///
/// Positions the hooks leave blank are omitted. Slots past the end of the
/// sequence are ignored.
pub fn render_range<H: RenderHooks>(
    session: &ConversationSession,
    hooks: &H,
    status: &ListStatus,
    first: SlotIndex,
    last: SlotIndex,
) -> Vec<Rendered<H::Output>> {
    let sequence = session.sequence();
    let layout = sequence.layout();
    let Some(key) = session.key() else {
        return Vec::new();
    };
    let end = last.to_flat().min(sequence.flat_len().saturating_sub(1));
    let highlighted = session.highlighted();
    let current_user = session.context().map(|ctx| ctx.current_user());

    let list_end = |edge: ViewportEdge| {
        if edge == layout.live_edge() {
            ListEnd::Live
        } else {
            ListEnd::Historical
        }
    };

    let loader = |edge: ViewportEdge| -> Option<H::Output> {
        if status.is_loading(edge) {
            return hooks.loading_indicator(list_end(edge));
        }
        if let Some(message) = status.error_at(edge) {
            return hooks.error(list_end(edge), message);
        }
        let idle = !status.is_loading(edge.opposite());
        if edge == layout.live_edge() && session.store().is_empty() && idle {
            return hooks.empty_state();
        }
        None
    };

    let mut rendered = Vec::new();
    for flat in first.to_flat()..=end {
        let Some(resolved) = sequence.resolve_flat(flat) else {
            continue;
        };
        let output = match resolved {
            FlatSlot::Item(Slot::Header) => hooks.header(key),
            FlatSlot::Item(Slot::Footer) => hooks.footer(key),
            FlatSlot::Item(Slot::BottomLoader) => loader(ViewportEdge::Start),
            FlatSlot::Item(Slot::TopLoader) => loader(ViewportEdge::End),
            FlatSlot::Item(Slot::ParentMessage) => {
                session.parent().and_then(|parent| hooks.thread_parent(parent))
            }
            FlatSlot::Item(Slot::Message { message, .. }) => {
                let item = MessageItem {
                    slot: SlotIndex::new(flat / 2),
                    highlighted: highlighted == Some(message.id()),
                    own: current_user == Some(message.author_id()),
                };
                Some(if message.is_system() {
                    hooks.system_message(message, item)
                } else {
                    hooks.message(message, item)
                })
            }
            FlatSlot::Separator(SeparatorSlot::Spacer(size)) => hooks.spacer(size),
            FlatSlot::Separator(SeparatorSlot::Thread) => session
                .parent()
                .and_then(|parent| hooks.thread_separator(parent)),
            FlatSlot::Separator(SeparatorSlot::Computed(Separator::DateDivider(date))) => {
                Some(hooks.date_divider(date))
            }
            FlatSlot::Separator(SeparatorSlot::Computed(Separator::Spacing(rules))) => {
                hooks.spacing(rules)
            }
        };
        if let Some(output) = output {
            rendered.push(Rendered { flat, output });
        }
    }
    rendered
}

/// Ids of the messages in `first..=last`, in slot order.
pub fn visible_message_ids(
    session: &ConversationSession,
    first: SlotIndex,
    last: SlotIndex,
) -> Vec<MessageId> {
    let sequence = session.sequence();
    (first.get()..=last.get())
        .filter_map(|slot| match sequence.resolve(SlotIndex::new(slot))? {
            Slot::Message { message, .. } => Some(message.id().clone()),
            _ => None,
        })
        .collect()
}
