//! Change notifications for independent renderers
//!
//! The store owns a [`Subscribers`] registry. Renderers call
//! `MessageThreadStore::subscribe` and keep the returned [`Subscription`]
//! for as long as they want to hear about changes.

mod subscribers;

pub use subscribers::{Subscribers, Subscription};

use crate::models::{InboundMessage, MessageId, ThreadMessage};

/// A change that has already been applied to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// `remove` was called for this id (whether or not it existed)
    Deleted { id: MessageId },
    /// A message was appended to the thread for `key`
    ThreadUpdated { key: String, message: ThreadMessage },
    /// A new inbound message arrived
    Received { message: InboundMessage },
}

impl StoreEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            StoreEvent::Deleted { .. } => EventKind::Deleted,
            StoreEvent::ThreadUpdated { .. } => EventKind::ThreadUpdated,
            StoreEvent::Received { .. } => EventKind::Received,
        }
    }
}

/// Which events a listener wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Deleted,
    ThreadUpdated,
    Received,
    /// Every event
    Any,
}

impl EventKind {
    /// Whether a listener registered for `self` should see `event`
    pub fn accepts(self, event: &StoreEvent) -> bool {
        self == EventKind::Any || self == event.kind()
    }
}
