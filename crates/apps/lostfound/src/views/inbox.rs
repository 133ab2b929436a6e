//! Admin inbox view: inbound messages and conversation list

use std::sync::{Arc, Mutex};

use chrono::Local;
use messages::query::preview;
use messages::{ConversationSummary, EventKind, InboundMessage, StoreEvent, Subscription};

use crate::app::SharedStore;

/// Renders the inbox and reports deletions as they happen
pub struct InboxView {
    removed: Arc<Mutex<Vec<i64>>>,
    _subscription: Subscription,
}

impl InboxView {
    pub fn new(store: &SharedStore) -> Self {
        let removed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&removed);
        let subscription = store.subscribe(EventKind::Deleted, move |event| {
            if let StoreEvent::Deleted { id } = event
                && let Ok(mut removed) = sink.lock()
            {
                removed.push(id.value());
            }
        });
        Self {
            removed,
            _subscription: subscription,
        }
    }

    /// Ids for which a delete notification arrived since the view was created
    pub fn removed_ids(&self) -> Vec<i64> {
        self.removed.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

pub fn render_inbound(messages: &[InboundMessage]) -> String {
    if messages.is_empty() {
        return "No messages.".to_string();
    }
    messages
        .iter()
        .map(|m| {
            format!(
                "{:>14}  {}  {} <{}>\n                {}\n                {}",
                m.id,
                m.date.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                m.from,
                m.email,
                m.subject,
                preview(&m.body, 72),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_conversations(conversations: &[ConversationSummary]) -> String {
    if conversations.is_empty() {
        return "No conversations.".to_string();
    }
    conversations
        .iter()
        .map(|c| {
            let marker = if c.awaiting_reply { "*" } else { " " };
            let who = match &c.participant_name {
                Some(name) => format!("{} <{}>", name, c.key),
                None => c.key.clone(),
            };
            format!(
                "{} {}  {} ({} messages)\n    {}",
                marker,
                c.last_message_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                who,
                c.message_count,
                c.last_message_preview,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
