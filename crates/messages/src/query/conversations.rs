//! Conversation and inbound-message queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::InboundMessage;
use crate::store::MessageThreadStore;

/// Maximum characters shown for the last-message preview
const PREVIEW_CHARS: usize = 80;

/// Summary information for displaying a conversation in the admin inbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Participant email (the thread key)
    pub key: String,
    /// Participant display name, if they ever wrote or appear in the inbox
    pub participant_name: Option<String>,
    /// Preview of the most recent message
    pub last_message_preview: String,
    pub last_message_at: DateTime<Utc>,
    pub message_count: usize,
    /// True when the participant spoke last and staff has not replied yet
    pub awaiting_reply: bool,
}

/// List conversations, most recent activity first
pub fn list_conversations(store: &MessageThreadStore) -> Vec<ConversationSummary> {
    let inbound = store.get_all();

    let mut summaries: Vec<ConversationSummary> = store
        .thread_keys()
        .into_iter()
        .filter_map(|key| {
            let thread = store.get_thread(&key);
            let last = thread.last()?;

            let participant_name = thread
                .iter()
                .find(|m| !m.is_from_admin())
                .map(|m| m.name.clone())
                .or_else(|| {
                    inbound
                        .iter()
                        .find(|m| m.email == key)
                        .map(|m| m.from.clone())
                });

            Some(ConversationSummary {
                participant_name,
                last_message_preview: preview(&last.body, PREVIEW_CHARS),
                last_message_at: last.date,
                message_count: thread.len(),
                awaiting_reply: !last.is_from_admin(),
                key,
            })
        })
        .collect();

    summaries.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
    summaries
}

/// Inbound messages matching `needle` (case-insensitive), in insertion order
///
/// A blank needle matches everything.
pub fn search_inbound(store: &MessageThreadStore, needle: &str) -> Vec<InboundMessage> {
    let needle = needle.trim();
    store
        .get_all()
        .into_iter()
        .filter(|m| needle.is_empty() || m.matches(needle))
        .collect()
}

/// First line of `text`, cut to `max_chars` characters with an ellipsis
pub fn preview(text: &str, max_chars: usize) -> String {
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if line.chars().count() <= max_chars {
        return line.to_string();
    }
    let mut cut: String = line.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
