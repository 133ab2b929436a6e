//! Query API for the admin inbox
//!
//! Read-only projections over a [`crate::MessageThreadStore`], shaped for
//! list rendering.

mod conversations;

pub use conversations::{ConversationSummary, list_conversations, preview, search_inbound};
