//! Messages crate - local inbox and conversation store
//!
//! This crate provides the stateful part of the Lost & Found front office:
//! - Domain models (InboundMessage, ThreadMessage)
//! - Key-value persistence substrates (in-memory, file, SQLite)
//! - MessageThreadStore with seeding and best-effort persistence
//! - Revocable subscriptions for synchronous change notification
//! - Query API for the admin inbox view
//!
//! The crate has no UI or network dependencies. Construct one store per
//! process and share it by reference.

pub mod clock;
pub mod events;
pub mod models;
pub mod query;
pub mod seed;
pub mod storage;
pub mod store;

pub use clock::{Clock, IdGenerator, ManualClock, SystemClock};
pub use events::{EventKind, StoreEvent, Subscription};
pub use models::{ADMIN_IDENTITY, ADMIN_NAME, InboundMessage, MessageId, ThreadMessage};
pub use query::{ConversationSummary, list_conversations, search_inbound};
pub use storage::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore, SqliteKeyValueStore};
pub use store::{MESSAGES_KEY, MessageThreadStore, Persistence, Sent, THREADS_KEY};
