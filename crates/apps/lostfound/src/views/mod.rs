//! Text views over the message store

pub mod inbox;
pub mod thread;

pub use inbox::InboxView;
pub use thread::ChatView;
