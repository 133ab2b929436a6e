//! Domain models for the inbox and conversation threads

mod inbound;
mod thread;

pub use inbound::{InboundMessage, MessageId};
pub use thread::{ADMIN_IDENTITY, ADMIN_NAME, ThreadMessage, first_name};
