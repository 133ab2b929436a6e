//! Thread message model: one entry in a citizen/staff conversation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MessageId;

/// Sender value that identifies staff in any thread
pub const ADMIN_IDENTITY: &str = "admin";

/// Display name stored for every message sent by [`ADMIN_IDENTITY`]
pub const ADMIN_NAME: &str = "Admin";

/// A single message within a conversation thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: MessageId,
    /// Participant email, or [`ADMIN_IDENTITY`]
    pub sender: String,
    /// Display name, always [`ADMIN_NAME`] for staff messages
    pub name: String,
    pub body: String,
    pub date: DateTime<Utc>,
}

impl ThreadMessage {
    /// Build a message, resolving the display name from the sender
    pub fn new(
        id: MessageId,
        sender: impl Into<String>,
        display_name: impl Into<String>,
        body: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        let sender = sender.into();
        let name = if sender == ADMIN_IDENTITY {
            ADMIN_NAME.to_string()
        } else {
            display_name.into()
        };
        Self {
            id,
            sender,
            name,
            body: body.into(),
            date,
        }
    }

    pub fn is_from_admin(&self) -> bool {
        self.sender == ADMIN_IDENTITY
    }
}

/// First whitespace-separated word of a display name
pub fn first_name(display_name: &str) -> &str {
    display_name.split_whitespace().next().unwrap_or(display_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_name_is_forced() {
        let msg = ThreadMessage::new(MessageId::new(7), ADMIN_IDENTITY, "Someone", "hi", Utc::now());
        assert_eq!(msg.name, ADMIN_NAME);
        assert!(msg.is_from_admin());
    }

    #[test]
    fn test_participant_name_kept_verbatim() {
        let msg = ThreadMessage::new(MessageId::new(7), "a@b.c", "  ", "hi", Utc::now());
        assert_eq!(msg.name, "  ");
        assert!(!msg.is_from_admin());
    }

    #[test]
    fn test_first_name() {
        assert_eq!(first_name("Jane Doe"), "Jane");
        assert_eq!(first_name("Cher"), "Cher");
        assert_eq!(first_name(""), "");
    }
}
