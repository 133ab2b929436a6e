//! Inbound message model (contact-form submissions shown in the admin inbox)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for inbound and thread messages
///
/// Derived from the creation time in milliseconds since the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl MessageId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for MessageId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message that arrived from a citizen, keyed into threads by `email`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: MessageId,
    /// Sender display name
    pub from: String,
    /// Sender address, also the thread key for the conversation
    pub email: String,
    pub subject: String,
    pub body: String,
    pub date: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(
        id: MessageId,
        from: impl Into<String>,
        email: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            from: from.into(),
            email: email.into(),
            subject: subject.into(),
            body: body.into(),
            date,
        }
    }

    /// Case-insensitive substring match over sender, address, subject and body
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [&self.from, &self.email, &self.subject, &self.body]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}
