//! Example data shown on first run

use chrono::{DateTime, Duration, Utc};

use crate::clock::IdGenerator;
use crate::models::{ADMIN_IDENTITY, InboundMessage, ThreadMessage, first_name};

/// A contact-form submission used to populate an empty store
pub struct SeedContact {
    pub name: &'static str,
    pub email: &'static str,
    pub subject: &'static str,
    pub body: &'static str,
}

pub const SEED_CONTACTS: [SeedContact; 2] = [
    SeedContact {
        name: "John Smith",
        email: "john@example.com",
        subject: "Lost wallet near the library",
        body: "Hi, I lost a brown leather wallet near the main library on Tuesday. \
               Has anything like that been handed in?",
    },
    SeedContact {
        name: "Jane Doe",
        email: "jane@example.com",
        subject: "Question about claiming an item",
        body: "I think the blue umbrella listed on the site is mine. \
               What do I need to bring to collect it?",
    },
];

/// The inbound messages for every seed contact, in order
pub fn inbound_messages(ids: &IdGenerator, now: DateTime<Utc>) -> Vec<InboundMessage> {
    SEED_CONTACTS
        .iter()
        .map(|c| InboundMessage::new(ids.next(now), c.name, c.email, c.subject, c.body, now))
        .collect()
}

/// Two-message exchange: the participant asks, staff replies an hour later
pub fn thread_for(contact: &SeedContact, ids: &IdGenerator, now: DateTime<Utc>) -> Vec<ThreadMessage> {
    let asked_at = now - Duration::hours(2);
    let replied_at = now - Duration::hours(1);

    let question = ThreadMessage::new(
        ids.next(asked_at),
        contact.email,
        contact.name,
        format!("Re: {}\n\n{}", contact.subject, contact.body),
        asked_at,
    );
    let reply = ThreadMessage::new(
        ids.next(replied_at),
        ADMIN_IDENTITY,
        ADMIN_IDENTITY,
        format!(
            "Hello {}, thanks for getting in touch. We're checking the found items log \
             and will update you here shortly.",
            first_name(contact.name)
        ),
        replied_at,
    );

    vec![question, reply]
}
