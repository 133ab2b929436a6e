//! Chat view: one conversation, updated live from store notifications

use std::sync::{Arc, Mutex};

use chrono::Local;
use messages::{EventKind, StoreEvent, Subscription, ThreadMessage};

use crate::app::SharedStore;

/// Keeps a rendered copy of one thread in sync with the store
pub struct ChatView {
    key: String,
    messages: Arc<Mutex<Vec<ThreadMessage>>>,
    _subscription: Subscription,
}

impl ChatView {
    pub fn open(store: &SharedStore, key: &str) -> Self {
        let messages = Arc::new(Mutex::new(store.get_thread(key)));

        let sink = Arc::clone(&messages);
        let watched = key.to_string();
        let subscription = store.subscribe(EventKind::ThreadUpdated, move |event| {
            if let StoreEvent::ThreadUpdated { key, message } = event
                && *key == watched
                && let Ok(mut messages) = sink.lock()
            {
                messages.push(message.clone());
            }
        });

        Self {
            key: key.to_string(),
            messages,
            _subscription: subscription,
        }
    }

    pub fn len(&self) -> usize {
        self.messages.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn render(&self) -> String {
        let messages = match self.messages.lock() {
            Ok(messages) => messages.clone(),
            Err(_) => return String::new(),
        };
        if messages.is_empty() {
            return format!("No messages with {}.", self.key);
        }
        messages.iter().map(render_message).collect::<Vec<_>>().join("\n")
    }
}

pub fn render_message(message: &ThreadMessage) -> String {
    let arrow = if message.is_from_admin() { "<" } else { ">" };
    format!(
        "{} [{}] {}: {}",
        arrow,
        message.date.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
        message.name,
        message.body.replace('\n', "\n    "),
    )
}
