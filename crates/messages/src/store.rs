//! The message-thread store
//!
//! Owns the flat inbound list and the per-participant thread map, mirrors
//! both into a [`KeyValueStore`] after every mutation, and notifies
//! subscribers synchronously.
//!
//! The in-memory copy is the source of truth for the lifetime of the store.
//! Substrate failures are logged and reported through [`Persistence`]; they
//! never undo a mutation and never surface as errors.

use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::clock::{Clock, IdGenerator, SystemClock};
use crate::events::{EventKind, StoreEvent, Subscribers, Subscription};
use crate::models::{ADMIN_IDENTITY, InboundMessage, MessageId, ThreadMessage};
use crate::seed::{self, SEED_CONTACTS};
use crate::storage::KeyValueStore;

/// Substrate key for the flat inbound list
pub const MESSAGES_KEY: &str = "lostfound.messages";

/// Substrate key for the thread map
pub const THREADS_KEY: &str = "lostfound.threads";

type ThreadMap = BTreeMap<String, Vec<ThreadMessage>>;

/// Result of mirroring a collection into the substrate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    Saved,
    Failed { key: &'static str, reason: String },
}

impl Persistence {
    pub fn is_saved(&self) -> bool {
        matches!(self, Persistence::Saved)
    }
}

/// A value created by the store plus how persisting it went
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent<T = ThreadMessage> {
    pub message: T,
    pub persistence: Persistence,
}

impl<T> Sent<T> {
    pub fn into_message(self) -> T {
        self.message
    }
}

/// Inbound messages and citizen/staff conversations
pub struct MessageThreadStore {
    substrate: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ids: IdGenerator,
    messages: RwLock<Vec<InboundMessage>>,
    threads: RwLock<ThreadMap>,
    subscribers: Subscribers,
}

impl MessageThreadStore {
    /// Load (and seed if empty) a store backed by `substrate`, using wall-clock time
    pub fn open(substrate: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(substrate, Arc::new(SystemClock))
    }

    /// Load (and seed if empty) a store with an explicit time source
    pub fn with_clock(substrate: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let ids = IdGenerator::new();
        let now = clock.now();

        let mut messages: Vec<InboundMessage> = load_or_default(substrate.as_ref(), MESSAGES_KEY);
        for msg in &messages {
            ids.observe(msg.id);
        }

        let mut threads: ThreadMap = load_or_default(substrate.as_ref(), THREADS_KEY);
        threads.retain(|_, thread| !thread.is_empty());
        for msg in threads.values().flatten() {
            ids.observe(msg.id);
        }

        if messages.is_empty() {
            messages = seed::inbound_messages(&ids, now);
            info!("Seeded {} example inbound messages", messages.len());
            let _ = save(substrate.as_ref(), MESSAGES_KEY, &messages);
        }

        let mut seeded_threads = 0;
        for contact in &SEED_CONTACTS {
            if !threads.contains_key(contact.email) {
                threads.insert(contact.email.to_string(), seed::thread_for(contact, &ids, now));
                seeded_threads += 1;
            }
        }
        if seeded_threads > 0 {
            info!("Seeded {} example threads", seeded_threads);
            let _ = save(substrate.as_ref(), THREADS_KEY, &threads);
        }

        Self {
            substrate,
            clock,
            ids,
            messages: RwLock::new(messages),
            threads: RwLock::new(threads),
            subscribers: Subscribers::new(),
        }
    }

    /// All inbound messages in insertion order (a copy)
    pub fn get_all(&self) -> Vec<InboundMessage> {
        self.read_messages().clone()
    }

    /// Delete every inbound message with `id`
    ///
    /// A [`StoreEvent::Deleted`] is dispatched even when nothing matched.
    pub fn remove(&self, id: MessageId) -> Persistence {
        let persistence = {
            let mut messages = self.write_messages();
            let before = messages.len();
            messages.retain(|m| m.id != id);
            debug!("Removed {} message(s) with id {}", before - messages.len(), id);
            save(self.substrate.as_ref(), MESSAGES_KEY, &*messages)
        };

        self.subscribers.dispatch(&StoreEvent::Deleted { id });
        persistence
    }

    /// Messages exchanged with `key`, oldest first (a copy; empty when unknown)
    pub fn get_thread(&self, key: &str) -> Vec<ThreadMessage> {
        self.read_threads().get(key).cloned().unwrap_or_default()
    }

    /// Participant keys that have at least one message
    pub fn thread_keys(&self) -> Vec<String> {
        self.read_threads().keys().cloned().collect()
    }

    /// Append a message to the thread for `key`, creating it if needed
    ///
    /// `sender` defaults to [`ADMIN_IDENTITY`], in which case the stored name
    /// is always [`crate::models::ADMIN_NAME`]. Nothing is validated; empty
    /// bodies are the caller's concern.
    pub fn send(&self, key: &str, display_name: &str, body: &str, sender: Option<&str>) -> Sent {
        let sender = sender.unwrap_or(ADMIN_IDENTITY);
        let now = self.clock.now();
        let message = ThreadMessage::new(self.ids.next(now), sender, display_name, body, now);

        let persistence = {
            let mut threads = self.write_threads();
            threads.entry(key.to_string()).or_default().push(message.clone());
            save(self.substrate.as_ref(), THREADS_KEY, &*threads)
        };

        self.subscribers.dispatch(&StoreEvent::ThreadUpdated {
            key: key.to_string(),
            message: message.clone(),
        });
        Sent {
            message,
            persistence,
        }
    }

    /// Staff reply to `key`
    pub fn send_as_admin(&self, key: &str, body: &str) -> Sent {
        self.send(key, "", body, None)
    }

    /// Message from the participant identified by `key`
    pub fn send_as_participant(&self, key: &str, display_name: &str, body: &str) -> Sent {
        self.send(key, display_name, body, Some(key))
    }

    /// Record a new inbound message (e.g. from the contact form)
    pub fn receive(
        &self,
        from: &str,
        email: &str,
        subject: &str,
        body: &str,
    ) -> Sent<InboundMessage> {
        let now = self.clock.now();
        let message = InboundMessage::new(self.ids.next(now), from, email, subject, body, now);

        let persistence = {
            let mut messages = self.write_messages();
            messages.push(message.clone());
            save(self.substrate.as_ref(), MESSAGES_KEY, &*messages)
        };

        self.subscribers.dispatch(&StoreEvent::Received {
            message: message.clone(),
        });
        Sent {
            message,
            persistence,
        }
    }

    /// Listen for changes of `kind`
    ///
    /// The handler runs synchronously inside the mutating call, after the
    /// change is visible through the getters.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(kind, handler)
    }

    fn read_messages(&self) -> RwLockReadGuard<'_, Vec<InboundMessage>> {
        self.messages.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_messages(&self) -> RwLockWriteGuard<'_, Vec<InboundMessage>> {
        self.messages.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_threads(&self) -> RwLockReadGuard<'_, ThreadMap> {
        self.threads.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_threads(&self) -> RwLockWriteGuard<'_, ThreadMap> {
        self.threads.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read and decode `key`, falling back to the default on absence or any error
fn load_or_default<T: DeserializeOwned + Default>(substrate: &dyn KeyValueStore, key: &str) -> T {
    match substrate.read(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Discarding undecodable data under {}: {}", key, e);
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            warn!("Failed to read {}: {:#}", key, e);
            T::default()
        }
    }
}

/// Encode and write `value` under `key`, logging failures
fn save<T: Serialize + ?Sized>(substrate: &dyn KeyValueStore, key: &'static str, value: &T) -> Persistence {
    let result = serde_json::to_string(value)
        .map_err(anyhow::Error::from)
        .and_then(|raw| substrate.write(key, &raw));

    match result {
        Ok(()) => Persistence::Saved,
        Err(e) => {
            warn!("Failed to persist {}: {:#}", key, e);
            Persistence::Failed {
                key,
                reason: format!("{:#}", e),
            }
        }
    }
}
