//! Integration tests for the messages crate
//!
//! These tests drive the store through each persistence substrate and check
//! the notification contract the inbox and chat renderers depend on.

use std::sync::{Arc, Mutex};

use messages::query::list_conversations;
use messages::storage::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore, SqliteKeyValueStore};
use messages::{
    ADMIN_IDENTITY, ADMIN_NAME, EventKind, MESSAGES_KEY, MessageId, MessageThreadStore, StoreEvent,
    THREADS_KEY,
};
use tempfile::TempDir;

/// Helper to collect every event a store dispatches
fn record_all(store: &MessageThreadStore) -> (Arc<Mutex<Vec<StoreEvent>>>, messages::Subscription) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let sub = store.subscribe(EventKind::Any, move |e| sink.lock().unwrap().push(e.clone()));
    (events, sub)
}

fn exercise_round_trip(substrate: Arc<dyn KeyValueStore>) {
    let store = MessageThreadStore::open(Arc::clone(&substrate));
    assert_eq!(store.get_all().len(), 2);

    let jane = store
        .get_all()
        .into_iter()
        .find(|m| m.email == "jane@example.com")
        .unwrap();
    store.remove(jane.id);
    let reply = store.send_as_admin("john@example.com", "We found a brown wallet.").message;
    let question = store.send_as_participant("new@x.com", "New User", "Hello").message;
    drop(store);

    let reopened = MessageThreadStore::open(substrate);
    let all = reopened.get_all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].email, "john@example.com");

    let john = reopened.get_thread("john@example.com");
    assert_eq!(john.len(), 3);
    assert_eq!(john[2], reply);
    assert_eq!(reopened.get_thread("new@x.com"), vec![question]);
}

#[test]
fn test_round_trip_in_memory() {
    exercise_round_trip(Arc::new(InMemoryKeyValueStore::new()));
}

#[test]
fn test_round_trip_file() {
    let dir = TempDir::new().unwrap();
    exercise_round_trip(Arc::new(FileKeyValueStore::new(dir.path().join("kv")).unwrap()));
}

#[test]
fn test_round_trip_sqlite() {
    let dir = TempDir::new().unwrap();
    exercise_round_trip(Arc::new(
        SqliteKeyValueStore::new(dir.path().join("store.test.sqlite")).unwrap(),
    ));
}

#[test]
fn test_fresh_store_scenario() {
    let store = MessageThreadStore::open(Arc::new(InMemoryKeyValueStore::new()));

    assert_eq!(store.get_all().len(), 2);
    let thread = store.get_thread("john@example.com");
    assert_eq!(thread.len(), 2);
    assert_eq!(thread[0].sender, "john@example.com");
    assert_eq!(thread[1].sender, ADMIN_IDENTITY);
    assert!(thread[0].date < thread[1].date);
}

#[test]
fn test_new_participant_scenario() {
    let store = MessageThreadStore::open(Arc::new(InMemoryKeyValueStore::new()));
    let (events, _sub) = record_all(&store);

    let sent = store.send("new@x.com", "New User", "Hello", Some("new@x.com")).message;

    assert_eq!(sent.name, "New User");
    assert_eq!(store.get_thread("new@x.com"), vec![sent.clone()]);
    assert_eq!(
        *events.lock().unwrap(),
        vec![StoreEvent::ThreadUpdated {
            key: "new@x.com".to_string(),
            message: sent,
        }]
    );
}

#[test]
fn test_admin_label_regardless_of_name() {
    let store = MessageThreadStore::open(Arc::new(InMemoryKeyValueStore::new()));
    for name in ["", "Jane Doe", "admin", "ADMIN"] {
        let sent = store.send("jane@example.com", name, "ok", Some(ADMIN_IDENTITY));
        assert_eq!(sent.message.name, ADMIN_NAME);
    }
}

#[test]
fn test_event_order_matches_call_order() {
    let store = MessageThreadStore::open(Arc::new(InMemoryKeyValueStore::new()));
    let (events, sub) = record_all(&store);

    store.remove(MessageId::new(42));
    let sent = store.send_as_admin("john@example.com", "hi").message;
    store.remove(MessageId::new(43));

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            StoreEvent::Deleted { id: MessageId::new(42) },
            StoreEvent::ThreadUpdated {
                key: "john@example.com".to_string(),
                message: sent,
            },
            StoreEvent::Deleted { id: MessageId::new(43) },
        ]
    );

    sub.unsubscribe();
    store.remove(MessageId::new(44));
    assert_eq!(events.lock().unwrap().len(), 3);
}

#[test]
fn test_independent_renderers() {
    let store = Arc::new(MessageThreadStore::open(Arc::new(InMemoryKeyValueStore::new())));

    // Chat view: tracks one thread. Inbox view: tracks conversation count.
    let chat = Arc::new(Mutex::new(store.get_thread("jane@example.com")));
    let inbox = Arc::new(Mutex::new(list_conversations(&store).len()));

    let _chat_sub = {
        let chat = Arc::clone(&chat);
        store.subscribe(EventKind::ThreadUpdated, move |e| {
            if let StoreEvent::ThreadUpdated { key, message } = e
                && key == "jane@example.com"
            {
                chat.lock().unwrap().push(message.clone());
            }
        })
    };
    let _inbox_sub = {
        let weak = Arc::downgrade(&store);
        let inbox = Arc::clone(&inbox);
        store.subscribe(EventKind::Any, move |_| {
            if let Some(store) = weak.upgrade() {
                *inbox.lock().unwrap() = list_conversations(&store).len();
            }
        })
    };

    store.send_as_admin("jane@example.com", "Bring photo ID.");
    store.send_as_participant("sam@example.com", "Sam", "Did anyone hand in keys?");

    assert_eq!(*chat.lock().unwrap(), store.get_thread("jane@example.com"));
    assert_eq!(*inbox.lock().unwrap(), 3);
}

#[test]
fn test_persisted_format() {
    let kv = Arc::new(InMemoryKeyValueStore::new());
    let store = MessageThreadStore::open(kv.clone());
    store.send_as_participant("new@x.com", "New User", "Hello");

    let messages: serde_json::Value = serde_json::from_str(&kv.read(MESSAGES_KEY).unwrap().unwrap()).unwrap();
    let first = &messages[0];
    for field in ["id", "from", "email", "subject", "body", "date"] {
        assert!(first.get(field).is_some(), "missing {}", field);
    }

    let threads: serde_json::Value = serde_json::from_str(&kv.read(THREADS_KEY).unwrap().unwrap()).unwrap();
    let new_thread = threads["new@x.com"].as_array().unwrap();
    assert_eq!(new_thread.len(), 1);
    assert_eq!(new_thread[0]["name"], "New User");
    assert_eq!(new_thread[0]["sender"], "new@x.com");
    assert_eq!(new_thread[0]["body"], "Hello");
}
