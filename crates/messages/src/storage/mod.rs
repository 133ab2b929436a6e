//! Persistence substrates for the message store
//!
//! The store only needs a string key-value interface. The trait-based design
//! allows swapping between in-memory, file and SQLite backends.

mod file;
mod memory;
mod sqlite;
mod traits;

pub use file::FileKeyValueStore;
pub use memory::InMemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;
pub use traits::KeyValueStore;
