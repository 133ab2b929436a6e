//! Key-value substrate trait definition

use anyhow::Result;

/// Synchronous string key-value store
///
/// Implementations may fail on any call (quota, I/O, locking); callers in
/// this crate treat every failure as non-fatal.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` when absent
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key` if present
    fn remove(&self, key: &str) -> Result<()>;
}
