//! KeyValueStore trait definition.
//!
//! This trait abstracts the durable store so the manager can run against
//! an in-memory map in tests and a JSON file on disk in the binary.

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

/// Trait for durable key-value storage backends.
///
/// Values are exchanged as `serde_json::Value` so backends stay agnostic
/// of the shapes stored under each key. All operations are asynchronous;
/// callers suspend at every read and write.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`, or `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: serde_json::Value) -> Result<()>;

    /// Delete the value stored under `key`. Deleting an absent key is not
    /// an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Errors produced by concrete storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
