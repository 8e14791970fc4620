//! Durable key-value storage backends.
//!
//! The sheet manager persists its state through the [`KeyValueStore`]
//! contract; backends only need `get`/`set`/`delete` over JSON values.

mod json_file_store;
mod memory_store;
mod trait_def;

pub use json_file_store::JsonFileStore;
pub use memory_store::MemoryStore;
pub use trait_def::{KeyValueStore, StorageError};
