//! Sheet Manager Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod config;
pub mod sheet;
pub mod storage;

// Re-export commonly used types for convenience
pub use sheet::{
    same_music_item, IdGenerator, MusicItem, SheetItem, SheetItemBase, SheetManager,
    SubscriptionId, UuidIdGenerator, DEFAULT_SHEET_ID, DEFAULT_SHEET_TITLE, SHEETS_STORAGE_KEY,
};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
