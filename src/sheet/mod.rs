//! Music sheet (playlist) state management.
//!
//! A sheet is a named, ordered collection of tracks. The [`SheetManager`]
//! keeps an in-memory cache of every sheet and its track list, persists
//! both through a [`crate::storage::KeyValueStore`], and broadcasts a
//! payload-free change notification after each committed mutation.

mod events;
mod ids;
mod manager;
mod models;

pub use events::{SheetSubscriptions, SubscriptionId};
pub use ids::{IdGenerator, UuidIdGenerator};
pub use manager::{SheetManager, DEFAULT_SHEET_ID, DEFAULT_SHEET_TITLE, SHEETS_STORAGE_KEY};
pub use models::{same_music_item, MusicItem, SheetItem, SheetItemBase, SheetPatch};
