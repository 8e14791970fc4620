//! Sheet cache and mutation operations.
//!
//! All reads are served from the in-memory cache; every mutation updates
//! the cache, persists the changed structures to the durable store and
//! then broadcasts one change notification. Metadata and track lists are
//! written as two separate keys with no transaction between them, so
//! bootstrap tolerates a sheet whose track-list key is missing.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::storage::KeyValueStore;

use super::events::{SheetSubscriptions, SubscriptionId};
use super::ids::{IdGenerator, UuidIdGenerator};
use super::models::{same_music_item, MusicItem, SheetItem, SheetItemBase, SheetPatch};

/// Store key holding the sheet metadata list. Each sheet's track list is
/// stored under its own id.
pub const SHEETS_STORAGE_KEY: &str = "music-sheets";

/// Reserved id of the default sheet. Always present after a successful
/// setup and never removable.
pub const DEFAULT_SHEET_ID: &str = "favorite";

pub const DEFAULT_SHEET_TITLE: &str = "我喜欢";

fn default_sheet() -> SheetItemBase {
    SheetItemBase {
        id: DEFAULT_SHEET_ID.to_string(),
        title: DEFAULT_SHEET_TITLE.to_string(),
        cover_img: None,
    }
}

/// Cached sheet state. The metadata list and the track-list map are kept
/// in lockstep: every sheet id present in `sheets` has an entry in
/// `music_lists`.
#[derive(Default)]
struct SheetState {
    sheets: Vec<SheetItemBase>,
    music_lists: HashMap<String, Vec<MusicItem>>,
}

/// Manager for the user's music sheets.
///
/// Owns the in-memory cache and the subscription registry; persistence
/// and id generation are injected collaborators, so tests run isolated
/// instances against in-memory stores.
///
/// The cache mutex is held only across in-memory commits, never across a
/// store await. Two overlapping mutations against the same sheet can
/// therefore lose a store write; callers are expected to await each
/// mutation before issuing the next one for the same sheet id.
pub struct SheetManager {
    store: Arc<dyn KeyValueStore>,
    ids: Arc<dyn IdGenerator>,
    state: Mutex<SheetState>,
    subscriptions: SheetSubscriptions,
}

impl SheetManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_id_generator(store, Arc::new(UuidIdGenerator))
    }

    pub fn with_id_generator(store: Arc<dyn KeyValueStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            store,
            ids,
            state: Mutex::new(SheetState::default()),
            subscriptions: SheetSubscriptions::new(),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Populate the cache from the store.
    ///
    /// A missing or malformed metadata list means first run: the default
    /// sheet is seeded and persisted. Any other store failure leaves the
    /// cache untouched and is returned to the caller. Subscribers are
    /// notified exactly once per call either way.
    pub async fn setup(&self) -> Result<()> {
        let result = self.load_from_store().await;
        if let Err(e) = &result {
            warn!("Sheet setup failed, cache left unchanged: {}", e);
        }
        self.subscriptions.notify_all();
        result
    }

    async fn load_from_store(&self) -> Result<()> {
        let sheets: Vec<SheetItemBase> = match self
            .store
            .get(SHEETS_STORAGE_KEY)
            .await?
            .and_then(|value| serde_json::from_value(value).ok())
        {
            Some(sheets) => sheets,
            None => return self.seed_default_state().await,
        };

        let mut music_lists = HashMap::with_capacity(sheets.len());
        for sheet in &sheets {
            // A sheet persisted without its track-list key (crash between
            // the two writes) loads as empty.
            let music_list = match self.store.get(&sheet.id).await? {
                Some(value) => serde_json::from_value(value).unwrap_or_default(),
                None => Vec::new(),
            };
            music_lists.insert(sheet.id.clone(), music_list);
        }

        let mut state = self.state.lock().await;
        state.sheets = sheets;
        state.music_lists = music_lists;
        info!("Loaded {} sheets from store", state.sheets.len());
        Ok(())
    }

    async fn seed_default_state(&self) -> Result<()> {
        info!("No persisted sheets found, seeding default sheet");
        let sheets = vec![default_sheet()];
        self.store
            .set(SHEETS_STORAGE_KEY, serde_json::to_value(&sheets)?)
            .await?;
        self.store
            .set(DEFAULT_SHEET_ID, serde_json::Value::Array(Vec::new()))
            .await?;

        let mut state = self.state.lock().await;
        state.sheets = sheets;
        state.music_lists = HashMap::from([(DEFAULT_SHEET_ID.to_string(), Vec::new())]);
        Ok(())
    }

    // =========================================================================
    // Mutation Operations
    // =========================================================================

    /// Create a new empty sheet and return its generated id.
    pub async fn add_sheet(&self, title: &str) -> Result<String> {
        let new_id = self.ids.new_id();
        let new_sheets = {
            let state = self.state.lock().await;
            let mut sheets = state.sheets.clone();
            sheets.push(SheetItemBase {
                id: new_id.clone(),
                title: title.to_string(),
                cover_img: None,
            });
            sheets
        };

        // Two separate writes; a crash in between is recovered by setup
        // treating the missing track-list key as an empty list.
        self.store
            .set(SHEETS_STORAGE_KEY, serde_json::to_value(&new_sheets)?)
            .await?;
        self.store
            .set(&new_id, serde_json::Value::Array(Vec::new()))
            .await?;

        {
            let mut state = self.state.lock().await;
            state.sheets = new_sheets;
            state.music_lists.insert(new_id.clone(), Vec::new());
        }
        self.subscriptions.notify_all();
        info!("Added sheet {} (\"{}\")", new_id, title);
        Ok(new_id)
    }

    /// Remove a sheet and its persisted track list. Removing the default
    /// sheet or an unknown id is a silent no-op.
    pub async fn remove_sheet(&self, sheet_id: &str) -> Result<()> {
        if sheet_id == DEFAULT_SHEET_ID {
            debug!("Ignoring removal of the default sheet");
            return Ok(());
        }
        let new_sheets = {
            let state = self.state.lock().await;
            if !state.sheets.iter().any(|s| s.id == sheet_id) {
                debug!("Ignoring removal of unknown sheet {}", sheet_id);
                return Ok(());
            }
            state
                .sheets
                .iter()
                .filter(|s| s.id != sheet_id)
                .cloned()
                .collect::<Vec<_>>()
        };

        self.store.delete(sheet_id).await?;
        self.store
            .set(SHEETS_STORAGE_KEY, serde_json::to_value(&new_sheets)?)
            .await?;

        {
            let mut state = self.state.lock().await;
            state.sheets = new_sheets;
            state.music_lists.remove(sheet_id);
        }
        self.subscriptions.notify_all();
        info!("Removed sheet {}", sheet_id);
        Ok(())
    }

    /// Apply a metadata patch and/or replace a sheet's track list, then
    /// persist whatever changed. The single write path for both persisted
    /// structures; every higher-level mutation funnels through it.
    ///
    /// An unknown sheet id is a silent no-op with no notification.
    async fn update_and_save(
        &self,
        sheet_id: &str,
        patch: Option<SheetPatch>,
        music_list: Option<Vec<MusicItem>>,
    ) -> Result<()> {
        let patched_sheets = {
            let state = self.state.lock().await;
            let index = match state.sheets.iter().position(|s| s.id == sheet_id) {
                Some(index) => index,
                None => {
                    debug!("Ignoring update for unknown sheet {}", sheet_id);
                    return Ok(());
                }
            };
            patch.map(|p| {
                let mut sheets = state.sheets.clone();
                p.apply_to(&mut sheets[index]);
                sheets
            })
        };

        if let Some(sheets) = patched_sheets {
            self.store
                .set(SHEETS_STORAGE_KEY, serde_json::to_value(&sheets)?)
                .await?;
            self.state.lock().await.sheets = sheets;
        }

        if let Some(music_list) = music_list {
            self.store
                .set(sheet_id, serde_json::to_value(&music_list)?)
                .await?;
            self.state
                .lock()
                .await
                .music_lists
                .insert(sheet_id.to_string(), music_list);
        }

        self.subscriptions.notify_all();
        Ok(())
    }

    /// Add tracks to a sheet, skipping any track already present.
    ///
    /// The dedup filter runs once against the list's current state, so
    /// duplicates within the incoming batch are not cross-checked against
    /// each other. The sheet cover becomes the artwork of the resulting
    /// list's last track.
    pub async fn add_music(&self, sheet_id: &str, items: Vec<MusicItem>) -> Result<()> {
        let existing = self.music_list_snapshot(sheet_id).await;

        let fresh: Vec<MusicItem> = items
            .into_iter()
            .filter(|item| !existing.iter().any(|e| same_music_item(e, item)))
            .collect();
        let mut new_list = existing;
        new_list.extend(fresh);

        let cover = new_list.last().and_then(|m| m.artwork.clone());
        self.update_and_save(sheet_id, Some(SheetPatch::cover(cover)), Some(new_list))
            .await
    }

    /// Add a single track. See [`SheetManager::add_music`].
    pub async fn add_music_item(&self, sheet_id: &str, item: MusicItem) -> Result<()> {
        self.add_music(sheet_id, vec![item]).await
    }

    /// Remove the tracks at the given positions of a sheet's current
    /// track list and re-derive the cover.
    pub async fn remove_music_by_index(&self, sheet_id: &str, indices: Vec<usize>) -> Result<()> {
        let existing = self.music_list_snapshot(sheet_id).await;

        let new_list: Vec<MusicItem> = existing
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !indices.contains(i))
            .map(|(_, item)| item)
            .collect();

        let cover = new_list.last().and_then(|m| m.artwork.clone());
        self.update_and_save(sheet_id, Some(SheetPatch::cover(cover)), Some(new_list))
            .await
    }

    /// Remove tracks by identity: each is resolved to its current index
    /// through the track equality check, unresolved tracks are dropped,
    /// and removal delegates to [`SheetManager::remove_music_by_index`].
    pub async fn remove_music(&self, sheet_id: &str, items: Vec<MusicItem>) -> Result<()> {
        let existing = self.music_list_snapshot(sheet_id).await;

        let indices: Vec<usize> = items
            .iter()
            .filter_map(|item| existing.iter().position(|e| same_music_item(e, item)))
            .collect();
        self.remove_music_by_index(sheet_id, indices).await
    }

    async fn music_list_snapshot(&self, sheet_id: &str) -> Vec<MusicItem> {
        let state = self.state.lock().await;
        state.music_lists.get(sheet_id).cloned().unwrap_or_default()
    }

    // =========================================================================
    // View Projection
    // =========================================================================

    /// Snapshot of every sheet with its current track list. The returned
    /// records are clones; mutating them cannot affect the cache.
    pub async fn get_sheets(&self) -> Vec<SheetItem> {
        let state = self.state.lock().await;
        state
            .sheets
            .iter()
            .map(|base| {
                let music_list = state.music_lists.get(&base.id).cloned().unwrap_or_default();
                SheetItem::from_base(base.clone(), music_list)
            })
            .collect()
    }

    /// Snapshot of a single sheet, or `None` if the id is unknown.
    pub async fn get_sheet(&self, sheet_id: &str) -> Option<SheetItem> {
        let state = self.state.lock().await;
        state.sheets.iter().find(|s| s.id == sheet_id).map(|base| {
            let music_list = state.music_lists.get(&base.id).cloned().unwrap_or_default();
            SheetItem::from_base(base.clone(), music_list)
        })
    }

    /// Snapshot of the user-created sheets, excluding the default sheet.
    pub async fn get_user_sheets(&self) -> Vec<SheetItem> {
        self.get_sheets()
            .await
            .into_iter()
            .filter(|s| s.id != DEFAULT_SHEET_ID)
            .collect()
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Register a change listener; it fires after every committed
    /// mutation, with no payload. Pull a fresh projection to see content.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscriptions.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions.unsubscribe(id)
    }
}
