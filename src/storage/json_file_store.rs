//! JSON file backed key-value store.
//!
//! Keeps the whole key space as a single JSON object in one file and
//! rewrites the file after every mutation. Suits the small data set the
//! sheet manager persists; not built for large or hot key spaces.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;

use super::trait_def::{KeyValueStore, StorageError};

type Dump = HashMap<String, serde_json::Value>;

/// Key-value store persisted as a single pretty-printed JSON file.
pub struct JsonFileStore {
    file_path: PathBuf,
    dump: Mutex<Dump>,
}

impl JsonFileStore {
    /// Open a store at `file_path`, loading existing content if the file
    /// is present and readable. An unreadable or malformed file starts
    /// the store empty rather than failing the open.
    pub async fn open(file_path: PathBuf) -> Self {
        let dump = match Self::load_dump(&file_path).await {
            Ok(dump) => dump,
            Err(e) => {
                warn!("Starting with empty store, could not load {:?}: {}", file_path, e);
                Dump::default()
            }
        };
        Self {
            file_path,
            dump: Mutex::new(dump),
        }
    }

    async fn load_dump(file_path: &PathBuf) -> Result<Dump, StorageError> {
        if !tokio::fs::try_exists(file_path).await? {
            return Ok(Dump::default());
        }
        let content = tokio::fs::read_to_string(file_path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    async fn save_dump(&self, dump: &Dump) -> Result<(), StorageError> {
        let json_string = serde_json::to_string_pretty(dump)?;
        tokio::fs::write(&self.file_path, json_string).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.dump.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<()> {
        let mut dump = self.dump.lock().await;
        dump.insert(key.to_string(), value);
        self.save_dump(&dump).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut dump = self.dump.lock().await;
        dump.remove(key);
        self.save_dump(&dump).await?;
        Ok(())
    }
}
