//! Record sources: where the story locations come from.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use map_common::{MapError, MapResult, PostalPrefix, StoryLocationRef};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Supplies the location of every story that belongs on the map.
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// All approved records with a usable postal prefix.
    async fn fetch_all_location_refs(&self) -> MapResult<Vec<StoryLocationRef>>;
}

/// A story as exported by the web application.
///
/// Only the fields the map needs are read; the rest of the export is
/// ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryRecord {
    pub id: String,
    pub postal: String,
    #[serde(default)]
    pub approved: bool,
}

impl StoryRecord {
    pub fn new(id: impl Into<String>, postal: impl Into<String>, approved: bool) -> Self {
        Self {
            id: id.into(),
            postal: postal.into(),
            approved,
        }
    }
}

/// Keep approved records with a usable prefix.
fn approved_refs(records: &[StoryRecord]) -> Vec<StoryLocationRef> {
    records
        .iter()
        .filter(|r| r.approved)
        .filter_map(|r| match PostalPrefix::from_postal_code(&r.postal) {
            Some(prefix) => Some(StoryLocationRef::new(r.id.clone(), prefix)),
            None => {
                warn!(id = %r.id, postal = %r.postal, "Story has no usable postal prefix, skipping");
                None
            }
        })
        .collect()
}

/// Reads a JSON array of [`StoryRecord`]s from disk on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LocationSource for JsonFileStore {
    async fn fetch_all_location_refs(&self) -> MapResult<Vec<StoryLocationRef>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            MapError::Store(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        let records: Vec<StoryRecord> = serde_json::from_slice(&bytes)?;
        let refs = approved_refs(&records);
        debug!(
            path = %self.path.display(),
            records = records.len(),
            approved = refs.len(),
            "Fetched story records"
        );
        Ok(refs)
    }
}

/// Records held in memory, for embedding and tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<StoryRecord>>,
}

impl InMemoryStore {
    pub fn new(records: Vec<StoryRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub async fn insert(&self, record: StoryRecord) {
        self.records.write().await.push(record);
    }

    /// Mark a record approved. Returns whether it was found.
    pub async fn approve(&self, id: &str) -> bool {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.approved = true;
                true
            }
            None => false,
        }
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl LocationSource for InMemoryStore {
    async fn fetch_all_location_refs(&self) -> MapResult<Vec<StoryLocationRef>> {
        Ok(approved_refs(&self.records.read().await))
    }
}
