//! Polls the record source for newly approved stories.
//!
//! Stands in for the web application's post-insert hook when the service
//! runs on its own: every record id not seen before fires
//! [`RegenerationQueue::on_new_approved_record`].

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use map_common::{MapResult, StoryLocationRef};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::queue::RegenerationQueue;
use crate::store::LocationSource;

/// Tracks which record ids have already been seen.
pub struct StoreWatcher {
    source: Arc<dyn LocationSource>,
    seen: HashSet<String>,
}

impl StoreWatcher {
    pub fn new(source: Arc<dyn LocationSource>) -> Self {
        Self {
            source,
            seen: HashSet::new(),
        }
    }

    /// Mark everything currently in the store as seen.
    ///
    /// Returns the number of records found.
    pub async fn prime(&mut self) -> MapResult<usize> {
        let refs = self.source.fetch_all_location_refs().await?;
        self.seen.extend(refs.into_iter().map(|r| r.id));
        Ok(self.seen.len())
    }

    /// Records that appeared since the last call.
    pub async fn new_records(&mut self) -> MapResult<Vec<StoryLocationRef>> {
        let refs = self.source.fetch_all_location_refs().await?;
        Ok(refs
            .into_iter()
            .filter(|r| self.seen.insert(r.id.clone()))
            .collect())
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

/// Poll until `shutdown` fires, triggering a regeneration per new record.
pub async fn run_watcher(
    mut watcher: StoreWatcher,
    queue: Arc<RegenerationQueue>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    info!(interval_secs = interval.as_secs(), "Watching record store for approvals");

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                info!("Store watcher shutting down");
                break;
            }
            _ = ticker.tick() => {
                match watcher.new_records().await {
                    Ok(records) if records.is_empty() => debug!("No new approved records"),
                    Ok(records) => {
                        for record in &records {
                            queue.on_new_approved_record(record);
                        }
                    }
                    Err(e) => warn!(error = %e, "Polling record store failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, StoryRecord};

    #[tokio::test]
    async fn test_new_records_reports_each_id_once() {
        let store = Arc::new(InMemoryStore::new(vec![StoryRecord::new("a", "M5V 3L9", true)]));
        let mut watcher = StoreWatcher::new(store.clone());
        assert_eq!(watcher.prime().await.unwrap(), 1);
        assert!(watcher.new_records().await.unwrap().is_empty());

        store.insert(StoryRecord::new("b", "K1A 0B1", true)).await;
        let fresh = watcher.new_records().await.unwrap();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].id, "b");
        assert!(watcher.new_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_approval_makes_record_new() {
        let store = Arc::new(InMemoryStore::new(vec![StoryRecord::new("a", "H2X 1Y4", false)]));
        let mut watcher = StoreWatcher::new(store.clone());
        assert_eq!(watcher.prime().await.unwrap(), 0);

        assert!(store.approve("a").await);
        let fresh = watcher.new_records().await.unwrap();
        assert_eq!(fresh.len(), 1);
        assert_eq!(watcher.seen_count(), 1);
    }
}
