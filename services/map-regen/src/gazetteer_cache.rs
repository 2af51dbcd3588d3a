//! Reuse of the parsed gazetteer across runs.
//!
//! The dataset rarely changes, so re-parsing it on every regeneration is
//! wasted work. The cache keeps the last result keyed by the file's path,
//! length, modification time and a CRC-32 of its contents, and reloads
//! whenever any of them differ. The checksum catches same-length edits whose
//! mtime was preserved (`cp -p`, `rsync -t`, `tar`).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use gazetteer::{Gazetteer, GazetteerLoader};
use map_common::{MapError, MapResult};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::metrics;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Fingerprint {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
    checksum: u32,
}

#[derive(Debug)]
struct Entry {
    fingerprint: Fingerprint,
    gazetteer: Arc<Gazetteer>,
}

/// Hit/miss counts since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Caches the most recently loaded gazetteer.
#[derive(Debug)]
pub struct GazetteerCache {
    loader: GazetteerLoader,
    entry: Mutex<Option<Entry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl GazetteerCache {
    pub fn new(loader: GazetteerLoader) -> Self {
        Self {
            loader,
            entry: Mutex::new(None),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The cached gazetteer for `path`, loading it if absent or stale.
    ///
    /// A failed load clears the cache so the next call retries.
    pub async fn get_or_load(&self, path: &Path) -> MapResult<Arc<Gazetteer>> {
        let fingerprint = fingerprint(path).await?;
        let mut entry = self.entry.lock().await;

        if let Some(cached) = entry.as_ref() {
            if cached.fingerprint == fingerprint {
                self.hits.fetch_add(1, Ordering::Relaxed);
                metrics::record_cache_lookup(true);
                debug!(path = %path.display(), "Gazetteer cache hit");
                return Ok(cached.gazetteer.clone());
            }
            info!(path = %path.display(), "Dataset changed, reloading gazetteer");
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        metrics::record_cache_lookup(false);
        *entry = None;

        let gazetteer = Arc::new(load_blocking(self.loader.clone(), path.to_path_buf()).await?);
        *entry = Some(Entry {
            fingerprint,
            gazetteer: gazetteer.clone(),
        });
        Ok(gazetteer)
    }

    /// Drop the cached value.
    pub async fn invalidate(&self) {
        *self.entry.lock().await = None;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Load a dataset on the blocking thread pool.
pub async fn load_blocking(loader: GazetteerLoader, path: PathBuf) -> MapResult<Gazetteer> {
    tokio::task::spawn_blocking(move || loader.load_path(&path))
        .await
        .map_err(|e| MapError::Task(format!("gazetteer load: {}", e)))?
}

async fn fingerprint(path: &Path) -> MapResult<Fingerprint> {
    let dataset_io = |e: std::io::Error| {
        MapError::Io(std::io::Error::new(
            e.kind(),
            format!("cannot read dataset {}: {}", path.display(), e),
        ))
    };
    let metadata = tokio::fs::metadata(path).await.map_err(dataset_io)?;
    let contents = tokio::fs::read(path).await.map_err(dataset_io)?;
    Ok(Fingerprint {
        path: path.to_path_buf(),
        len: metadata.len(),
        modified: metadata.modified().ok(),
        checksum: crc32fast::hash(&contents),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_common::PostalPrefix;
    use test_utils::{gazetteer_csv, postal, temp_test_dir, write_gazetteer_csv};

    #[tokio::test]
    async fn test_second_load_is_a_hit() {
        let dir = temp_test_dir();
        let path = write_gazetteer_csv(dir.path(), "p.csv", &gazetteer_csv(&postal::MAJOR_CITIES));
        let cache = GazetteerCache::new(GazetteerLoader::default());

        let first = cache.get_or_load(&path).await.unwrap();
        let second = cache.get_or_load(&path).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[tokio::test]
    async fn test_changed_dataset_reloads() {
        let dir = temp_test_dir();
        let path = write_gazetteer_csv(dir.path(), "p.csv", &gazetteer_csv(&[postal::OTTAWA_K1A]));
        let cache = GazetteerCache::new(GazetteerLoader::default());
        assert_eq!(cache.get_or_load(&path).await.unwrap().len(), 1);

        write_gazetteer_csv(dir.path(), "p.csv", &gazetteer_csv(&postal::MAJOR_CITIES));
        assert_eq!(cache.get_or_load(&path).await.unwrap().len(), postal::MAJOR_CITIES.len());
        assert_eq!(cache.stats().misses, 2);
    }

    #[tokio::test]
    async fn test_same_length_edit_with_preserved_mtime_reloads() {
        let dir = temp_test_dir();
        let path = write_gazetteer_csv(
            dir.path(),
            "p.csv",
            "POSTAL_CODE,CITY,LONGITUDE,LATITUDE\nM5V 3L9,TORONTO,-79.40,43.60\n",
        );
        let prefix = PostalPrefix::from_postal_code("M5V").unwrap();
        let cache = GazetteerCache::new(GazetteerLoader::default());
        let before = cache.get_or_load(&path).await.unwrap().resolve(&prefix).unwrap();
        assert_eq!((before.lon, before.lat), (-79.4, 43.6));
        let mtime = std::fs::metadata(&path).unwrap().modified().unwrap();

        // Same byte length, different coordinates, original mtime restored
        write_gazetteer_csv(
            dir.path(),
            "p.csv",
            "POSTAL_CODE,CITY,LONGITUDE,LATITUDE\nM5V 3L9,TORONTO,-75.70,45.42\n",
        );
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(mtime)
            .unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().modified().unwrap(), mtime);

        let after = cache.get_or_load(&path).await.unwrap().resolve(&prefix).unwrap();
        assert_eq!((after.lon, after.lat), (-75.7, 45.42));
        assert_eq!(cache.stats(), CacheStats { hits: 0, misses: 2 });
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let dir = temp_test_dir();
        let path = write_gazetteer_csv(dir.path(), "p.csv", &gazetteer_csv(&[postal::OTTAWA_K1A]));
        let cache = GazetteerCache::new(GazetteerLoader::default());
        cache.get_or_load(&path).await.unwrap();
        cache.invalidate().await;
        cache.get_or_load(&path).await.unwrap();
        assert_eq!(cache.stats().misses, 2);
    }

    #[tokio::test]
    async fn test_missing_dataset_is_io_error() {
        let dir = temp_test_dir();
        let cache = GazetteerCache::new(GazetteerLoader::default());
        let result = cache.get_or_load(&dir.path().join("absent.csv")).await;
        assert!(matches!(result, Err(MapError::Io(_))));
    }
}
