//! In-memory prefix and city indexes.

use std::collections::{BTreeMap, HashMap};

use map_common::{GeoCoord, PostalPrefix};

/// A validated dataset row collapsed to its prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct PostalRecord {
    pub prefix: PostalPrefix,
    pub city: String,
    pub coord: GeoCoord,
}

/// Counters gathered while loading a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Data rows encountered, excluding the header.
    pub rows_read: usize,
    /// Rows that passed validation (duplicates of a prefix included).
    pub rows_loaded: usize,
    /// Rows skipped as malformed.
    pub rows_malformed: usize,
}

impl LoadStats {
    pub fn malformed_ratio(&self) -> f64 {
        if self.rows_read == 0 {
            0.0
        } else {
            self.rows_malformed as f64 / self.rows_read as f64
        }
    }
}

/// Prefix and city lookups built from one pass over the dataset.
///
/// Immutable once built. The first row seen for a prefix decides its
/// coordinates; later rows only extend the city index.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    prefix_index: HashMap<PostalPrefix, PostalRecord>,
    city_index: BTreeMap<String, Vec<PostalPrefix>>,
    stats: LoadStats,
}

impl Gazetteer {
    /// Build a gazetteer directly from records, in order.
    pub fn from_records(records: impl IntoIterator<Item = PostalRecord>) -> Self {
        let mut gazetteer = Self::default();
        for record in records {
            gazetteer.stats.rows_read += 1;
            gazetteer.stats.rows_loaded += 1;
            gazetteer.insert(record);
        }
        gazetteer
    }

    /// Add a record. Returns whether its prefix was new.
    pub(crate) fn insert(&mut self, record: PostalRecord) -> bool {
        let prefixes = self.city_index.entry(city_key(&record.city)).or_default();
        if !prefixes.contains(&record.prefix) {
            prefixes.push(record.prefix.clone());
        }

        if self.prefix_index.contains_key(&record.prefix) {
            return false;
        }
        self.prefix_index.insert(record.prefix.clone(), record);
        true
    }

    pub(crate) fn set_stats(&mut self, stats: LoadStats) {
        self.stats = stats;
    }

    /// Coordinates for a prefix.
    pub fn resolve(&self, prefix: &PostalPrefix) -> Option<GeoCoord> {
        self.prefix_index.get(prefix).map(|r| r.coord)
    }

    /// The record that won a prefix.
    pub fn record(&self, prefix: &PostalPrefix) -> Option<&PostalRecord> {
        self.prefix_index.get(prefix)
    }

    /// Prefixes seen for a city, matched case-insensitively.
    pub fn prefixes_for_city(&self, city: &str) -> &[PostalPrefix] {
        self.city_index
            .get(&city_key(city))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Known city names (upper-cased), sorted.
    pub fn cities(&self) -> impl Iterator<Item = &str> {
        self.city_index.keys().map(String::as_str)
    }

    /// Number of distinct prefixes.
    pub fn len(&self) -> usize {
        self.prefix_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefix_index.is_empty()
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }
}

fn city_key(city: &str) -> String {
    city.trim().to_uppercase()
}
