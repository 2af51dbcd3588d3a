//! CSV loading with a malformed-row threshold.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use map_common::{MapError, MapResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::index::{Gazetteer, LoadStats};
use crate::record::{PostalRow, RowDefect};

/// Columns the dataset header must carry. Order is free.
pub const REQUIRED_COLUMNS: [&str; 4] = ["CITY", "POSTAL_CODE", "LONGITUDE", "LATITUDE"];

/// Malformed rows logged individually before going quiet.
const MAX_LOGGED_DEFECTS: usize = 20;

/// How many malformed rows a dataset may contain before it is rejected.
///
/// A load fails with [`MapError::DataIntegrity`] when the malformed count is
/// above `grace_rows` and the malformed share of all data rows is above
/// `max_ratio`. Both must hold, so a handful of bad rows in a tiny file is
/// tolerated and so is a long tail of bad rows in a huge one. A dataset with
/// no usable row at all is always rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MalformedRowPolicy {
    pub max_ratio: f64,
    pub grace_rows: usize,
}

impl Default for MalformedRowPolicy {
    fn default() -> Self {
        Self {
            max_ratio: 0.05,
            grace_rows: 10,
        }
    }
}

impl MalformedRowPolicy {
    /// Reject nothing but an empty dataset.
    pub fn lenient() -> Self {
        Self {
            max_ratio: 1.0,
            grace_rows: usize::MAX,
        }
    }

    /// Reject any malformed row.
    pub fn strict() -> Self {
        Self {
            max_ratio: 0.0,
            grace_rows: 0,
        }
    }

    pub fn validate(&self) -> MapResult<()> {
        if !self.max_ratio.is_finite() || !(0.0..=1.0).contains(&self.max_ratio) {
            return Err(MapError::InvalidConfig(format!(
                "malformed row ratio must be within [0, 1], got {}",
                self.max_ratio
            )));
        }
        Ok(())
    }

    /// Decide whether a finished load is acceptable.
    pub fn check(&self, stats: &LoadStats) -> MapResult<()> {
        if stats.rows_loaded == 0 {
            return Err(MapError::DataIntegrity(format!(
                "no usable rows ({} read, {} malformed)",
                stats.rows_read, stats.rows_malformed
            )));
        }

        if stats.rows_malformed > self.grace_rows && stats.malformed_ratio() > self.max_ratio {
            return Err(MapError::DataIntegrity(format!(
                "{} of {} rows malformed ({:.2}% > {:.2}%)",
                stats.rows_malformed,
                stats.rows_read,
                stats.malformed_ratio() * 100.0,
                self.max_ratio * 100.0
            )));
        }

        Ok(())
    }
}

/// Reads postal datasets into a [`Gazetteer`].
#[derive(Debug, Clone, Default)]
pub struct GazetteerLoader {
    policy: MalformedRowPolicy,
}

impl GazetteerLoader {
    pub fn new(policy: MalformedRowPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &MalformedRowPolicy {
        &self.policy
    }

    /// Load a dataset file.
    pub fn load_path(&self, path: &Path) -> MapResult<Gazetteer> {
        let file = File::open(path).map_err(|e| {
            MapError::Io(std::io::Error::new(
                e.kind(),
                format!("cannot open dataset {}: {}", path.display(), e),
            ))
        })?;
        info!(path = %path.display(), "Loading postal gazetteer");
        self.load_reader(BufReader::new(file))
    }

    /// Load a dataset from any reader.
    ///
    /// Blocking: returns only after the input is exhausted.
    pub fn load_reader<R: Read>(&self, reader: R) -> MapResult<Gazetteer> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers().map_err(csv_error)?.clone();
        check_required_columns(&headers)?;

        let mut gazetteer = Gazetteer::default();
        let mut stats = LoadStats::default();
        let mut record = csv::StringRecord::new();

        loop {
            match csv_reader.read_record(&mut record) {
                Ok(false) => break,
                Ok(true) => {
                    stats.rows_read += 1;
                    let line = record.position().map(|p| p.line()).unwrap_or_default();

                    let parsed = record
                        .deserialize::<PostalRow>(Some(&headers))
                        .map_err(|e| RowDefect::Unreadable(e.to_string()))
                        .and_then(PostalRow::validate);

                    match parsed {
                        Ok(postal) => {
                            stats.rows_loaded += 1;
                            gazetteer.insert(postal);
                        }
                        Err(defect) => {
                            stats.rows_malformed += 1;
                            log_defect(&stats, line, &defect);
                        }
                    }
                }
                Err(e) if e.is_io_error() => return Err(csv_error(e)),
                Err(e) => {
                    stats.rows_read += 1;
                    stats.rows_malformed += 1;
                    let line = e.position().map(|p| p.line()).unwrap_or_default();
                    log_defect(&stats, line, &RowDefect::Unreadable(e.to_string()));
                }
            }
        }

        if stats.rows_malformed > 0 {
            warn!(
                malformed = stats.rows_malformed,
                read = stats.rows_read,
                "Skipped malformed gazetteer rows"
            );
        }

        self.policy.check(&stats)?;
        gazetteer.set_stats(stats);

        info!(
            rows = stats.rows_read,
            prefixes = gazetteer.len(),
            malformed = stats.rows_malformed,
            "Gazetteer loaded"
        );

        Ok(gazetteer)
    }
}

/// Load a dataset file with the default malformed-row policy.
pub fn load(path: &Path) -> MapResult<Gazetteer> {
    GazetteerLoader::default().load_path(path)
}

fn check_required_columns(headers: &csv::StringRecord) -> MapResult<()> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(MapError::DataIntegrity(format!(
            "dataset header is missing required column(s): {}",
            missing.join(", ")
        )))
    }
}

fn log_defect(stats: &LoadStats, line: u64, defect: &RowDefect) {
    if stats.rows_malformed <= MAX_LOGGED_DEFECTS {
        debug!(line = line, reason = %defect, "Skipping malformed gazetteer row");
    }
}

fn csv_error(err: csv::Error) -> MapError {
    match err.into_kind() {
        csv::ErrorKind::Io(io) => MapError::Io(io),
        other => MapError::DataIntegrity(format!("unreadable dataset: {:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(read: usize, malformed: usize) -> LoadStats {
        LoadStats {
            rows_read: read,
            rows_loaded: read - malformed,
            rows_malformed: malformed,
        }
    }

    #[test]
    fn test_policy_grace_rows() {
        let policy = MalformedRowPolicy::default();
        // 10 bad of 12 is 83% but still within the grace count
        assert!(policy.check(&stats(12, 10)).is_ok());
        assert!(policy.check(&stats(12, 11)).is_err());
    }

    #[test]
    fn test_policy_ratio() {
        let policy = MalformedRowPolicy::default();
        assert!(policy.check(&stats(1000, 50)).is_ok());
        assert!(policy.check(&stats(1000, 51)).is_err());
    }

    #[test]
    fn test_policy_rejects_empty() {
        let err = MalformedRowPolicy::lenient().check(&stats(3, 3)).unwrap_err();
        assert!(matches!(err, MapError::DataIntegrity(_)));
        assert!(MalformedRowPolicy::lenient().check(&stats(0, 0)).is_err());
    }

    #[test]
    fn test_strict_policy() {
        assert!(MalformedRowPolicy::strict().check(&stats(100, 0)).is_ok());
        assert!(MalformedRowPolicy::strict().check(&stats(100, 1)).is_err());
    }

    #[test]
    fn test_policy_validation() {
        let bad = MalformedRowPolicy {
            max_ratio: 1.5,
            grace_rows: 0,
        };
        assert!(matches!(bad.validate(), Err(MapError::InvalidConfig(_))));
        assert!(MalformedRowPolicy::default().validate().is_ok());
    }
}
