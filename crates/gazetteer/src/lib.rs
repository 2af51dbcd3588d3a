//! Postal-code gazetteer.
//!
//! Reads the reference postal dataset (a CSV with `CITY`, `POSTAL_CODE`,
//! `LONGITUDE` and `LATITUDE` columns) into two in-memory indexes:
//!
//! - prefix index: three-character postal prefix to the coordinates of the
//!   first row carrying it
//! - city index: upper-cased city name to the prefixes seen for it, in
//!   first-seen order
//!
//! Loading is a single blocking pass; a [`Gazetteer`] is only handed out
//! once the input is exhausted and the malformed-row policy is satisfied.

pub mod index;
pub mod loader;
pub mod record;

pub use index::{Gazetteer, LoadStats, PostalRecord};
pub use loader::{load, GazetteerLoader, MalformedRowPolicy, REQUIRED_COLUMNS};
pub use record::{PostalRow, RowDefect};
