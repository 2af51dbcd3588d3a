//! Story density map regeneration service library.
//!
//! Ties the gazetteer, projection and renderer together into one
//! regeneration run, publishes the result atomically, and serializes
//! triggers through a coalescing background queue.

pub mod config;
pub mod gazetteer_cache;
pub mod metrics;
pub mod orchestrator;
pub mod publish;
pub mod queue;
pub mod store;
pub mod watcher;

pub use config::RegenConfig;
pub use gazetteer_cache::{CacheStats, GazetteerCache};
pub use orchestrator::{RegenerationSummary, Regenerator};
pub use publish::{publish_atomically, publish_with};
pub use queue::{RegenerationQueue, RunOutcome, Ticket};
pub use store::{InMemoryStore, JsonFileStore, LocationSource, StoryRecord};
pub use watcher::{run_watcher, StoreWatcher};
