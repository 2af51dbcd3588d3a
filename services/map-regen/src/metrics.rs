//! Regeneration metrics.
//!
//! Emitted through the `metrics` facade; the embedding process decides
//! whether and how to export them.

use metrics::{counter, gauge, histogram};

use crate::orchestrator::RegenerationSummary;

/// Record a successful run.
pub fn record_run_success(summary: &RegenerationSummary) {
    counter!("map_regen_runs_total", "outcome" => "success").increment(1);
    counter!("map_regen_unresolved_total").increment(summary.unresolved as u64);
    counter!("map_regen_out_of_range_total").increment(summary.out_of_range as u64);
    gauge!("map_regen_markers").set(summary.markers_drawn as f64);
    gauge!("map_regen_output_bytes").set(summary.bytes_written as f64);
    histogram!("map_regen_run_duration_seconds").record(summary.duration_ms as f64 / 1000.0);
}

/// Record a failed run by error kind.
pub fn record_run_failure(kind: &'static str) {
    counter!("map_regen_runs_total", "outcome" => "failure").increment(1);
    counter!("map_regen_failures_total", "kind" => kind).increment(1);
}

/// Record a regeneration request, and whether it was folded into a
/// pending run.
pub fn record_trigger(coalesced: bool) {
    counter!("map_regen_triggers_total").increment(1);
    if coalesced {
        counter!("map_regen_triggers_coalesced_total").increment(1);
    }
}

/// Record a gazetteer cache lookup.
pub fn record_cache_lookup(hit: bool) {
    if hit {
        counter!("map_regen_gazetteer_cache_hits_total").increment(1);
    } else {
        counter!("map_regen_gazetteer_cache_misses_total").increment(1);
    }
}
