//! Observer hook for match telemetry.
//!
//! The engine itself stays pure; services that want latency or disposition
//! counters install a recorder once at startup and every matcher in the
//! process reports through it.

use std::sync::{Arc, OnceLock, RwLock};
use std::time::Duration;

use crate::types::{MatchReason, MatchStatus};

/// Metrics observer for the matching layer.
pub trait MatchMetrics: Send + Sync {
    fn record_match(
        &self,
        status: MatchStatus,
        reason: MatchReason,
        latency: Duration,
        candidate_count: usize,
    );
}

/// Install or clear the global match metrics recorder.
pub fn set_match_metrics(recorder: Option<Arc<dyn MatchMetrics>>) {
    let lock = metrics_lock();
    let mut guard = lock.write().expect("match metrics lock poisoned");
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn MatchMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn MatchMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn MatchMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}
