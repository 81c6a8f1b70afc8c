//! Telemetry metric name constants.
//!
//! Centralised metric names for mimir operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `mimir_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `class` — routing class of the request ("external-api", "image",
//!   "navigation", "generic")
//! - `partition` — cache partition name ("runtime", "images", or the
//!   versioned precache name)
//! - `served` — where the response came from: "network", "cache", or
//!   "offline-fallback"
//! - `status` — outcome: "ok" or "error"

/// Total intercepted fetches dispatched through the strategy engine.
///
/// Labels: `class`, `served`, `status` ("ok" | "error").
pub const FETCH_TOTAL: &str = "mimir_fetch_total";

/// Fetch handling duration in seconds, measured across the whole strategy.
///
/// Labels: `class`.
pub const FETCH_DURATION_SECONDS: &str = "mimir_fetch_duration_seconds";

/// Total cache partition hits.
///
/// Labels: `partition`.
pub const CACHE_HITS_TOTAL: &str = "mimir_cache_hits_total";

/// Total cache partition misses.
///
/// Labels: `partition`.
pub const CACHE_MISSES_TOTAL: &str = "mimir_cache_misses_total";

/// Total background stale-while-revalidate refreshes.
///
/// Labels: `status` ("ok" | "error").
pub const REVALIDATIONS_TOTAL: &str = "mimir_revalidations_total";

/// Total cache partitions deleted during activation.
pub const PARTITIONS_EVICTED_TOTAL: &str = "mimir_partitions_evicted_total";

/// Total install attempts.
///
/// Labels: `status` ("ok" | "error").
pub const INSTALLS_TOTAL: &str = "mimir_installs_total";

/// Total push messages handled.
///
/// Labels: `status` ("ok" | "malformed").
pub const PUSHES_TOTAL: &str = "mimir_pushes_total";
