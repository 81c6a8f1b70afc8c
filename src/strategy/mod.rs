//! Fetch strategy engine.
//!
//! One strategy per [`RoutingClass`], dispatched by an exhaustive match:
//!
//! - **external-api** → network-only. Responses are returned verbatim and
//!   never written to a managed partition; on network failure a document
//!   navigation gets the precached offline page, anything else surfaces
//!   the error.
//! - **image** → cache-first. A hit returns immediately with no network
//!   call; a miss fetches, fills the image partition and returns the live
//!   response. Entries are never refreshed until evicted wholesale.
//! - **navigation** → network-first. Success lands a copy in the runtime
//!   partition; failure falls back to the exact cached match, then the
//!   offline page.
//! - **generic** → stale-while-revalidate. A cached entry is returned
//!   immediately while a detached refresh silently replaces it for future
//!   requests.
//!
//! Every cache write is fire-and-forget with respect to the returned
//! response: writes are spawned through [`WaitUntil`] so the host can keep
//! the worker alive until they finish, and their failure never affects the
//! response already promised to the caller.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument, warn};

use crate::cache::{CacheStorage, IMAGE_PARTITION, RUNTIME_PARTITION};
use crate::host::WaitUntil;
use crate::net::NetworkBackend;
use crate::routing::RoutingClass;
use crate::telemetry;
use crate::types::{RequestRecord, ResponseRecord};
use crate::Result;

/// Where a handled response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    /// Live response from the network.
    Network,
    /// Captured response from a cache partition.
    Cache,
    /// The precached offline fallback page.
    OfflineFallback,
}

impl ServedFrom {
    /// Stable label for logging and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServedFrom::Network => "network",
            ServedFrom::Cache => "cache",
            ServedFrom::OfflineFallback => "offline-fallback",
        }
    }
}

/// A handled fetch: the response plus where it came from.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub response: ResponseRecord,
    pub served_from: ServedFrom,
}

impl FetchOutcome {
    fn network(response: ResponseRecord) -> Self {
        Self {
            response,
            served_from: ServedFrom::Network,
        }
    }

    fn cached(response: ResponseRecord) -> Self {
        Self {
            response,
            served_from: ServedFrom::Cache,
        }
    }
}

/// Executes the per-class fetch strategies.
///
/// Holds only shared references; each in-flight fetch progresses its own
/// strategy instance with no cross-request state.
pub(crate) struct StrategyEngine {
    storage: Arc<CacheStorage>,
    backend: Arc<dyn NetworkBackend>,
    wait_until: Arc<WaitUntil>,
    precache_name: String,
    offline_key: String,
}

impl StrategyEngine {
    pub(crate) fn new(
        storage: Arc<CacheStorage>,
        backend: Arc<dyn NetworkBackend>,
        wait_until: Arc<WaitUntil>,
        precache_name: String,
        offline_key: String,
    ) -> Self {
        Self {
            storage,
            backend,
            wait_until,
            precache_name,
            offline_key,
        }
    }

    /// Run the strategy owning `class` for `request`.
    #[instrument(skip(self, request), fields(url = %request.url, class = %class))]
    pub(crate) async fn handle(
        &self,
        class: RoutingClass,
        request: &RequestRecord,
    ) -> Result<FetchOutcome> {
        let start = Instant::now();
        let result = match class {
            RoutingClass::ExternalApi => self.network_only(request).await,
            RoutingClass::Image => self.cache_first(request).await,
            RoutingClass::Navigation => self.network_first(request).await,
            RoutingClass::Generic => self.stale_while_revalidate(request).await,
        };
        Self::record_fetch(class, &result, start);
        result
    }

    // ========================================================================
    // Strategies
    // ========================================================================

    /// Network-only with offline fallback (external-api).
    async fn network_only(&self, request: &RequestRecord) -> Result<FetchOutcome> {
        match self.backend.fetch(request).await {
            Ok(response) => Ok(FetchOutcome::network(response)),
            Err(e) if e.is_network() && request.is_navigation() => {
                debug!(url = %request.url, "api navigation failed, trying offline page");
                match self.offline_fallback().await {
                    Some(outcome) => Ok(outcome),
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Cache-first with background fill (image).
    async fn cache_first(&self, request: &RequestRecord) -> Result<FetchOutcome> {
        let images = self.storage.open(IMAGE_PARTITION);
        if let Some(response) = images.get(request).await {
            return Ok(FetchOutcome::cached(response));
        }

        let response = self.backend.fetch(request).await?;
        if response.is_success() {
            let stored = response.clone();
            let request = request.clone();
            self.wait_until.extend(async move {
                images.put(&request, stored).await;
            });
        }
        Ok(FetchOutcome::network(response))
    }

    /// Network-first with cache fallback, then the offline page (navigation).
    async fn network_first(&self, request: &RequestRecord) -> Result<FetchOutcome> {
        let runtime = self.storage.open(RUNTIME_PARTITION);
        match self.backend.fetch(request).await {
            Ok(response) => {
                if response.is_success() {
                    let stored = response.clone();
                    let request = request.clone();
                    let runtime = Arc::clone(&runtime);
                    self.wait_until.extend(async move {
                        runtime.put(&request, stored).await;
                    });
                }
                Ok(FetchOutcome::network(response))
            }
            Err(e) if e.is_network() => {
                // A cached match for the exact request beats the offline page
                if let Some(response) = runtime.get(request).await {
                    return Ok(FetchOutcome::cached(response));
                }
                match self.offline_fallback().await {
                    Some(outcome) => Ok(outcome),
                    None => {
                        warn!(url = %request.url, "offline navigation with no fallback available");
                        Err(e)
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Stale-while-revalidate (generic).
    async fn stale_while_revalidate(&self, request: &RequestRecord) -> Result<FetchOutcome> {
        let runtime = self.storage.open(RUNTIME_PARTITION);
        if let Some(cached) = runtime.get(request).await {
            // Detached refresh. The caller never waits on or observes it;
            // its failure is logged only.
            let backend = Arc::clone(&self.backend);
            let request = request.clone();
            let runtime = Arc::clone(&runtime);
            self.wait_until.extend(async move {
                match backend.fetch(&request).await {
                    Ok(response) if response.is_success() => {
                        runtime.put(&request, response).await;
                        metrics::counter!(telemetry::REVALIDATIONS_TOTAL, "status" => "ok")
                            .increment(1);
                    }
                    Ok(response) => {
                        debug!(url = %request.url, status = response.status,
                            "revalidation returned non-success, keeping stale entry");
                        metrics::counter!(telemetry::REVALIDATIONS_TOTAL, "status" => "error")
                            .increment(1);
                    }
                    Err(e) => {
                        debug!(url = %request.url, error = %e, "revalidation failed");
                        metrics::counter!(telemetry::REVALIDATIONS_TOTAL, "status" => "error")
                            .increment(1);
                    }
                }
            });
            return Ok(FetchOutcome::cached(cached));
        }

        let response = self.backend.fetch(request).await?;
        if response.is_success() {
            let stored = response.clone();
            let request = request.clone();
            self.wait_until.extend(async move {
                runtime.put(&request, stored).await;
            });
        }
        Ok(FetchOutcome::network(response))
    }

    // ========================================================================
    // Shared helpers
    // ========================================================================

    /// The precached offline page, if an installed version holds one.
    async fn offline_fallback(&self) -> Option<FetchOutcome> {
        let precache = self.storage.find(&self.precache_name)?;
        let response = precache.get_key(&self.offline_key).await?;
        Some(FetchOutcome {
            response,
            served_from: ServedFrom::OfflineFallback,
        })
    }

    /// Record fetch outcome metrics (counter + duration histogram).
    fn record_fetch(class: RoutingClass, result: &Result<FetchOutcome>, start: Instant) {
        let (served, status) = match result {
            Ok(outcome) => (outcome.served_from.as_str(), "ok"),
            Err(_) => ("none", "error"),
        };
        metrics::counter!(telemetry::FETCH_TOTAL,
            "class" => class.as_str(),
            "served" => served,
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::FETCH_DURATION_SECONDS, "class" => class.as_str())
            .record(start.elapsed().as_secs_f64());
    }
}

// ============================================================================
// Tests
// ============================================================================
