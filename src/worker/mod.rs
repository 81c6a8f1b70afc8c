//! Worker — the process-wide event dispatcher.
//!
//! One [`Worker`] is constructed per process and handed every host event:
//! lifecycle (install, activate), per-request interception (fetch), the
//! skip-waiting control message, deferred sync, and push. It holds no
//! long-lived state beyond what [`CacheStorage`] persists and the current
//! lifecycle state; every decision is made fresh per event from
//! `(event, registry)`.

mod builder;

pub use builder::{Mimir, WorkerBuilder};

use std::sync::{Arc, RwLock};

use futures_util::future::join_all;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::cache::{CacheStorage, IMAGE_PARTITION, RUNTIME_PARTITION, precache_partition};
use crate::config::WorkerConfig;
use crate::host::{ClientHost, WaitUntil};
use crate::net::NetworkBackend;
use crate::push::PushHandler;
use crate::routing::Classifier;
use crate::strategy::{FetchOutcome, StrategyEngine};
use crate::sync::SyncHook;
use crate::telemetry;
use crate::types::{Notification, RequestRecord, ResponseRecord};
use crate::{MimirError, Result};

/// Lifecycle state of the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// No install attempt has succeeded.
    Uninstalled,
    /// The precache manifest is being populated.
    Installing,
    /// Installed and ready to supersede any live worker.
    Waiting,
    /// Controlling pages; terminal until a new version repeats the cycle.
    Active,
}

/// Control messages a page can post to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    /// Activate immediately instead of waiting for open pages to close.
    SkipWaiting,
}

/// What the worker decided to do with an intercepted request.
#[derive(Debug)]
pub enum FetchDecision {
    /// Non-fetchable scheme; the host handles the request natively.
    Passthrough,
    /// A strategy produced a response.
    Handled(FetchOutcome),
}

/// The offline caching and synchronization worker.
///
/// Construct via [`Mimir::builder()`]:
///
/// ```rust,no_run
/// use mimir::{Mimir, RequestRecord};
///
/// # async fn run() -> mimir::Result<()> {
/// let worker = Mimir::builder()
///     .version("v2")
///     .scope("https://app.example.org")
///     .build()?;
///
/// worker.handle_install().await?;
/// worker.handle_activate().await;
///
/// let request = RequestRecord::parse("https://app.example.org/members")?;
/// let decision = worker.handle_fetch(request).await?;
/// # let _ = decision;
/// # Ok(())
/// # }
/// ```
pub struct Worker {
    config: WorkerConfig,
    scope: Url,
    classifier: Classifier,
    storage: Arc<CacheStorage>,
    backend: Arc<dyn NetworkBackend>,
    host: Arc<dyn ClientHost>,
    engine: StrategyEngine,
    sync: SyncHook,
    push: PushHandler,
    wait_until: Arc<WaitUntil>,
    state: RwLock<WorkerState>,
}

impl Worker {
    pub(crate) fn new(
        config: WorkerConfig,
        scope: Url,
        storage: Arc<CacheStorage>,
        backend: Arc<dyn NetworkBackend>,
        host: Arc<dyn ClientHost>,
    ) -> Result<Self> {
        let classifier = Classifier::new(&config);
        let wait_until = Arc::new(WaitUntil::new());
        let offline_key = RequestRecord::get(scope.join(&config.offline_page)?).cache_key();
        let engine = StrategyEngine::new(
            Arc::clone(&storage),
            Arc::clone(&backend),
            Arc::clone(&wait_until),
            precache_partition(&config.version),
            offline_key,
        );
        let sync = SyncHook::new(config.sync_tag.clone());
        let push = PushHandler::new(
            config.notification_icon.clone(),
            config.notification_badge.clone(),
            scope.to_string(),
            Arc::clone(&host),
        );
        Ok(Self {
            config,
            scope,
            classifier,
            storage,
            backend,
            host,
            engine,
            sync,
            push,
            wait_until,
            state: RwLock::new(WorkerState::Uninstalled),
        })
    }

    // ========================================================================
    // Lifecycle events
    // ========================================================================

    /// Handle the install event: populate the precache partition with the
    /// full manifest, all-or-nothing.
    ///
    /// Any entry that fails to fetch (transport failure or non-success
    /// status) aborts the install, discards the partial partition, and
    /// leaves the previous worker generation (if any) untouched.
    #[instrument(skip(self), fields(version = %self.config.version))]
    pub async fn handle_install(&self) -> Result<()> {
        let prior = self.state();
        self.set_state(WorkerState::Installing);

        match self.precache().await {
            Ok(count) => {
                info!(count, partition = %self.precache_name(), "precache populated");
                metrics::counter!(telemetry::INSTALLS_TOTAL, "status" => "ok").increment(1);
                // Skip-waiting semantics: immediately eligible to
                // supersede a live worker
                self.set_state(WorkerState::Waiting);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "install aborted, discarding precache partition");
                metrics::counter!(telemetry::INSTALLS_TOTAL, "status" => "error").increment(1);
                self.storage.delete(&self.precache_name());
                self.set_state(prior);
                Err(e)
            }
        }
    }

    /// Handle the activate event: evict every cache partition outside the
    /// current whitelist, then claim all open pages.
    ///
    /// The whitelist is the current precache name plus the runtime and
    /// image partitions. Eviction completes before pages are claimed.
    /// Running activate twice with the same version is idempotent.
    #[instrument(skip(self), fields(version = %self.config.version))]
    pub async fn handle_activate(&self) {
        let whitelist = [
            self.precache_name(),
            RUNTIME_PARTITION.to_string(),
            IMAGE_PARTITION.to_string(),
        ];
        for name in self.storage.names() {
            if !whitelist.contains(&name) {
                info!(partition = %name, "evicting stale cache partition");
                self.storage.delete(&name);
            }
        }
        self.host.claim().await;
        self.set_state(WorkerState::Active);
    }

    /// Handle a control message posted by a page.
    pub async fn handle_message(&self, message: ControlMessage) {
        match message {
            ControlMessage::SkipWaiting => {
                info!("skip-waiting requested, activating");
                self.handle_activate().await;
            }
        }
    }

    // ========================================================================
    // Fetch interception
    // ========================================================================

    /// Handle an intercepted request.
    ///
    /// Non-http(s) schemes pass through to the host untouched (fail-open
    /// for non-fetchable schemes). Everything else is classified and run
    /// through the strategy owning its routing class.
    pub async fn handle_fetch(&self, request: RequestRecord) -> Result<FetchDecision> {
        if !request.is_http() {
            debug!(url = %request.url, "non-fetchable scheme, passing through");
            return Ok(FetchDecision::Passthrough);
        }
        let class = self.classifier.classify(&request);
        let outcome = self.engine.handle(class, &request).await?;
        Ok(FetchDecision::Handled(outcome))
    }

    // ========================================================================
    // Sync and push events
    // ========================================================================

    /// Handle a deferred-sync event. Returns whether the tag matched the
    /// registered one.
    pub fn handle_sync(&self, tag: &str) -> bool {
        self.sync.handle(tag, &self.wait_until)
    }

    /// Handle an incoming push message payload.
    pub async fn handle_push(&self, payload: &[u8]) {
        self.push.handle_push(payload).await;
    }

    /// Handle the user activating a displayed notification: close it and
    /// bring a client window to the application root.
    pub async fn handle_notification_click(&self, notification: Notification) {
        self.push.handle_click(notification).await;
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        *self.state.read().unwrap()
    }

    /// Names of all existing cache partitions, sorted.
    pub fn partition_names(&self) -> Vec<String> {
        self.storage.names()
    }

    /// The cache partition registry.
    pub fn storage(&self) -> &Arc<CacheStorage> {
        &self.storage
    }

    /// The scope origin this worker serves.
    pub fn scope(&self) -> &Url {
        &self.scope
    }

    /// Wait for all detached work (background fills, revalidations, sync
    /// reconciliation) to finish. Hosts call this before tearing the
    /// worker down; tests use it to observe eventually-consistent writes.
    pub async fn settle(&self) {
        self.wait_until.settle().await;
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn precache_name(&self) -> String {
        precache_partition(&self.config.version)
    }

    fn set_state(&self, state: WorkerState) {
        *self.state.write().unwrap() = state;
    }

    /// Fetch and store the full precache manifest, all-or-nothing.
    async fn precache(&self) -> Result<usize> {
        let partition = self.storage.open(&self.precache_name());

        let mut requests = Vec::with_capacity(self.config.precache_manifest.len());
        for path in &self.config.precache_manifest {
            let url = self.scope.join(path)?;
            requests.push((path.as_str(), RequestRecord::get(url)));
        }

        let results = join_all(
            requests
                .iter()
                .map(|(_, request)| self.backend.fetch(request)),
        )
        .await;

        // Validate the whole manifest before writing anything
        let mut captured: Vec<(&RequestRecord, ResponseRecord)> =
            Vec::with_capacity(requests.len());
        for ((path, request), result) in requests.iter().zip(results) {
            let response = result.map_err(|e| MimirError::InstallFailed {
                resource: (*path).to_string(),
                source: Box::new(e),
            })?;
            if !response.is_success() {
                return Err(MimirError::InstallFailed {
                    resource: (*path).to_string(),
                    source: Box::new(MimirError::UnexpectedStatus {
                        status: response.status,
                        url: request.url.to_string(),
                    }),
                });
            }
            captured.push((request, response));
        }

        let count = captured.len();
        for (request, response) in captured {
            partition.put(request, response).await;
        }
        Ok(count)
    }
}
