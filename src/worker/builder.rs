//! Builder for configuring worker instances

use std::sync::Arc;

use url::Url;

use super::Worker;
use crate::cache::CacheStorage;
use crate::config::WorkerConfig;
use crate::host::{ClientHost, NoopHost};
use crate::net::{HttpBackend, NetworkBackend};
use crate::{MimirError, Result};

/// Main entry point for creating worker instances.
pub struct Mimir;

impl Mimir {
    /// Create a new builder for configuring the worker.
    pub fn builder() -> WorkerBuilder {
        WorkerBuilder::new()
    }
}

/// Builder for configuring worker instances.
pub struct WorkerBuilder {
    config: WorkerConfig,
    storage: Option<Arc<CacheStorage>>,
    backend: Option<Arc<dyn NetworkBackend>>,
    host: Option<Arc<dyn ClientHost>>,
}

impl WorkerBuilder {
    pub fn new() -> Self {
        Self {
            config: WorkerConfig::default(),
            storage: None,
            backend: None,
            host: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: WorkerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the cache version tag.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    /// Set the scope origin the worker serves.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.config.scope = scope.into();
        self
    }

    /// Replace the precache manifest.
    pub fn precache_manifest<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.precache_manifest = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Set the offline fallback page path.
    pub fn offline_page(mut self, path: impl Into<String>) -> Self {
        self.config.offline_page = path.into();
        self
    }

    /// Set the same-origin API path prefix.
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.api_prefix = prefix.into();
        self
    }

    /// Add a backend-service host substring.
    pub fn api_host(mut self, host: impl Into<String>) -> Self {
        self.config.api_hosts.push(host.into());
        self
    }

    /// Set the deferred-sync tag.
    pub fn sync_tag(mut self, tag: impl Into<String>) -> Self {
        self.config.sync_tag = tag.into();
        self
    }

    /// Share an existing cache partition registry.
    ///
    /// A new worker generation opened over the previous generation's
    /// storage is what makes activation's stale-partition eviction
    /// meaningful.
    pub fn storage(mut self, storage: Arc<CacheStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Substitute the network backend (default: reqwest-backed).
    pub fn backend(mut self, backend: Arc<dyn NetworkBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Substitute the client host (default: no-op).
    pub fn host(mut self, host: Arc<dyn ClientHost>) -> Self {
        self.host = Some(host);
        self
    }

    /// Build the worker.
    pub fn build(self) -> Result<Worker> {
        let scope = Url::parse(&self.config.scope)?;

        if self.config.precache_manifest.is_empty() {
            return Err(MimirError::Configuration(
                "precache manifest must not be empty".to_string(),
            ));
        }
        if !self
            .config
            .precache_manifest
            .contains(&self.config.offline_page)
        {
            return Err(MimirError::Configuration(format!(
                "offline page '{}' must be part of the precache manifest",
                self.config.offline_page
            )));
        }

        let storage = self.storage.unwrap_or_default();
        let backend = match self.backend {
            Some(backend) => backend,
            None => Arc::new(HttpBackend::new()?),
        };
        let host = self.host.unwrap_or_else(|| Arc::new(NoopHost));

        Worker::new(self.config, scope, storage, backend, host)
    }
}

impl Default for WorkerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
