//! Worker configuration.
//!
//! [`WorkerConfig`] carries everything the worker needs to know about the
//! application it fronts: the cache version tag, the scope it serves, the
//! precache manifest, and the request-classification rules. The struct is
//! serde-derived so hosts can load it from a config file; programmatic
//! construction goes through [`WorkerBuilder`](crate::WorkerBuilder),
//! which starts from [`WorkerConfig::default()`].

use serde::{Deserialize, Serialize};

/// Configuration for a [`Worker`](crate::Worker) instance.
///
/// ```rust
/// # use mimir::WorkerConfig;
/// let config = WorkerConfig::new("v2")
///     .scope("https://app.example.org")
///     .api_host("firestore.googleapis.com");
/// assert_eq!(config.version, "v2");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Cache version tag embedded in the precache partition name.
    ///
    /// Bumping this is the only way to invalidate precached assets: the
    /// next activation evicts every partition carrying an older tag.
    pub version: String,
    /// Origin the worker serves; manifest paths are resolved against it.
    pub scope: String,
    /// Ordered list of paths that must precache successfully at install.
    pub precache_manifest: Vec<String>,
    /// Path of the precached document served when a navigation fails.
    pub offline_page: String,
    /// Path prefix that marks same-origin requests as backend API calls.
    pub api_prefix: String,
    /// Host substrings that mark a request as a backend-service call.
    pub api_hosts: Vec<String>,
    /// Tag the deferred-sync hook responds to.
    pub sync_tag: String,
    /// Icon path attached to displayed notifications.
    pub notification_icon: String,
    /// Badge path attached to displayed notifications.
    pub notification_badge: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            version: "v1".to_string(),
            scope: "http://localhost".to_string(),
            precache_manifest: vec![
                "/".to_string(),
                "/offline.html".to_string(),
                "/manifest.json".to_string(),
                "/logo192.png".to_string(),
                "/logo512.png".to_string(),
            ],
            offline_page: "/offline.html".to_string(),
            api_prefix: "/api".to_string(),
            api_hosts: vec!["googleapis.com".to_string(), "firebase".to_string()],
            sync_tag: "sync-outbox".to_string(),
            notification_icon: "/logo192.png".to_string(),
            notification_badge: "/logo192.png".to_string(),
        }
    }
}

impl WorkerConfig {
    /// Create a config with the given cache version tag and defaults for
    /// everything else.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// Set the scope origin.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Replace the precache manifest.
    pub fn precache_manifest<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.precache_manifest = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Set the offline fallback page path.
    pub fn offline_page(mut self, path: impl Into<String>) -> Self {
        self.offline_page = path.into();
        self
    }

    /// Set the same-origin API path prefix.
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    /// Add a backend-service host substring.
    pub fn api_host(mut self, host: impl Into<String>) -> Self {
        self.api_hosts.push(host.into());
        self
    }

    /// Set the deferred-sync tag.
    pub fn sync_tag(mut self, tag: impl Into<String>) -> Self {
        self.sync_tag = tag.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_install_critical_assets() {
        let config = WorkerConfig::default();
        assert_eq!(config.version, "v1");
        assert!(config.precache_manifest.contains(&"/".to_string()));
        assert!(
            config
                .precache_manifest
                .contains(&config.offline_page.to_string())
        );
        assert!(config.precache_manifest.len() >= 5);
    }

    #[test]
    fn builder_style_overrides() {
        let config = WorkerConfig::new("v3")
            .scope("https://app.example.org")
            .api_prefix("/backend")
            .api_host("example-baas.dev")
            .sync_tag("sync-forms");
        assert_eq!(config.version, "v3");
        assert_eq!(config.api_prefix, "/backend");
        assert!(config.api_hosts.contains(&"example-baas.dev".to_string()));
        assert_eq!(config.sync_tag, "sync-forms");
    }

    #[test]
    fn partial_config_deserializes_with_defaults() {
        let config: WorkerConfig =
            serde_json::from_str(r#"{"version": "v9", "api_prefix": "/v2/api"}"#).unwrap();
        assert_eq!(config.version, "v9");
        assert_eq!(config.api_prefix, "/v2/api");
        // Unspecified fields fall back to defaults
        assert_eq!(config.offline_page, "/offline.html");
    }
}
