//! Request classification.
//!
//! Every intercepted request is assigned exactly one [`RoutingClass`],
//! which decides the fetch strategy that handles it. Classification is a
//! pure function of the request (URL host and path plus the declared
//! destination and mode) and is never persisted.
//!
//! Predicates are evaluated in a fixed priority order; a request matching
//! several resolves to the first match:
//!
//! ```text
//! external-api > image > navigation > generic
//! ```

use crate::config::WorkerConfig;
use crate::types::{Destination, RequestRecord};

/// The routing class assigned to an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingClass {
    /// Backend-service or same-origin API call; never cached.
    ExternalApi,
    /// Image subresource; cache-first against the image partition.
    Image,
    /// Top-level document load; network-first against the runtime partition.
    Navigation,
    /// Everything else; stale-while-revalidate against the runtime partition.
    Generic,
}

impl RoutingClass {
    /// Stable label for logging and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingClass::ExternalApi => "external-api",
            RoutingClass::Image => "image",
            RoutingClass::Navigation => "navigation",
            RoutingClass::Generic => "generic",
        }
    }
}

impl std::fmt::Display for RoutingClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assigns a [`RoutingClass`] to each intercepted request.
///
/// The classifier is a lookup over configured host substrings and the API
/// path prefix; it holds no mutable state and the same request always
/// classifies the same way.
#[derive(Debug, Clone)]
pub struct Classifier {
    api_hosts: Vec<String>,
    api_prefix: String,
}

impl Classifier {
    /// Build a classifier from worker configuration.
    pub fn new(config: &WorkerConfig) -> Self {
        Self {
            api_hosts: config.api_hosts.clone(),
            api_prefix: config.api_prefix.clone(),
        }
    }

    /// Classify a request. Total over http(s) requests; callers exclude
    /// non-fetchable schemes before classification.
    pub fn classify(&self, request: &RequestRecord) -> RoutingClass {
        if self.is_external_api(request) {
            RoutingClass::ExternalApi
        } else if request.destination == Destination::Image {
            RoutingClass::Image
        } else if request.is_navigation() {
            RoutingClass::Navigation
        } else {
            RoutingClass::Generic
        }
    }

    fn is_external_api(&self, request: &RequestRecord) -> bool {
        if let Some(host) = request.url.host_str() {
            if self.api_hosts.iter().any(|h| host.contains(h.as_str())) {
                return true;
            }
        }
        !self.api_prefix.is_empty() && request.url.path().starts_with(&self.api_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Destination, RequestMode, RequestRecord};

    fn classifier() -> Classifier {
        Classifier::new(&WorkerConfig::default())
    }

    #[test]
    fn backend_host_is_external_api() {
        let request =
            RequestRecord::parse("https://firestore.googleapis.com/v1/projects/x/documents")
                .unwrap();
        assert_eq!(classifier().classify(&request), RoutingClass::ExternalApi);
    }

    #[test]
    fn api_prefix_is_external_api() {
        let request = RequestRecord::parse("https://app.example.org/api/members").unwrap();
        assert_eq!(classifier().classify(&request), RoutingClass::ExternalApi);
    }

    #[test]
    fn image_destination_classifies_image() {
        let request = RequestRecord::parse("https://app.example.org/photos/member17.jpg")
            .unwrap()
            .destination(Destination::Image);
        assert_eq!(classifier().classify(&request), RoutingClass::Image);
    }

    #[test]
    fn navigate_mode_classifies_navigation() {
        let request = RequestRecord::parse("https://app.example.org/members")
            .unwrap()
            .mode(RequestMode::Navigate);
        assert_eq!(classifier().classify(&request), RoutingClass::Navigation);
    }

    #[test]
    fn everything_else_is_generic() {
        let request = RequestRecord::parse("https://app.example.org/static/app.js").unwrap();
        assert_eq!(classifier().classify(&request), RoutingClass::Generic);
    }

    #[test]
    fn external_api_wins_over_image() {
        // An image served from a backend host still routes as external-api
        let request = RequestRecord::parse("https://storage.googleapis.com/bucket/pic.png")
            .unwrap()
            .destination(Destination::Image);
        assert_eq!(classifier().classify(&request), RoutingClass::ExternalApi);
    }

    #[test]
    fn external_api_wins_over_navigation() {
        let request = RequestRecord::parse("https://app.example.org/api/export")
            .unwrap()
            .mode(RequestMode::Navigate);
        assert_eq!(classifier().classify(&request), RoutingClass::ExternalApi);
    }

    #[test]
    fn image_wins_over_navigation() {
        // Contrived, but the priority order is fixed
        let request = RequestRecord::parse("https://app.example.org/logo.png")
            .unwrap()
            .destination(Destination::Image)
            .mode(RequestMode::Navigate);
        assert_eq!(classifier().classify(&request), RoutingClass::Image);
    }

    #[test]
    fn empty_prefix_never_matches() {
        let config = WorkerConfig::default().api_prefix("");
        let classifier = Classifier::new(&config);
        let request = RequestRecord::parse("https://app.example.org/members").unwrap();
        assert_eq!(classifier.classify(&request), RoutingClass::Generic);
    }
}
