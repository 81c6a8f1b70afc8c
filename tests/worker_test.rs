//! End-to-end tests over a live HTTP server (wiremock) with the default
//! reqwest backend.

use std::sync::Arc;

use bytes::Bytes;
use mimir::cache::precache_partition;
use mimir::{
    CacheStorage, Destination, FetchDecision, Mimir, RUNTIME_PARTITION, RequestRecord, ServedFrom,
    Worker, WorkerState,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn precache_server() -> MockServer {
    let server = MockServer::start().await;
    for (p, body) in [
        ("/", "<html>root</html>"),
        ("/offline.html", "<html>offline</html>"),
        ("/manifest.json", "{\"name\": \"app\"}"),
        ("/logo192.png", "logo-192"),
        ("/logo512.png", "logo-512"),
    ] {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
    }
    server
}

fn worker_for(server: &MockServer, storage: Arc<CacheStorage>) -> Worker {
    Mimir::builder()
        .version("v1")
        .scope(server.uri())
        .storage(storage)
        .build()
        .unwrap()
}

fn handled(decision: FetchDecision) -> mimir::FetchOutcome {
    match decision {
        FetchDecision::Handled(outcome) => outcome,
        FetchDecision::Passthrough => panic!("expected a handled fetch"),
    }
}

// =========================================================================
// Install over HTTP
// =========================================================================

#[tokio::test]
async fn install_precaches_the_default_manifest() {
    let server = precache_server().await;
    let storage = Arc::new(CacheStorage::new());
    let worker = worker_for(&server, Arc::clone(&storage));

    worker.handle_install().await.unwrap();
    assert_eq!(worker.state(), WorkerState::Waiting);

    let precache = storage.find(&precache_partition("v1")).unwrap();
    precache.sync().await;
    assert_eq!(precache.entry_count(), 5);
}

#[tokio::test]
async fn install_fails_when_a_manifest_entry_404s() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("root"))
        .mount(&server)
        .await;
    // "/offline.html" and the rest are unmounted and 404

    let storage = Arc::new(CacheStorage::new());
    let worker = worker_for(&server, Arc::clone(&storage));

    assert!(worker.handle_install().await.is_err());
    assert!(!storage.contains(&precache_partition("v1")));
}

// =========================================================================
// Fetch over HTTP
// =========================================================================

#[tokio::test]
async fn navigation_round_trip_and_offline_fallback() {
    let server = precache_server().await;
    Mock::given(method("GET"))
        .and(path("/members"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>members</html>"))
        .mount(&server)
        .await;

    let storage = Arc::new(CacheStorage::new());
    let worker = worker_for(&server, Arc::clone(&storage));
    worker.handle_install().await.unwrap();
    worker.handle_activate().await;

    let scope = worker.scope().clone();
    let request = RequestRecord::navigation(scope.join("/members").unwrap());
    let outcome = handled(worker.handle_fetch(request.clone()).await.unwrap());
    assert_eq!(outcome.served_from, ServedFrom::Network);
    worker.settle().await;

    // Take the origin away: the cached page is served, not the offline one
    drop(server);
    let outcome = handled(worker.handle_fetch(request).await.unwrap());
    assert_eq!(outcome.served_from, ServedFrom::Cache);
    assert_eq!(outcome.response.body, Bytes::from("<html>members</html>"));

    // An uncached navigation now gets the offline page
    let request = RequestRecord::navigation(scope.join("/visits").unwrap());
    let outcome = handled(worker.handle_fetch(request).await.unwrap());
    assert_eq!(outcome.served_from, ServedFrom::OfflineFallback);
    assert_eq!(outcome.response.body, Bytes::from("<html>offline</html>"));
}

#[tokio::test]
async fn image_is_fetched_from_the_network_exactly_once() {
    let server = precache_server().await;
    Mock::given(method("GET"))
        .and(path("/avatars/ada.png"))
        .respond_with(ResponseTemplate::new(200).set_body_string("png-bytes"))
        .expect(1)
        .mount(&server)
        .await;

    let storage = Arc::new(CacheStorage::new());
    let worker = worker_for(&server, storage);

    let request = RequestRecord::parse(&format!("{}/avatars/ada.png", server.uri()))
        .unwrap()
        .destination(Destination::Image);

    let first = handled(worker.handle_fetch(request.clone()).await.unwrap());
    assert_eq!(first.served_from, ServedFrom::Network);
    worker.settle().await;

    let second = handled(worker.handle_fetch(request).await.unwrap());
    assert_eq!(second.served_from, ServedFrom::Cache);
    assert_eq!(second.response.body, Bytes::from("png-bytes"));

    // MockServer verifies the expect(1) on drop
}

#[tokio::test]
async fn generic_subresource_refreshes_behind_the_cached_response() {
    let server = precache_server().await;
    Mock::given(method("GET"))
        .and(path("/static/app.css"))
        .respond_with(ResponseTemplate::new(200).set_body_string("v1-css"))
        .mount(&server)
        .await;

    let storage = Arc::new(CacheStorage::new());
    let worker = worker_for(&server, Arc::clone(&storage));

    let request = RequestRecord::parse(&format!("{}/static/app.css", server.uri())).unwrap();
    handled(worker.handle_fetch(request.clone()).await.unwrap());
    worker.settle().await;

    // New deploy changes the asset
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/static/app.css"))
        .respond_with(ResponseTemplate::new(200).set_body_string("v2-css"))
        .mount(&server)
        .await;

    let outcome = handled(worker.handle_fetch(request.clone()).await.unwrap());
    assert_eq!(outcome.response.body, Bytes::from("v1-css"));

    worker.settle().await;
    let cached = storage.open(RUNTIME_PARTITION).get(&request).await.unwrap();
    assert_eq!(cached.body, Bytes::from("v2-css"));
}

#[tokio::test]
async fn api_error_status_is_returned_verbatim() {
    let server = precache_server().await;
    Mock::given(method("GET"))
        .and(path("/api/members"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let storage = Arc::new(CacheStorage::new());
    let worker = worker_for(&server, storage);

    // A 503 is a successful fetch at the transport level; it is passed
    // through untouched rather than masked by a fallback
    let request = RequestRecord::parse(&format!("{}/api/members", server.uri())).unwrap();
    let outcome = handled(worker.handle_fetch(request).await.unwrap());
    assert_eq!(outcome.served_from, ServedFrom::Network);
    assert_eq!(outcome.response.status, 503);
}
