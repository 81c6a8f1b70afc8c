//! Tests for telemetry emission.
//!
//! Without a `metrics` recorder installed every metric call is a no-op;
//! with a local debugging recorder the cache and fetch counters are
//! observable.

use std::sync::Arc;

use async_trait::async_trait;
use mimir::{
    CacheStorage, FetchDecision, Mimir, NetworkBackend, RUNTIME_PARTITION, RequestRecord,
    ResponseRecord, Result,
};

struct StaticBackend;

#[async_trait]
impl NetworkBackend for StaticBackend {
    fn name(&self) -> &str {
        "static-mock"
    }

    async fn fetch(&self, _request: &RequestRecord) -> Result<ResponseRecord> {
        Ok(ResponseRecord::ok("body"))
    }
}

#[tokio::test]
async fn metrics_emitted_without_recorder_do_not_panic() {
    let worker = Mimir::builder()
        .scope("http://localhost")
        .backend(Arc::new(StaticBackend))
        .build()
        .unwrap();

    let request = RequestRecord::parse("http://localhost/static/app.css").unwrap();
    worker.handle_fetch(request.clone()).await.unwrap();
    worker.handle_fetch(request).await.unwrap();
    worker.settle().await;
}

/// Runs cache operations within a local recorder scope.
///
/// Uses `block_in_place` + `block_on` to keep `with_local_recorder` on the
/// same thread (it's a thread-local recorder).
#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn cache_hit_and_miss_counters_are_recorded() {
    use metrics_util::MetricKind;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};

    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let storage = CacheStorage::new();
                let partition = storage.open(RUNTIME_PARTITION);
                let request = RequestRecord::parse("http://localhost/page").unwrap();

                // Miss
                partition.get(&request).await;

                // Insert + hit
                partition.put(&request, ResponseRecord::ok("body")).await;
                partition.get(&request).await;
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();

    let counter_total = |name: &str| -> u64 {
        snapshot
            .iter()
            .filter(|(key, _, _, _)| {
                key.kind() == MetricKind::Counter && key.key().name() == name
            })
            .map(|(_, _, _, val)| match val {
                DebugValue::Counter(c) => *c,
                _ => 0,
            })
            .sum()
    };

    assert_eq!(counter_total("mimir_cache_misses_total"), 1);
    assert_eq!(counter_total("mimir_cache_hits_total"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn fetch_counter_labels_class_and_source() {
    use metrics_util::MetricKind;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};

    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let worker = Mimir::builder()
                    .scope("http://localhost")
                    .backend(Arc::new(StaticBackend))
                    .build()
                    .unwrap();

                let request =
                    RequestRecord::parse("http://localhost/static/app.css").unwrap();
                let decision = worker.handle_fetch(request).await.unwrap();
                assert!(matches!(decision, FetchDecision::Handled(_)));
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();
    let fetch_count: u64 = snapshot
        .iter()
        .filter(|(key, _, _, _)| {
            key.kind() == MetricKind::Counter
                && key.key().name() == "mimir_fetch_total"
                && key
                    .key()
                    .labels()
                    .any(|l| l.key() == "class" && l.value() == "generic")
                && key
                    .key()
                    .labels()
                    .any(|l| l.key() == "status" && l.value() == "ok")
        })
        .map(|(_, _, _, val)| match val {
            DebugValue::Counter(c) => *c,
            _ => 0,
        })
        .sum();

    assert_eq!(fetch_count, 1);
}
