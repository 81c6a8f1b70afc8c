//! A single named cache partition.

use moka::future::Cache;

use crate::telemetry;
use crate::types::{RequestRecord, ResponseRecord};

/// Default maximum number of entries per partition.
const DEFAULT_PARTITION_CAPACITY: u64 = 10_000;

/// A named, durable key-value store of captured responses.
///
/// Keys are normalized request descriptors ([`RequestRecord::cache_key`]);
/// values are complete [`ResponseRecord`]s. A partition is only ever read
/// and written by the strategy that owns its routing class, and partitions
/// are never merged.
///
/// Concurrent writers to the same key are last-write-wins with no
/// coordination. Two in-flight fetches for the same image may both store
/// their response; whichever lands second stays. This is accepted policy,
/// not a defect.
pub struct CachePartition {
    name: String,
    entries: Cache<String, ResponseRecord>,
}

impl CachePartition {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Cache::new(DEFAULT_PARTITION_CAPACITY),
        }
    }

    /// Partition name, as listed by the registry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up the captured response for a request.
    ///
    /// Returns `None` on miss. Emits cache hit/miss metrics labelled with
    /// the partition name.
    pub async fn get(&self, request: &RequestRecord) -> Option<ResponseRecord> {
        self.get_key(&request.cache_key()).await
    }

    /// Look up by an already-normalized key.
    pub async fn get_key(&self, key: &str) -> Option<ResponseRecord> {
        match self.entries.get(key).await {
            Some(record) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL, "partition" => self.name.clone())
                    .increment(1);
                Some(record)
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "partition" => self.name.clone())
                    .increment(1);
                None
            }
        }
    }

    /// Store a captured response under the request's normalized key.
    ///
    /// Takes ownership of `response`: callers keep their own copy and hand
    /// the partition an independent one, never a shared reference.
    pub async fn put(&self, request: &RequestRecord, response: ResponseRecord) {
        self.put_key(request.cache_key(), response).await;
    }

    /// Store under an already-normalized key.
    pub async fn put_key(&self, key: String, response: ResponseRecord) {
        self.entries.insert(key, response).await;
    }

    /// Number of entries currently in the partition.
    ///
    /// Moka maintains this figure lazily; [`Self::sync`] makes it exact.
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Whether the partition holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    /// Flush pending internal maintenance so `entry_count` is exact.
    pub async fn sync(&self) {
        self.entries.run_pending_tasks().await;
    }
}
