//! Caching subsystem.
//!
//! Three named, independently-lifecycled partitions hold everything the
//! worker persists:
//!
//! - the **precache** partition (`precache-{version}`) — populated once at
//!   install time with version-critical assets, immutable until the whole
//!   partition is superseded by a new version tag;
//!
//! - the **runtime** partition ([`RUNTIME_PARTITION`]) — general captured
//!   responses, filled opportunistically by the navigation and
//!   stale-while-revalidate strategies;
//!
//! - the **image** partition ([`IMAGE_PARTITION`]) — binary-heavy image
//!   responses, filled by the cache-first strategy and never refreshed.
//!
//! [`CacheStorage`] is the registry over them: open-by-name (lazy
//! creation), enumerate, and whole-partition deletion. Nothing is evicted
//! entry-by-entry in normal operation; stale partitions are deleted
//! wholesale at activation.

mod partition;

pub use partition::CachePartition;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::telemetry;

/// Name of the mutable general-purpose partition.
pub const RUNTIME_PARTITION: &str = "runtime";

/// Name of the mutable image partition.
pub const IMAGE_PARTITION: &str = "images";

/// Versioned name of the precache partition for a given cache version tag.
pub fn precache_partition(version: &str) -> String {
    format!("precache-{version}")
}

/// Registry of named cache partitions.
///
/// Partitions are created lazily on first [`open`](Self::open) and live
/// until deleted by name. The registry itself never inspects partition
/// contents.
pub struct CacheStorage {
    partitions: RwLock<HashMap<String, Arc<CachePartition>>>,
}

impl CacheStorage {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            partitions: RwLock::new(HashMap::new()),
        }
    }

    /// Open a partition by name, creating it if it does not exist.
    pub fn open(&self, name: &str) -> Arc<CachePartition> {
        if let Some(partition) = self.partitions.read().unwrap().get(name) {
            return Arc::clone(partition);
        }
        let mut partitions = self.partitions.write().unwrap();
        Arc::clone(
            partitions
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(CachePartition::new(name))),
        )
    }

    /// Look up a partition by name without creating it.
    pub fn find(&self, name: &str) -> Option<Arc<CachePartition>> {
        self.partitions.read().unwrap().get(name).map(Arc::clone)
    }

    /// Whether a partition with this name currently exists.
    pub fn contains(&self, name: &str) -> bool {
        self.partitions.read().unwrap().contains_key(name)
    }

    /// All existing partition names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.partitions.read().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    /// Delete a partition and all its entries. Returns whether it existed.
    pub fn delete(&self, name: &str) -> bool {
        let removed = self.partitions.write().unwrap().remove(name).is_some();
        if removed {
            metrics::counter!(telemetry::PARTITIONS_EVICTED_TOTAL).increment(1);
        }
        removed
    }
}

impl Default for CacheStorage {
    fn default() -> Self {
        Self::new()
    }
}
