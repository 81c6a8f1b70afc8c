//! Background sync hook.
//!
//! The worker registers for deferred-sync events under a single tag
//! ([`WorkerConfig::sync_tag`](crate::WorkerConfig)). When the host
//! replays that tag the hook runs a placeholder reconciliation routine:
//! log-only, it intentionally synchronizes nothing. What the routine
//! guarantees is lease semantics: it runs as work tracked by
//! [`WaitUntil`](crate::host::WaitUntil), so the host keeps its retry
//! lease open until the future resolves and can replay the tag if the
//! process dies mid-flight.

use tracing::{debug, info};

use crate::host::WaitUntil;

/// Tag-keyed deferred-sync hook.
pub(crate) struct SyncHook {
    tag: String,
}

impl SyncHook {
    pub(crate) fn new(tag: String) -> Self {
        Self { tag }
    }

    /// Handle a deferred-sync event. Returns whether the tag matched and
    /// the reconciliation routine was started.
    pub(crate) fn handle(&self, tag: &str, wait_until: &WaitUntil) -> bool {
        if tag != self.tag {
            debug!(tag, registered = %self.tag, "ignoring sync event for foreign tag");
            return false;
        }
        let tag = tag.to_string();
        wait_until.extend(async move {
            reconcile(&tag).await;
        });
        true
    }
}

/// Placeholder reconciliation routine.
///
/// Trivially idempotent across host retries. A real implementation would
/// replay writes queued while offline; that contract is undefined here.
async fn reconcile(tag: &str) {
    info!(tag, "deferred sync fired, no pending data to reconcile");
}
