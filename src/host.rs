//! Host environment seam.
//!
//! The worker is embedded in a host that owns the actual pages, windows
//! and notification surface. [`ClientHost`] is the thin trait the worker
//! calls back into; hosts implement it, tests record it, and the default
//! [`NoopHost`] keeps the worker usable standalone.
//!
//! [`WaitUntil`] is the event-extension mechanism: every piece of
//! fire-and-forget work the worker starts (background cache refreshes,
//! the deferred-sync routine) is spawned through it, so the host can keep
//! the process alive until [`WaitUntil::settle`] resolves instead of
//! tearing it down mid-flight.

use std::future::Future;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::types::Notification;

/// Calls from the worker back into its host environment.
#[async_trait]
pub trait ClientHost: Send + Sync {
    /// Route all open pages through this worker immediately, without
    /// waiting for them to reload.
    async fn claim(&self);

    /// Display a system notification.
    async fn show_notification(&self, notification: Notification);

    /// Focus an existing client window at `url`, opening one if none
    /// exists.
    async fn focus_or_open(&self, url: &str);
}

/// Host that ignores every call. Default when none is configured.
pub struct NoopHost;

#[async_trait]
impl ClientHost for NoopHost {
    async fn claim(&self) {}

    async fn show_notification(&self, _notification: Notification) {}

    async fn focus_or_open(&self, _url: &str) {}
}

/// Tracker for detached work whose lifetime the host must respect.
///
/// `extend` spawns the future and records its handle; `settle` drains
/// every recorded handle, including ones added while draining. Callers of
/// the originating event never observe the extended work; this exists
/// purely so the host knows when the worker is quiescent.
#[derive(Default)]
pub struct WaitUntil {
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl WaitUntil {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `future` as tracked detached work.
    pub fn extend<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.lock().unwrap().push(tokio::spawn(future));
    }

    /// Number of tracked tasks not yet drained.
    pub fn pending(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    /// Wait for all tracked work, including work spawned while waiting.
    pub async fn settle(&self) {
        loop {
            let handles: Vec<JoinHandle<()>> = {
                let mut tasks = self.tasks.lock().unwrap();
                tasks.drain(..).collect()
            };
            if handles.is_empty() {
                return;
            }
            for handle in handles {
                if let Err(e) = handle.await {
                    warn!(error = %e, "extended task aborted");
                }
            }
        }
    }
}
