//! Mimir - Offline-first caching and synchronization worker
//!
//! This crate intercepts an application's HTTP traffic and decides, per
//! request, which cache partition to consult, whether to serve stale data,
//! when to refresh in the background, and how to degrade gracefully when
//! the network is unavailable. It is the offline layer for a host
//! application; the host delivers lifecycle and interception events, the
//! worker answers with [`FetchDecision`]s.
//!
//! # Example
//!
//! ```rust,no_run
//! use mimir::{FetchDecision, Mimir, RequestRecord};
//!
//! #[tokio::main]
//! async fn main() -> mimir::Result<()> {
//!     let worker = Mimir::builder()
//!         .version("v2")
//!         .scope("https://app.example.org")
//!         .api_host("firestore.googleapis.com")
//!         .build()?;
//!
//!     // Lifecycle: seed the precache, then take over open pages
//!     worker.handle_install().await?;
//!     worker.handle_activate().await;
//!
//!     // Per-request interception
//!     let request = RequestRecord::parse("https://app.example.org/members")?;
//!     match worker.handle_fetch(request).await? {
//!         FetchDecision::Handled(outcome) => println!("{}", outcome.response.status),
//!         FetchDecision::Passthrough => println!("host handles this one"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Strategies
//!
//! Every intercepted request is assigned one [`RoutingClass`] and served
//! by the strategy owning that class: network-only for backend API calls,
//! cache-first for images, network-first for navigations, and
//! stale-while-revalidate for everything else. See the [`strategy`]
//! module docs for the full policy, including offline fallback order.

pub mod cache;
pub mod config;
pub mod error;
pub mod host;
pub mod net;
pub mod routing;
pub mod strategy;
pub mod types;
pub mod worker;

mod push;
mod sync;
pub mod telemetry;

// Re-export main types at crate root
pub use cache::{CachePartition, CacheStorage, IMAGE_PARTITION, RUNTIME_PARTITION};
pub use config::WorkerConfig;
pub use error::{MimirError, Result};
pub use host::{ClientHost, NoopHost, WaitUntil};
pub use net::{HttpBackend, NetworkBackend};
pub use routing::{Classifier, RoutingClass};
pub use strategy::{FetchOutcome, ServedFrom};
pub use worker::{ControlMessage, FetchDecision, Mimir, Worker, WorkerBuilder, WorkerState};

// Re-export all types
pub use types::{
    Destination, Method, Notification, NotificationData, PushPayload, RequestMode, RequestRecord,
    ResponseRecord,
};
