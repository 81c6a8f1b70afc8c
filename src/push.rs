//! Push notification handling.
//!
//! An incoming push message carries a JSON [`PushPayload`]; the handler
//! turns it into a [`Notification`] with the configured icon and badge, a
//! receipt timestamp and the payload's correlation key as opaque data,
//! and hands it to the host to display.
//!
//! A payload that fails to parse is not dropped silently and does not
//! fail the event: the user gets a generic fallback notification and the
//! malformed message is logged and counted.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, warn};

use crate::host::ClientHost;
use crate::telemetry;
use crate::types::{Notification, NotificationData, PushPayload};

/// Title/body shown when a push payload cannot be parsed.
const FALLBACK_TITLE: &str = "New notification";
const FALLBACK_BODY: &str = "You have a new notification.";

/// Builds and displays notifications for incoming push messages.
pub(crate) struct PushHandler {
    icon: String,
    badge: String,
    root_url: String,
    host: Arc<dyn ClientHost>,
}

impl PushHandler {
    pub(crate) fn new(
        icon: String,
        badge: String,
        root_url: String,
        host: Arc<dyn ClientHost>,
    ) -> Self {
        Self {
            icon,
            badge,
            root_url,
            host,
        }
    }

    /// Handle an incoming push message.
    pub(crate) async fn handle_push(&self, payload: &[u8]) {
        let notification = match serde_json::from_slice::<PushPayload>(payload) {
            Ok(payload) => {
                metrics::counter!(telemetry::PUSHES_TOTAL, "status" => "ok").increment(1);
                self.notification(payload.title, payload.body, payload.primary_key)
            }
            Err(e) => {
                warn!(error = %e, "malformed push payload, showing fallback notification");
                metrics::counter!(telemetry::PUSHES_TOTAL, "status" => "malformed").increment(1);
                self.notification(FALLBACK_TITLE.to_string(), FALLBACK_BODY.to_string(), None)
            }
        };
        self.host.show_notification(notification).await;
    }

    /// Handle the user activating a displayed notification.
    ///
    /// Consuming the notification closes it; the host then brings a
    /// client window to the application root, opening one if none exists.
    pub(crate) async fn handle_click(&self, notification: Notification) {
        info!(title = %notification.title, "notification activated");
        drop(notification);
        self.host.focus_or_open(&self.root_url).await;
    }

    fn notification(
        &self,
        title: String,
        body: String,
        primary_key: Option<serde_json::Value>,
    ) -> Notification {
        Notification {
            title,
            body,
            icon: self.icon.clone(),
            badge: self.badge.clone(),
            data: NotificationData {
                received_at_ms: now_ms(),
                primary_key,
            },
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
