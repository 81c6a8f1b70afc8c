//! Push message payloads and notifications

use serde::{Deserialize, Serialize};

/// Wire payload carried by an incoming push message.
///
/// The sender is outside this repository; the contract is a JSON object
/// with at least `title` and `body`, and optionally `primaryKey`, an
/// opaque correlation key echoed back in the notification data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<serde_json::Value>,
}

/// A system notification the worker asks the host to display.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub data: NotificationData,
}

/// Opaque data attached to a displayed notification.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationData {
    /// Milliseconds since the Unix epoch at which the push was handled.
    pub received_at_ms: u64,
    /// Correlation key from the payload, passed through untouched.
    pub primary_key: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_parses_camel_case_key() {
        let payload: PushPayload = serde_json::from_str(
            r#"{"title": "Visit logged", "body": "A new visit was recorded", "primaryKey": 17}"#,
        )
        .unwrap();
        assert_eq!(payload.title, "Visit logged");
        assert_eq!(payload.primary_key, Some(serde_json::json!(17)));
    }

    #[test]
    fn primary_key_is_optional() {
        let payload: PushPayload =
            serde_json::from_str(r#"{"title": "Hi", "body": "There"}"#).unwrap();
        assert_eq!(payload.primary_key, None);
    }

    #[test]
    fn missing_title_is_rejected() {
        let result: Result<PushPayload, _> = serde_json::from_str(r#"{"body": "no title"}"#);
        assert!(result.is_err());
    }
}
