//! Notification and window-client types shared with the host runtime.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Correlation payload attached to a push notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationData {
    /// Milliseconds since the Unix epoch.
    pub date_of_arrival: i64,
    pub primary_key: i64,
}

/// Options passed alongside a notification title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    /// Alternating vibrate/pause durations in milliseconds.
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
}

/// A notification currently shown by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ShownNotification {
    pub id: String,
    pub title: String,
    pub options: NotificationOptions,
}

/// An open page instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WindowClient {
    pub id: String,
    pub url: String,
    pub focused: bool,
    /// Whether the worker intercepts this page's requests.
    pub controlled: bool,
}
