//! Out-of-band events: deferred sync, push and notification clicks.
//!
//! None of these ever fail towards the host. Errors are logged and folded
//! into the returned outcome.

use async_trait::async_trait;
use serde::Serialize;

use foliocache_core::{Error, NotificationData, NotificationOptions, ShownNotification, WindowClient};

use super::Worker;
use crate::fetch::canonicalize;
use crate::host::WorkerHost;

/// Routine run when the host signals the configured sync tag.
#[async_trait]
pub trait Reconciler: Send + Sync {
    async fn reconcile(&self, tag: &str) -> Result<(), Error>;
}

/// Default contact-form reconciliation. Submissions go straight to the
/// email relay, so there is nothing queued locally yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormSync;

#[async_trait]
impl Reconciler for FormSync {
    async fn reconcile(&self, tag: &str) -> Result<(), Error> {
        tracing::info!(tag, "syncing forms");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOutcome {
    Reconciled,
    Failed,
    /// Tag not handled by this worker.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "client", rename_all = "lowercase")]
pub enum ClickOutcome {
    /// An open page already showing the root was focused.
    Focused(WindowClient),
    /// No such page; a new one was opened at the root.
    Opened(WindowClient),
    Failed,
}

impl Worker {
    pub async fn sync(&self, tag: &str) -> SyncOutcome {
        if tag != self.config.sync_tag {
            tracing::debug!(tag, "ignoring unknown sync tag");
            return SyncOutcome::Ignored;
        }

        match self.reconciler.reconcile(tag).await {
            Ok(()) => SyncOutcome::Reconciled,
            Err(e) => {
                tracing::warn!(tag, error = %e, "sync failed");
                SyncOutcome::Failed
            }
        }
    }

    /// Options for a push notification; an absent or empty payload gets the default body.
    pub fn notification_options(&self, payload: Option<&str>) -> NotificationOptions {
        let n = &self.config.notification;
        let body = payload.filter(|p| !p.is_empty()).unwrap_or(&n.default_body);
        NotificationOptions {
            body: body.to_string(),
            icon: n.icon.clone(),
            badge: n.badge.clone(),
            vibrate: n.vibrate.clone(),
            data: NotificationData { date_of_arrival: chrono::Utc::now().timestamp_millis(), primary_key: 1 },
        }
    }

    pub async fn push(&self, payload: Option<&str>) -> Option<ShownNotification> {
        let options = self.notification_options(payload);
        match self.host.show_notification(&self.config.notification.title, options).await {
            Ok(shown) => {
                tracing::debug!(id = %shown.id, "notification shown");
                Some(shown)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to show notification");
                None
            }
        }
    }

    /// Close the notification, then focus a page showing the root or open one.
    ///
    /// Single attempt: a failed focus is not followed by opening a window.
    pub async fn notification_click(&self, notification_id: &str) -> ClickOutcome {
        if let Err(e) = self.host.close_notification(notification_id).await {
            tracing::warn!(id = notification_id, error = %e, "failed to close notification");
        }

        let root = self.config.root_url();
        let clients = match self.host.window_clients().await {
            Ok(clients) => clients,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list window clients");
                return ClickOutcome::Failed;
            }
        };

        let showing_root = clients
            .iter()
            .find(|c| canonicalize(&c.url, &self.config.origin).is_ok_and(|u| u == root));

        if let Some(client) = showing_root {
            return match self.host.focus(&client.id).await {
                Ok(focused) => ClickOutcome::Focused(focused),
                Err(e) => {
                    tracing::warn!(client = %client.id, error = %e, "failed to focus client");
                    ClickOutcome::Failed
                }
            };
        }

        match self.host.open_window(root.as_str()).await {
            Ok(opened) => ClickOutcome::Opened(opened),
            Err(e) => {
                tracing::warn!(error = %e, "failed to open window");
                ClickOutcome::Failed
            }
        }
    }
}
