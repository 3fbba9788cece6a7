//! sw_sync, sw_push and sw_notification_click tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use foliocache_client::{SyncOutcome, Worker};
use foliocache_core::{Error, ShownNotification};

use super::json_result;

/// Input parameters for the sw_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwSyncParams {
    /// Sync tag registered by the page, e.g. "sync-forms".
    pub tag: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SwSyncOutput {
    pub tag: String,
    pub outcome: SyncOutcome,
}

/// Input parameters for the sw_push tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwPushParams {
    /// Push message text. Absent or empty uses the configured default body.
    #[serde(default)]
    pub payload: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SwPushOutput {
    /// The notification that was shown, or null if the host refused it.
    pub notification: Option<ShownNotification>,
}

/// Input parameters for the sw_notification_click tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwNotificationClickParams {
    /// Id of the clicked notification.
    pub notification_id: String,
}

pub async fn sync_impl(worker: &Worker, params: SwSyncParams) -> Result<CallToolResult, McpError> {
    if params.tag.is_empty() {
        return Err(Error::InvalidInput("tag must not be empty".to_string()).into());
    }
    let outcome = worker.sync(&params.tag).await;
    json_result(&SwSyncOutput { tag: params.tag, outcome })
}

pub async fn push_impl(worker: &Worker, params: SwPushParams) -> Result<CallToolResult, McpError> {
    let notification = worker.push(params.payload.as_deref()).await;
    json_result(&SwPushOutput { notification })
}

pub async fn notification_click_impl(
    worker: &Worker, params: SwNotificationClickParams,
) -> Result<CallToolResult, McpError> {
    let outcome = worker.notification_click(&params.notification_id).await;
    json_result(&outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{self, output};

    #[tokio::test]
    async fn test_sync_forms() {
        let (worker, _) = testing::worker().await;

        let out = output(&sync_impl(&worker, SwSyncParams { tag: "sync-forms".into() }).await.unwrap());
        assert_eq!(out["outcome"], "reconciled");

        let out = output(&sync_impl(&worker, SwSyncParams { tag: "other".into() }).await.unwrap());
        assert_eq!(out["outcome"], "ignored");
    }

    #[tokio::test]
    async fn test_sync_empty_tag() {
        let (worker, _) = testing::worker().await;
        assert!(sync_impl(&worker, SwSyncParams { tag: String::new() }).await.is_err());
    }

    #[tokio::test]
    async fn test_push_then_click_opens_root() {
        let (worker, session) = testing::worker().await;

        let pushed = output(&push_impl(&worker, SwPushParams { payload: None }).await.unwrap());
        assert_eq!(pushed["notification"]["title"], "Portfolio Update");
        assert_eq!(pushed["notification"]["options"]["body"], "New update available!");

        let id = pushed["notification"]["id"].as_str().unwrap().to_string();
        let clicked =
            output(&notification_click_impl(&worker, SwNotificationClickParams { notification_id: id }).await.unwrap());

        assert_eq!(clicked["action"], "opened");
        assert_eq!(clicked["client"]["url"], "https://yourportfolio.com/");
        assert!(session.notifications().await.is_empty());
    }
}
