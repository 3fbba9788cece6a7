//! sw_install and sw_activate tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};

use foliocache_client::Worker;

use super::json_result;

pub async fn install_impl(worker: &Worker) -> Result<CallToolResult, McpError> {
    let report = worker.install().await?;
    json_result(&report)
}

pub async fn activate_impl(worker: &Worker) -> Result<CallToolResult, McpError> {
    let report = worker.activate().await?;
    json_result(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{self, output};

    #[tokio::test]
    async fn test_install_offline_reports_failures() {
        let (worker, _) = testing::worker().await;

        let result = install_impl(&worker).await.unwrap();
        let report = output(&result);

        assert_eq!(report["cache_name"], "portfolio-v2");
        assert_eq!(report["cached"].as_array().unwrap().len(), 0);
        assert_eq!(report["failed"].as_array().unwrap().len(), 4);
        assert_eq!(report["failed"][0]["url"], "https://yourportfolio.com/");
        assert_eq!(report["failed"][0]["essential"], true);
    }

    #[tokio::test]
    async fn test_activate_before_install_is_rejected() {
        let (worker, _) = testing::worker().await;
        let err = activate_impl(&worker).await.unwrap_err();
        assert_eq!(err.code.0, -32009);
    }

    #[tokio::test]
    async fn test_install_then_activate_claims() {
        let (worker, session) = testing::worker().await;
        session.attach_client("https://yourportfolio.com/").await;

        install_impl(&worker).await.unwrap();
        let report = output(&activate_impl(&worker).await.unwrap());

        assert_eq!(report["claimed"], 1);
        assert_eq!(report["deleted"].as_array().unwrap().len(), 0);
    }
}
