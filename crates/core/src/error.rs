//! Unified error types for foliocache.
//!
//! Each variant carries a stable upper-case code prefix that also shows up
//! in the MCP error data returned by the server.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the offline cache worker.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., unknown request mode).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid or unsupported URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// No entry for the request in the current store.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// The named store could not be opened.
    #[error("STORE_UNAVAILABLE: {0}")]
    StoreUnavailable(String),

    /// The storage layer refused to keep a request/response pair.
    #[error("NOT_CACHEABLE: {0}")]
    NotCacheable(String),

    /// Network failure (connection refused, DNS, reset, ...).
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Seed resource answered with a non-2xx status.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Lifecycle event delivered out of order.
    #[error("INVALID_STATE: {0}")]
    InvalidState(String),

    /// The host could not show or close a notification.
    #[error("NOTIFICATION_FAILED: {0}")]
    NotificationFailed(String),

    /// No window client with the given id.
    #[error("CLIENT_NOT_FOUND: {0}")]
    ClientNotFound(String),

    /// Deferred sync routine failed.
    #[error("SYNC_FAILED: {0}")]
    SyncFailed(String),
}

impl Error {
    /// Whether this error means the request never produced a response.
    pub fn is_network_failure(&self) -> bool {
        matches!(self, Error::Network(_) | Error::FetchTimeout(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidInput(format!("malformed JSON: {err}"))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::CacheMiss(msg) => (-32001, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::StoreUnavailable(msg) => (-32002, msg.clone()),
            Error::NotCacheable(msg) => (-32004, msg.clone()),
            Error::Network(msg) => (-32005, msg.clone()),
            Error::FetchTimeout(msg) => (-32006, msg.clone()),
            Error::HttpError(msg) => (-32008, msg.clone()),
            Error::InvalidState(msg) => (-32009, msg.clone()),
            Error::NotificationFailed(msg) => (-32010, msg.clone()),
            Error::ClientNotFound(msg) => (-32011, msg.clone()),
            Error::SyncFailed(msg) => (-32012, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::CacheMiss("https://example.com/".to_string());
        assert!(err.to_string().contains("CACHE_MISS"));
        assert!(err.to_string().contains("https://example.com/"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::InvalidState("activate before install".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32009);
    }

    #[test]
    fn test_network_failure_classification() {
        assert!(Error::Network("refused".into()).is_network_failure());
        assert!(Error::FetchTimeout("30s".into()).is_network_failure());
        assert!(!Error::HttpError("status 404".into()).is_network_failure());
    }
}
