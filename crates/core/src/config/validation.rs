//! Configuration validation rules.
//!
//! Checked once after `AppConfig` has been assembled from environment,
//! file and defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_name`, `user_agent` or `sync_tag` is empty
    /// - `origin` is not an absolute http(s) URL
    /// - `seed_urls` is empty
    /// - `fetch_timeout_ms` is set below 100ms or above 5 minutes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_name.trim().is_empty() {
            return Err(invalid("cache_name", "must not be empty"));
        }

        match url::Url::parse(&self.origin) {
            Ok(origin) if matches!(origin.scheme(), "http" | "https") && origin.host_str().is_some() => {}
            Ok(origin) => {
                return Err(invalid("origin", format!("unsupported origin: {origin}")));
            }
            Err(e) => return Err(invalid("origin", e.to_string())),
        }

        if self.seed_urls.is_empty() {
            return Err(invalid("seed_urls", "at least the application shell must be seeded"));
        }

        if let Some(timeout_ms) = self.fetch_timeout_ms {
            if timeout_ms < 100 {
                return Err(invalid("fetch_timeout_ms", "must be at least 100ms"));
            }
            if timeout_ms > 300_000 {
                return Err(invalid("fetch_timeout_ms", "must not exceed 5 minutes (300000ms)"));
            }
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.sync_tag.is_empty() {
            return Err(invalid("sync_tag", "must not be empty"));
        }

        if !self.seed_urls.iter().any(|u| u == "/") {
            tracing::warn!(
                seed_count = self.seed_urls.len(),
                "seed_urls does not include \"/\"; offline navigations will fall back to the 408 response"
            );
        }

        Ok(())
    }
}
