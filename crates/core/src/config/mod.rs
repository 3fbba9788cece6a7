//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (FOLIOCACHE_*)
//! 2. TOML config file (if FOLIOCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Worker configuration.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (FOLIOCACHE_*, `__` for nested keys)
/// 2. TOML config file (if FOLIOCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Name of the current store. Changing it on redeploy invalidates
    /// every previously cached entry.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Origin the site is served from. Relative URLs resolve against it and
    /// responses from it are classified as same-origin.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Essential resources cached on install: the application shell.
    #[serde(default = "default_seed_urls")]
    pub seed_urls: Vec<String>,

    /// Secondary resources cached on install, best effort.
    #[serde(default = "default_asset_urls")]
    pub asset_urls: Vec<String>,

    /// URL schemes that are never intercepted.
    #[serde(default = "default_bypass_schemes")]
    pub bypass_schemes: Vec<String>,

    /// Path to the SQLite file holding the stores.
    ///
    /// Set via FOLIOCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for network requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request network timeout in milliseconds. Unset means requests
    /// may hang indefinitely.
    #[serde(default)]
    pub fetch_timeout_ms: Option<u64>,

    /// Deferred-sync tag that triggers form reconciliation.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,

    #[serde(default)]
    pub notification: NotificationConfig,
}

/// Appearance of push notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_notification_title")]
    pub title: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_icon")]
    pub badge: String,
    /// Body used when the push payload is absent or empty.
    #[serde(default = "default_notification_body")]
    pub default_body: String,
    #[serde(default = "default_vibrate")]
    pub vibrate: Vec<u32>,
}

fn default_cache_name() -> String {
    "portfolio-v2".into()
}

fn default_origin() -> String {
    "https://yourportfolio.com".into()
}

fn default_seed_urls() -> Vec<String> {
    vec!["/".into(), "/index.html".into()]
}

fn default_asset_urls() -> Vec<String> {
    vec!["/favicon.ico".into(), "/manifest.json".into()]
}

fn default_bypass_schemes() -> Vec<String> {
    vec!["chrome-extension".into(), "moz-extension".into(), "safari-web-extension".into()]
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./foliocache.sqlite")
}

fn default_user_agent() -> String {
    "foliocache/0.1".into()
}

fn default_sync_tag() -> String {
    "sync-forms".into()
}

fn default_notification_title() -> String {
    "Portfolio Update".into()
}

fn default_icon() -> String {
    "/favicon.ico".into()
}

fn default_notification_body() -> String {
    "New update available!".into()
}

fn default_vibrate() -> Vec<u32> {
    vec![100, 50, 100]
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: default_notification_title(),
            icon: default_icon(),
            badge: default_icon(),
            default_body: default_notification_body(),
            vibrate: default_vibrate(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_name: default_cache_name(),
            origin: default_origin(),
            seed_urls: default_seed_urls(),
            asset_urls: default_asset_urls(),
            bypass_schemes: default_bypass_schemes(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            fetch_timeout_ms: None,
            sync_tag: default_sync_tag(),
            notification: NotificationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Network timeout, if one is configured.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("FOLIOCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("FOLIOCACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
