//! The offline worker: an intercepting cache between the page and the network.
//!
//! A [`Worker`] is registered once by the host with its configuration,
//! storage, network and host seams. After that the host delivers lifecycle
//! events to it:
//!
//! - `install` / `activate` ([`lifecycle`]): seed the current store, drop stale ones, claim pages
//! - `fetch` ([`intercept`]): cache first, network fallback, offline substitutes
//! - `sync` / `push` / `notification_click` ([`bridge`]): out-of-band events
//!
//! Handlers return futures; whatever work must outlive the response (the
//! background cache write) is handed back as a `JoinHandle` so the host can
//! keep the event open until it settles.

pub mod bridge;
pub mod intercept;
pub mod lifecycle;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::Url;
use serde::Serialize;
use tokio::sync::Mutex;

use foliocache_core::{AppConfig, CacheStorage, Error, NotificationConfig};

use crate::fetch::Network;
use crate::host::WorkerHost;

pub use bridge::{ClickOutcome, FormSync, Reconciler, SyncOutcome};
pub use intercept::{InterceptOutcome, Intercepted, Interception};
pub use lifecycle::{ActivateReport, InstallReport, SeedFailure};

/// Worker settings derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Current store name (the version tag).
    pub cache_name: String,
    pub origin: Url,
    pub seed_urls: Vec<String>,
    pub asset_urls: Vec<String>,
    pub bypass_schemes: Vec<String>,
    pub sync_tag: String,
    pub notification: NotificationConfig,
}

impl WorkerConfig {
    pub fn from_app(config: &AppConfig) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("origin: {e}")))?;
        Ok(Self {
            cache_name: config.cache_name.clone(),
            origin,
            seed_urls: config.seed_urls.clone(),
            asset_urls: config.asset_urls.clone(),
            bypass_schemes: config.bypass_schemes.clone(),
            sync_tag: config.sync_tag.clone(),
            notification: config.notification.clone(),
        })
    }

    /// The site root; the application shell lives here.
    pub fn root_url(&self) -> Url {
        let mut root = self.origin.clone();
        root.set_path("/");
        root.set_query(None);
        root.set_fragment(None);
        root
    }
}

/// Registration state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install failed fatally; the worker must be installed again.
    Redundant,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        };
        f.write_str(s)
    }
}

/// A registered offline worker. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Worker {
    config: Arc<WorkerConfig>,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    host: Arc<dyn WorkerHost>,
    reconciler: Arc<dyn Reconciler>,
    state: Arc<Mutex<WorkerState>>,
    /// Set once activation completes, cleared when the worker turns redundant.
    controlling: Arc<AtomicBool>,
}

impl Worker {
    /// Wire up a worker. No I/O happens until the host delivers `install`.
    pub fn register(
        config: WorkerConfig, storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>, host: Arc<dyn WorkerHost>,
    ) -> Self {
        tracing::info!(cache = %config.cache_name, origin = %config.origin, "registered offline worker");
        Self {
            config: Arc::new(config),
            storage,
            network,
            host,
            reconciler: Arc::new(FormSync),
            state: Arc::new(Mutex::new(WorkerState::Parsed)),
            controlling: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replace the deferred-sync routine.
    pub fn with_reconciler(mut self, reconciler: Arc<dyn Reconciler>) -> Self {
        self.reconciler = reconciler;
        self
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.lock().await
    }

    /// Whether fetch events are intercepted. Pages are controlled from the
    /// first completed activation until the worker becomes redundant; a
    /// later re-install does not release them.
    pub fn is_controlling(&self) -> bool {
        self.controlling.load(Ordering::SeqCst)
    }

    /// Move to `to` if the current state is one of `from`.
    async fn transition(&self, from: &[WorkerState], to: WorkerState) -> Result<WorkerState, Error> {
        let mut state = self.state.lock().await;
        if !from.contains(&state) {
            return Err(Error::InvalidState(format!("cannot move from {} to {}", *state, to)));
        }
        let previous = *state;
        *state = to;
        Ok(previous)
    }

    async fn set_state(&self, to: WorkerState) {
        let mut state = self.state.lock().await;
        match to {
            WorkerState::Activated => self.controlling.store(true, Ordering::SeqCst),
            WorkerState::Redundant => self.controlling.store(false, Ordering::SeqCst),
            _ => {}
        }
        *state = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_config_from_app() {
        let config = WorkerConfig::from_app(&AppConfig::default()).unwrap();
        assert_eq!(config.cache_name, "portfolio-v2");
        assert_eq!(config.root_url().as_str(), "https://yourportfolio.com/");
    }

    #[test]
    fn test_root_url_strips_path() {
        let app = AppConfig { origin: "https://yourportfolio.com/about?x=1".into(), ..Default::default() };
        let config = WorkerConfig::from_app(&app).unwrap();
        assert_eq!(config.root_url().as_str(), "https://yourportfolio.com/");
    }

    #[test]
    fn test_worker_config_rejects_bad_origin() {
        let app = AppConfig { origin: "not a url".into(), ..Default::default() };
        assert!(matches!(WorkerConfig::from_app(&app), Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_transition_guard() {
        let (worker, ..) = testing::worker().await;
        assert_eq!(worker.state().await, WorkerState::Parsed);

        let result = worker.transition(&[WorkerState::Installed], WorkerState::Activating).await;
        assert!(matches!(result, Err(Error::InvalidState(_))));
        assert_eq!(worker.state().await, WorkerState::Parsed);
    }

    #[tokio::test]
    async fn test_controlling_follows_activation() {
        let (worker, ..) = testing::worker().await;
        assert!(!worker.is_controlling());

        worker.set_state(WorkerState::Activated).await;
        assert!(worker.is_controlling());

        worker.set_state(WorkerState::Installing).await;
        assert!(worker.is_controlling());

        worker.set_state(WorkerState::Redundant).await;
        assert!(!worker.is_controlling());
    }
}
