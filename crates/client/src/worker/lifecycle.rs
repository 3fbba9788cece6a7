//! Cache lifecycle: seeding the current store and retiring stale ones.

use futures_util::future::join_all;
use reqwest::Url;
use serde::Serialize;

use foliocache_core::{CacheStorage, Error, RequestDescriptor};

use super::{Worker, WorkerState};
use crate::fetch::{Network, canonicalize};
use crate::host::WorkerHost;

/// Outcome of a best-effort install.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstallReport {
    pub cache_name: String,
    /// Absolute URLs now in the store, in seed order.
    pub cached: Vec<String>,
    /// Failed seeds, by absolute URL where the configured path resolves.
    pub failed: Vec<SeedFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedFailure {
    pub url: String,
    /// Part of the application shell rather than a secondary asset.
    pub essential: bool,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivateReport {
    pub cache_name: String,
    pub deleted: Vec<String>,
    /// Pages controlled after the claim.
    pub claimed: usize,
}

impl Worker {
    /// Open the current store and seed it.
    ///
    /// Every seed is fetched and stored independently and concurrently; a
    /// failing seed is logged and reported, never fatal. Only a store that
    /// cannot be opened fails the install, leaving the worker redundant.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.transition(
            &[WorkerState::Parsed, WorkerState::Installed, WorkerState::Activated, WorkerState::Redundant],
            WorkerState::Installing,
        )
        .await?;

        let cache_name = &self.config.cache_name;
        if let Err(e) = self.storage.open(cache_name).await {
            tracing::error!(cache = %cache_name, error = %e, "cache installation failed");
            self.set_state(WorkerState::Redundant).await;
            return Err(e);
        }
        tracing::info!(cache = %cache_name, "opened cache");

        let seeds = self
            .config
            .seed_urls
            .iter()
            .map(|u| (u.as_str(), true))
            .chain(self.config.asset_urls.iter().map(|u| (u.as_str(), false)));

        let attempts = seeds.map(|(raw, essential)| async move {
            match canonicalize(raw, &self.config.origin) {
                Ok(url) => (url.to_string(), essential, self.add(&url).await),
                Err(e) => (raw.to_string(), essential, Err(Error::InvalidUrl(e.to_string()))),
            }
        });

        let mut report = InstallReport { cache_name: cache_name.clone(), ..Default::default() };
        for (url, essential, result) in join_all(attempts).await {
            match result {
                Ok(()) => report.cached.push(url),
                Err(e) => {
                    if essential {
                        tracing::warn!(url = %url, error = %e, "failed to cache shell resource");
                    } else {
                        tracing::debug!(url = %url, error = %e, "failed to cache optional asset");
                    }
                    report.failed.push(SeedFailure { url, essential, error: e.to_string() });
                }
            }
        }

        tracing::info!(
            cache = %cache_name,
            cached = report.cached.len(),
            failed = report.failed.len(),
            "install complete"
        );
        self.set_state(WorkerState::Installed).await;

        Ok(report)
    }

    /// Fetch one resource and store it under its GET descriptor.
    async fn add(&self, url: &Url) -> Result<(), Error> {
        let request = RequestDescriptor::get(url.as_str());

        let response = self.network.fetch(&request).await?;
        if !response.status.is_success() {
            return Err(Error::HttpError(format!("status {}", response.status.as_u16())));
        }

        self.storage.put(&self.config.cache_name, &request, &response.snapshot()).await
    }

    /// Delete every store except the current one, then claim open pages.
    ///
    /// Deletions run concurrently; the claim only happens once all of them
    /// have succeeded.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        self.transition(&[WorkerState::Installed], WorkerState::Activating).await?;

        match self.retire_and_claim().await {
            Ok(report) => {
                tracing::info!(
                    cache = %report.cache_name,
                    deleted = report.deleted.len(),
                    claimed = report.claimed,
                    "worker activated"
                );
                self.set_state(WorkerState::Activated).await;
                Ok(report)
            }
            Err(e) => {
                tracing::warn!(error = %e, "activation failed");
                self.set_state(WorkerState::Installed).await;
                Err(e)
            }
        }
    }

    async fn retire_and_claim(&self) -> Result<ActivateReport, Error> {
        let current = &self.config.cache_name;
        let stale: Vec<String> = self.storage.keys().await?.into_iter().filter(|n| n != current).collect();

        let deletions = stale.iter().map(|name| async move {
            tracing::info!(cache = %name, "deleting old cache");
            self.storage.delete(name).await
        });

        for result in join_all(deletions).await {
            result?;
        }

        let claimed = self.host.claim().await?;

        Ok(ActivateReport { cache_name: current.clone(), deleted: stale, claimed })
    }
}
