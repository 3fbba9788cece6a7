//! Request interception: cache first, network fallback.
//!
//! Decision order for an intercepted GET (first match wins):
//!
//! 1. entry in the current store: served verbatim, no network call
//! 2. network `200` from the site origin: served, copied into the store in the background
//! 3. any other network response: served as-is, not stored
//! 4. network failure on a navigation: the cached shell (`/`)
//! 5. any other network failure: synthesized `408` plain-text response

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;

use foliocache_core::{CacheStorage, RequestDescriptor, StoredResponse};

use super::Worker;
use crate::fetch::{Network, canonicalize, has_bypass_scheme};

/// How an intercepted request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterceptOutcome {
    CacheHit,
    NetworkOkCacheable,
    NetworkOkUncacheable,
    NetworkFailNavFallback,
    NetworkFailSynth,
}

/// Result of delivering a fetch event to the worker.
#[derive(Debug)]
pub enum Interception {
    /// The host must perform the request itself; the worker did not look at it.
    NotIntercepted,
    Intercepted(Intercepted),
}

impl Interception {
    pub fn is_intercepted(&self) -> bool {
        matches!(self, Interception::Intercepted(_))
    }

    pub fn into_intercepted(self) -> Option<Intercepted> {
        match self {
            Interception::Intercepted(i) => Some(i),
            Interception::NotIntercepted => None,
        }
    }
}

/// A response produced by the worker.
#[derive(Debug)]
pub struct Intercepted {
    pub outcome: InterceptOutcome,
    pub response: StoredResponse,
    /// Background cache write that outlives the response, if any.
    pub pending_write: Option<JoinHandle<()>>,
}

impl Intercepted {
    fn served(outcome: InterceptOutcome, response: StoredResponse) -> Self {
        Self { outcome, response, pending_write: None }
    }

    /// Hold the event open until background work has settled.
    pub async fn wait_until(&mut self) {
        if let Some(handle) = self.pending_write.take()
            && let Err(e) = handle.await
        {
            tracing::warn!(error = %e, "cache write task did not complete");
        }
    }
}

impl Worker {
    /// Handle one outgoing request from the page.
    ///
    /// Nothing is intercepted before the first activation or once the
    /// worker is redundant. Non-GET requests, extension pseudo-schemes and
    /// URLs that do not resolve to http(s) are not intercepted either. Everything else always
    /// produces a response.
    pub async fn fetch(&self, request: &RequestDescriptor) -> Interception {
        if !self.is_controlling() {
            tracing::debug!(url = %request.url, "worker not active, not intercepting");
            return Interception::NotIntercepted;
        }
        if !request.is_get() {
            tracing::debug!(method = %request.method, url = %request.url, "not intercepting non-GET request");
            return Interception::NotIntercepted;
        }

        if has_bypass_scheme(&request.url, &self.config.bypass_schemes) {
            tracing::debug!(url = %request.url, "not intercepting extension request");
            return Interception::NotIntercepted;
        }

        let url = match canonicalize(&request.url, &self.config.origin) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "not intercepting request");
                return Interception::NotIntercepted;
            }
        };

        Interception::Intercepted(self.respond(request.with_url(url.as_str())).await)
    }

    async fn respond(&self, request: RequestDescriptor) -> Intercepted {
        match self.storage.match_request(&self.config.cache_name, &request).await {
            Ok(Some(hit)) => {
                tracing::debug!(url = %request.url, "cache hit");
                return Intercepted::served(InterceptOutcome::CacheHit, hit);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(url = %request.url, error = %e, "cache lookup failed, going to network"),
        }

        match self.network.fetch(&request).await {
            Ok(response) if response.is_cacheable() => {
                let snapshot = response.snapshot();
                let pending = self.spawn_cache_write(request, snapshot.clone());
                Intercepted {
                    outcome: InterceptOutcome::NetworkOkCacheable,
                    response: snapshot,
                    pending_write: Some(pending),
                }
            }
            Ok(response) => Intercepted::served(InterceptOutcome::NetworkOkUncacheable, response.snapshot()),
            Err(e) if e.is_network_failure() => {
                tracing::warn!(url = %request.url, error = %e, "fetch failed, returning offline response");
                self.offline_response(&request).await
            }
            Err(e) => {
                tracing::error!(url = %request.url, error = %e, "request could not be sent");
                Intercepted::served(InterceptOutcome::NetworkFailSynth, StoredResponse::network_error())
            }
        }
    }

    /// Copy a response into the current store without holding up the caller.
    fn spawn_cache_write(&self, request: RequestDescriptor, response: StoredResponse) -> JoinHandle<()> {
        let storage = Arc::clone(&self.storage);
        let cache_name = self.config.cache_name.clone();
        tokio::spawn(async move {
            if let Err(e) = storage.put(&cache_name, &request, &response).await {
                tracing::warn!(url = %request.url, error = %e, "failed to cache response");
            }
        })
    }

    async fn offline_response(&self, request: &RequestDescriptor) -> Intercepted {
        if request.is_navigation() {
            let shell = RequestDescriptor::get(self.config.root_url().as_str());
            match self.storage.match_request(&self.config.cache_name, &shell).await {
                Ok(Some(cached)) => return Intercepted::served(InterceptOutcome::NetworkFailNavFallback, cached),
                Ok(None) => tracing::warn!("application shell is not cached"),
                Err(e) => tracing::warn!(error = %e, "failed to read cached application shell"),
            }
        }
        Intercepted::served(InterceptOutcome::NetworkFailSynth, StoredResponse::network_error())
    }
}
