//! Named, versioned response stores backed by SQLite.
//!
//! A store maps a GET request descriptor to a response snapshot. Several
//! stores may exist side by side (one per deployed version); the worker
//! keeps exactly one of them current and removes the rest on activation.
//!
//! - Content-addressed entries keyed by SHA-256 of method and URL
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod hash;
pub mod migrations;
pub mod stores;

use async_trait::async_trait;

pub use crate::Error;
use crate::{RequestDescriptor, StoredResponse};

pub use connection::CacheDb;

/// Storage API consumed by the worker.
///
/// Mirrors the browser cache storage surface: named stores that can be
/// opened, listed and deleted, each holding request → response entries.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the store if it does not exist yet.
    async fn open(&self, name: &str) -> Result<(), Error>;

    /// Names of all existing stores, oldest first.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Delete a store and every entry in it. Returns whether it existed.
    async fn delete(&self, name: &str) -> Result<bool, Error>;

    /// Look up a request in one store.
    async fn match_request(&self, name: &str, request: &RequestDescriptor) -> Result<Option<StoredResponse>, Error>;

    /// Insert or replace the entry for `request`, creating the store if needed.
    ///
    /// Refuses non-GET requests and responses that are partial, opaque or
    /// errors with `Error::NotCacheable`.
    async fn put(&self, name: &str, request: &RequestDescriptor, response: &StoredResponse) -> Result<(), Error>;

    /// Number of entries in a store (0 if it does not exist).
    async fn entry_count(&self, name: &str) -> Result<u64, Error>;
}

/// Shared precondition for every `put` implementation.
pub fn check_storable(request: &RequestDescriptor, response: &StoredResponse) -> Result<(), Error> {
    if !request.is_get() {
        return Err(Error::NotCacheable(format!("{} {}: only GET requests are cached", request.method, request.url)));
    }
    if !response.is_storable() {
        return Err(Error::NotCacheable(format!(
            "{}: status {} type {} cannot be stored",
            request.url, response.status, response.response_type
        )));
    }
    Ok(())
}
