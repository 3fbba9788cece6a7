//! Core types and shared functionality for foliocache.
//!
//! This crate provides:
//! - Request/response data model seen by the offline worker
//! - Named response stores with a SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod notification;
pub mod request;
pub mod response;

pub use cache::{CacheDb, CacheStorage};
pub use config::{AppConfig, ConfigError, NotificationConfig};
pub use error::Error;
pub use notification::{NotificationData, NotificationOptions, ShownNotification, WindowClient};
pub use request::{RequestDescriptor, RequestMode};
pub use response::{ResponseType, StoredResponse};
