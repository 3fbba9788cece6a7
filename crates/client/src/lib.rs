//! Client side of foliocache.
//!
//! This crate provides the network fetch pipeline, the host-runtime seam,
//! and the offline worker that sits between a page and the network.

pub mod fetch;
pub mod host;
pub mod worker;

pub use fetch::{FetchClient, FetchConfig, FetchResponse, Network};
pub use host::{SessionHost, WorkerHost};
pub use worker::{
    ActivateReport, ClickOutcome, InstallReport, InterceptOutcome, Intercepted, Interception, Reconciler, SyncOutcome,
    Worker, WorkerConfig, WorkerState,
};
