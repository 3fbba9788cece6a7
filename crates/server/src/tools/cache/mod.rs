//! Cache inspection tools.

pub mod get;
pub mod keys;

pub use get::{CacheGetParams, get_impl};
pub use keys::keys_impl;
