//! Request descriptors as seen by the interceptor.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;
use crate::cache::hash::compute_cache_key;

/// The only method eligible for caching.
pub const CACHEABLE_METHOD: &str = "GET";

/// How the page issued the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// Top-level page load.
    Navigate,
    SameOrigin,
    NoCors,
    #[default]
    Cors,
}

impl RequestMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMode::Navigate => "navigate",
            RequestMode::SameOrigin => "same-origin",
            RequestMode::NoCors => "no-cors",
            RequestMode::Cors => "cors",
        }
    }
}

impl fmt::Display for RequestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "navigate" => Ok(RequestMode::Navigate),
            "same-origin" => Ok(RequestMode::SameOrigin),
            "no-cors" => Ok(RequestMode::NoCors),
            "cors" => Ok(RequestMode::Cors),
            other => Err(Error::InvalidInput(format!("unknown request mode: {other}"))),
        }
    }
}

/// Immutable `(method, url, mode)` triple identifying an outgoing request.
///
/// The method is stored upper-cased. The URL is expected to be canonical
/// (absolute, fragment removed) before it is used as a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RequestDescriptor {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub mode: RequestMode,
}

impl RequestDescriptor {
    pub fn new(method: &str, url: impl Into<String>, mode: RequestMode) -> Self {
        Self { method: method.trim().to_ascii_uppercase(), url: url.into(), mode }
    }

    /// A plain sub-resource GET.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(CACHEABLE_METHOD, url, RequestMode::Cors)
    }

    /// A page-load GET.
    pub fn navigate(url: impl Into<String>) -> Self {
        Self::new(CACHEABLE_METHOD, url, RequestMode::Navigate)
    }

    pub fn is_get(&self) -> bool {
        self.method == CACHEABLE_METHOD
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Same request, different URL. Used after canonicalization.
    pub fn with_url(&self, url: impl Into<String>) -> Self {
        Self { method: self.method.clone(), url: url.into(), mode: self.mode }
    }

    /// Content address of this request inside a store.
    pub fn cache_key(&self) -> String {
        compute_cache_key(&self.method, &self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_is_uppercased() {
        let req = RequestDescriptor::new("get", "https://example.com/", RequestMode::Cors);
        assert_eq!(req.method, "GET");
        assert!(req.is_get());
    }

    #[test]
    fn test_mode_does_not_change_key() {
        let nav = RequestDescriptor::navigate("https://example.com/");
        let sub = RequestDescriptor::get("https://example.com/");
        assert_eq!(nav.cache_key(), sub.cache_key());
    }

    #[test]
    fn test_method_changes_key() {
        let get = RequestDescriptor::get("https://example.com/form");
        let post = RequestDescriptor::new("POST", "https://example.com/form", RequestMode::Cors);
        assert_ne!(get.cache_key(), post.cache_key());
        assert!(!post.is_get());
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("navigate".parse::<RequestMode>().unwrap(), RequestMode::Navigate);
        assert_eq!("No-Cors".parse::<RequestMode>().unwrap(), RequestMode::NoCors);
        assert!("websocket".parse::<RequestMode>().is_err());
    }

    #[test]
    fn test_mode_serde_kebab_case() {
        let json = serde_json::to_string(&RequestMode::SameOrigin).unwrap();
        assert_eq!(json, "\"same-origin\"");
    }
}
