//! Network side of the worker.
//!
//! ### URL Canonicalization
//! - Trim whitespace, resolve against the site origin
//! - Lowercase host, remove fragments
//! - Preserve query string
//!
//! ### Response classification
//! - Final URL on the site origin: `basic`
//! - Cross-origin with `no-cors`: `opaque` (status and body hidden)
//! - Cross-origin otherwise: `cors`
//! - `same-origin` mode to a foreign origin fails as a network error
//!
//! HTTP error statuses are responses, not failures. Only transport errors
//! (and an optional timeout) surface as `Err`.

pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use reqwest::{Client, Method, StatusCode, header};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, canonicalize, has_bypass_scheme, is_same_origin};

use foliocache_core::{AppConfig, Error, RequestDescriptor, RequestMode, ResponseType, StoredResponse};

/// Network API consumed by the worker.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request. `request.url` must already be absolute.
    async fn fetch(&self, request: &RequestDescriptor) -> Result<FetchResponse, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Site origin used to classify responses.
    pub origin: Url,

    /// User agent string (default: "foliocache/0.1")
    pub user_agent: String,

    /// Request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl FetchConfig {
    pub fn from_app(config: &AppConfig) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("origin: {e}")))?;
        Ok(Self { origin, user_agent: config.user_agent.clone(), timeout: config.fetch_timeout(), max_redirects: 5 })
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    pub response_type: ResponseType,
    /// Response headers
    pub headers: header::HeaderMap,
    /// Response body bytes
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    pub fn redirected(&self) -> bool {
        self.url != self.final_url
    }

    /// Eligible for an opportunistic cache write: a direct `200` from the
    /// site origin.
    pub fn is_cacheable(&self) -> bool {
        self.status == StatusCode::OK && self.response_type == ResponseType::Basic && !self.redirected()
    }

    /// What the page gets to see. Opaque responses hide status, headers and body.
    pub fn snapshot(&self) -> StoredResponse {
        if self.response_type == ResponseType::Opaque {
            return StoredResponse {
                status: 0,
                status_text: String::new(),
                response_type: ResponseType::Opaque,
                url: String::new(),
                headers: Vec::new(),
                body: Vec::new(),
            };
        }

        let headers = self
            .headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();

        StoredResponse {
            status: self.status.as_u16(),
            status_text: self.status.canonical_reason().unwrap_or_default().to_string(),
            response_type: self.response_type,
            url: self.final_url.to_string(),
            headers,
            body: self.bytes.to_vec(),
        }
    }
}

/// Classify a completed response the way a browser would expose it.
pub fn classify(origin: &Url, final_url: &Url, mode: RequestMode) -> ResponseType {
    if is_same_origin(origin, final_url) {
        ResponseType::Basic
    } else if mode == RequestMode::NoCors {
        ResponseType::Opaque
    } else {
        ResponseType::Cors
    }
}

/// reqwest-backed network client.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() { Error::FetchTimeout(err.to_string()) } else { Error::Network(err.to_string()) }
}

#[async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let url = Url::parse(&request.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| Error::InvalidInput(format!("invalid method: {}", request.method)))?;

        if request.mode == RequestMode::SameOrigin && !is_same_origin(&self.config.origin, &url) {
            return Err(Error::Network(format!("same-origin request to {}", url)));
        }

        let response = self.http.request(method, url.clone()).send().await.map_err(transport_error)?;

        let status = response.status();
        let final_url = response.url().clone();
        let headers = response.headers().clone();
        let bytes = response.bytes().await.map_err(transport_error)?;

        let response_type = classify(&self.config.origin, &final_url, request.mode);
        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "fetched {} {} -> {} {} ({}) in {}ms ({} bytes)",
            request.method,
            url,
            final_url,
            status.as_u16(),
            response_type,
            fetch_ms,
            bytes.len()
        );

        Ok(FetchResponse { url, final_url, status, response_type, headers, bytes, fetch_ms })
    }
}
