//! Response snapshots handed back to the page and kept in the store.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Status and body of the response synthesized when an intercepted
/// sub-resource request fails on the network.
pub const NETWORK_ERROR_STATUS: u16 = 408;
pub const NETWORK_ERROR_BODY: &str = "Network error";

/// Visibility class of a response, as the page would observe it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Same-origin response.
    Basic,
    /// Cross-origin response allowed by CORS.
    Cors,
    /// Cross-origin `no-cors` response; status and body are hidden.
    Opaque,
    /// Redirect returned without being followed.
    OpaqueRedirect,
    /// Network error placeholder.
    Error,
    /// Constructed locally, never fetched.
    Default,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Basic => "basic",
            ResponseType::Cors => "cors",
            ResponseType::Opaque => "opaque",
            ResponseType::OpaqueRedirect => "opaqueredirect",
            ResponseType::Error => "error",
            ResponseType::Default => "default",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(ResponseType::Basic),
            "cors" => Ok(ResponseType::Cors),
            "opaque" => Ok(ResponseType::Opaque),
            "opaqueredirect" => Ok(ResponseType::OpaqueRedirect),
            "error" => Ok(ResponseType::Error),
            "default" => Ok(ResponseType::Default),
            other => Err(Error::InvalidInput(format!("unknown response type: {other}"))),
        }
    }
}

/// Immutable snapshot of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StoredResponse {
    pub status: u16,
    pub status_text: String,
    pub response_type: ResponseType,
    /// Final URL after redirects; empty for synthesized responses.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl StoredResponse {
    /// The plain-text 408 served when the network fails and no fallback applies.
    pub fn network_error() -> Self {
        Self {
            status: NETWORK_ERROR_STATUS,
            status_text: "Request Timeout".into(),
            response_type: ResponseType::Default,
            url: String::new(),
            headers: vec![("content-type".into(), "text/plain".into())],
            body: NETWORK_ERROR_BODY.as_bytes().to_vec(),
        }
    }

    /// Whether the storage layer may keep this response at all.
    pub fn is_storable(&self) -> bool {
        self.status != 206
            && !matches!(
                self.response_type,
                ResponseType::Opaque | ResponseType::OpaqueRedirect | ResponseType::Error
            )
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
