// # Transport Trait
//
// Defines the raw HTTP exchange the API client sits on.
//
// ## Implementations
//
// - reqwest: `ncdns-http` crate
// - Scripted test doubles: `tests/common`
//
// ## Usage
//
// ```rust,ignore
// use ncdns_core::traits::{HttpMethod, Transport, TransportRequest};
//
// let request = TransportRequest::new(
//     "https://api.sandbox.namecheap.com/xml.response",
//     HttpMethod::Get,
//     vec![("Command".into(), "namecheap.domains.getList".into())],
// );
// let body = transport.send(&request).await?;
// ```

use async_trait::async_trait;
use std::time::Duration;

/// HTTP verb used for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// Reads: parameters travel in the query string
    Get,
    /// Writes: parameters travel form-encoded in the body
    Post,
}

impl HttpMethod {
    /// Upper-case verb
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// A fully-assembled request, authentication parameters included
#[derive(Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// Endpoint URL
    pub url: String,
    /// HTTP verb
    pub method: HttpMethod,
    /// Parameters in submission order
    pub params: Vec<(String, String)>,
    /// Per-request timeout; `None` leaves the transport's own default
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    /// Create a request
    pub fn new(url: impl Into<String>, method: HttpMethod, params: Vec<(String, String)>) -> Self {
        Self {
            url: url.into(),
            method,
            params,
            timeout: None,
        }
    }

    /// Bound this request to `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Look up a parameter value by name
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

// Parameters include the API key, so only names are shown.
impl std::fmt::Debug for TransportRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.params.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("TransportRequest")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("params", &names)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Trait for HTTP transport implementations
///
/// A transport performs exactly one HTTP exchange per call and returns the
/// response body. It knows nothing about the registrar's XML.
///
/// ## Allowed
/// - ✅ One HTTP request to `request.url`
/// - ✅ Apply `request.timeout` when set, a bounded default otherwise
///
/// ## Forbidden
/// - ❌ Retries or backoff (a failed exchange is reported, never repeated)
/// - ❌ Logging parameter values (they include the API key)
/// - ❌ Interpreting the body
///
/// ## Errors
///
/// - Non-2xx status → `Error::Transport { status: Some(code), .. }`
/// - Connection failure or timeout → `Error::Transport { status: None, .. }`
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the exchange and return the response body
    async fn send(&self, request: &TransportRequest) -> Result<String, crate::Error>;

    /// Transport name (for logging/debugging)
    fn transport_name(&self) -> &'static str;
}
