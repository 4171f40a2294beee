// # HTTP Transport
//
// reqwest implementation of the core `Transport` trait.
//
// - ✅ One HTTP request per `send` call
// - ✅ GET: parameters in the query string
// - ✅ POST: parameters form-encoded in the body
// - ✅ Bounded timeout: the request's own, else 30 seconds
// - ❌ NO retry logic (a failed exchange is reported as-is)
// - ❌ NO logging of parameter values (they carry the API key)
//
// ## Errors
//
// | outcome                         | error                                   |
// |---------------------------------|-----------------------------------------|
// | non-2xx status                  | `Error::Transport { status: Some(..) }` |
// | connect failure, timeout, reset | `Error::Transport { status: None }`     |

pub mod public_ip;

use async_trait::async_trait;
use ncdns_core::config::DEFAULT_REQUEST_TIMEOUT;
use ncdns_core::traits::{HttpMethod, Transport, TransportRequest};
use ncdns_core::{Error, Result};
use std::time::Duration;

/// Longest error body excerpt carried in a transport error
const MAX_ERROR_BODY: usize = 200;

/// reqwest-backed transport
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

// The client holds no secrets but its Debug output is noisy
impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpTransport {
    /// Create a transport with the given per-request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ncdns/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    /// Create a transport with the default 30 second timeout
    pub fn with_default_timeout() -> Result<Self> {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &TransportRequest) -> Result<String> {
        let timeout = request.timeout.unwrap_or(self.timeout);
        let builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url).query(&request.params),
            HttpMethod::Post => self.client.post(&request.url).form(&request.params),
        }
        .timeout(timeout);

        let response = builder.send().await.map_err(|e| {
            let cause = if e.is_timeout() {
                format!("request timed out after {}s", timeout.as_secs())
            } else if e.is_connect() {
                "connection failed".to_string()
            } else {
                "request failed".to_string()
            };
            // reqwest errors for GET carry the URL, which carries the API key
            tracing::debug!("{} {} failed: {}", request.method.as_str(), request.url, cause);
            Error::transport(None, cause)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.trim().chars().take(MAX_ERROR_BODY).collect();
            tracing::debug!("{} answered HTTP {}", request.url, status.as_u16());
            return Err(Error::transport(
                Some(status.as_u16()),
                format!(
                    "{}{}",
                    status.canonical_reason().unwrap_or("unexpected status"),
                    if excerpt.is_empty() { String::new() } else { format!(": {excerpt}") }
                ),
            ));
        }

        response
            .text()
            .await
            .map_err(|_| Error::transport(None, "failed to read response body"))
    }

    fn transport_name(&self) -> &'static str {
        "http"
    }
}
