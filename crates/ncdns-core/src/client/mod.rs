//! Authenticated API client
//!
//! [`ApiClient`] turns `(command, params)` into a transport request carrying
//! the four authentication parameters, sends it, and hands the body to the
//! wire normalizer.
//!
//! ## Request Flow
//!
//! 1. Drop absent/empty caller parameters
//! 2. Prepend `ApiUser`, `ApiKey`, `UserName`, `ClientIp`, `Command`
//! 3. GET (reads) or POST (writes) through the [`Transport`]
//! 4. Parse the body into an [`ApiResponse`], returned verbatim
//!
//! Application-level failure is not interpreted here; use
//! [`ApiResponse::into_data`] or the `*_data` helpers for that.

pub mod params;

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::config::{ClientConfig, Credentials, Endpoint};
use crate::error::Result;
use crate::traits::{HttpMethod, Transport, TransportRequest};
use crate::wire::ApiResponse;

pub use params::Params;

/// Authenticated client for one set of credentials and one endpoint
pub struct ApiClient {
    credentials: Credentials,
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("credentials", &self.credentials)
            .field("endpoint", &self.config.endpoint)
            .field("transport", &self.transport.transport_name())
            .finish()
    }
}

impl ApiClient {
    /// Create a client
    ///
    /// Fails if the credentials or configuration are invalid.
    pub fn new(
        credentials: Credentials,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        credentials.validate()?;
        config.validate()?;
        Ok(Self {
            credentials,
            config,
            transport,
        })
    }

    /// Endpoint this client talks to
    pub fn endpoint(&self) -> Endpoint {
        self.config.endpoint
    }

    /// Account user name
    pub fn user_name(&self) -> &str {
        &self.credentials.user_name
    }

    /// Issue a read (query-string transport)
    pub async fn request(&self, command: &str, params: Params) -> Result<ApiResponse> {
        self.call(HttpMethod::Get, command, params).await
    }

    /// Issue a write (form-encoded body transport)
    pub async fn post(&self, command: &str, params: Params) -> Result<ApiResponse> {
        self.call(HttpMethod::Post, command, params).await
    }

    /// [`request`](Self::request) followed by [`ApiResponse::into_data`]
    pub async fn request_data(&self, command: &str, params: Params) -> Result<Value> {
        self.request(command, params).await?.into_data()
    }

    /// [`post`](Self::post) followed by [`ApiResponse::into_data`]
    pub async fn post_data(&self, command: &str, params: Params) -> Result<Value> {
        self.post(command, params).await?.into_data()
    }

    async fn call(&self, method: HttpMethod, command: &str, params: Params) -> Result<ApiResponse> {
        debug!(
            "{} {} via {} (params: {:?})",
            method.as_str(),
            command,
            self.transport.transport_name(),
            params.names()
        );

        let request = TransportRequest::new(
            self.config.endpoint.url(),
            method,
            self.assemble(command, params),
        )
        .with_timeout(self.config.timeout());

        let body = self.transport.send(&request).await?;
        let response = ApiResponse::parse(&body)?;

        debug!(
            "{} answered success={} errors={} warnings={}",
            command,
            response.success,
            response.errors.len(),
            response.warnings.len()
        );
        Ok(response)
    }

    fn assemble(&self, command: &str, params: Params) -> Vec<(String, String)> {
        let mut wire = vec![
            ("ApiUser".to_string(), self.credentials.api_user.clone()),
            ("ApiKey".to_string(), self.credentials.api_key.clone()),
            ("UserName".to_string(), self.credentials.user_name.clone()),
            ("ClientIp".to_string(), self.credentials.client_ip.clone()),
            ("Command".to_string(), command.to_string()),
        ];
        wire.extend(params.into_wire());
        wire
    }
}
