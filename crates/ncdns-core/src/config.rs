//! Configuration types for the registrar client
//!
//! This module defines credentials, endpoint selection and client settings.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// Production API endpoint
pub const PRODUCTION_URL: &str = "https://api.namecheap.com/xml.response";

/// Sandbox API endpoint
pub const SANDBOX_URL: &str = "https://api.sandbox.namecheap.com/xml.response";

/// Default timeout applied to every API request (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable names read by [`Credentials::from_lookup`]
pub mod env {
    /// API user
    pub const API_USER: &str = "NAMECHEAP_API_USER";
    /// API key
    pub const API_KEY: &str = "NAMECHEAP_API_KEY";
    /// Account user name (defaults to the API user)
    pub const USER_NAME: &str = "NAMECHEAP_USERNAME";
    /// Allow-listed client IP
    pub const CLIENT_IP: &str = "NAMECHEAP_CLIENT_IP";
    /// `true`/`1` selects the sandbox endpoint
    pub const SANDBOX: &str = "NAMECHEAP_SANDBOX";
}

/// API credentials
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Caller identity (`ApiUser`)
    pub api_user: String,

    /// Shared secret (`ApiKey`)
    /// ⚠️ NEVER log this value
    pub api_key: String,

    /// Account the command acts on (`UserName`)
    pub user_name: String,

    /// Allow-listed caller IP (`ClientIp`)
    pub client_ip: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_user", &self.api_user)
            .field("api_key", &"<REDACTED>")
            .field("user_name", &self.user_name)
            .field("client_ip", &self.client_ip)
            .finish()
    }
}

impl Credentials {
    /// Create credentials
    pub fn new(
        api_user: impl Into<String>,
        api_key: impl Into<String>,
        user_name: impl Into<String>,
        client_ip: impl Into<String>,
    ) -> Self {
        Self {
            api_user: api_user.into(),
            api_key: api_key.into(),
            user_name: user_name.into(),
            client_ip: client_ip.into(),
        }
    }

    /// Read credentials through a variable lookup (usually the process
    /// environment).
    ///
    /// Returns `None` unless API user, API key and client IP are all set.
    /// The user name falls back to the API user.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_user = get(env::API_USER)?;
        let api_key = get(env::API_KEY)?;
        let client_ip = get(env::CLIENT_IP)?;
        let user_name = get(env::USER_NAME).unwrap_or_else(|| api_user.clone());

        Some(Self {
            api_user,
            api_key,
            user_name,
            client_ip,
        })
    }

    /// Validate the credentials
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_user.trim().is_empty() {
            return Err(crate::Error::config("API user cannot be empty"));
        }
        if self.api_key.trim().is_empty() {
            return Err(crate::Error::config("API key cannot be empty"));
        }
        if self.user_name.trim().is_empty() {
            return Err(crate::Error::config("user name cannot be empty"));
        }
        if self.client_ip.trim().parse::<IpAddr>().is_err() {
            return Err(crate::Error::config(format!(
                "client IP '{}' is not a valid IP address",
                self.client_ip
            )));
        }
        Ok(())
    }
}

/// Read the sandbox flag through a variable lookup
pub fn sandbox_from_lookup<F>(lookup: F) -> Option<bool>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(env::SANDBOX)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Upstream API endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// Live registrar
    #[default]
    Production,
    /// Sandbox registrar
    Sandbox,
}

impl Endpoint {
    /// Select by sandbox flag
    pub fn from_sandbox(sandbox: bool) -> Self {
        if sandbox {
            Endpoint::Sandbox
        } else {
            Endpoint::Production
        }
    }

    /// Base URL
    pub fn url(self) -> &'static str {
        match self {
            Endpoint::Production => PRODUCTION_URL,
            Endpoint::Sandbox => SANDBOX_URL,
        }
    }
}

/// Client settings that are not credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Endpoint to talk to
    #[serde(default)]
    pub endpoint: Endpoint,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Create a configuration for the given endpoint with default timeout
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if !(1..=300).contains(&self.timeout_secs) {
            return Err(crate::Error::config(format!(
                "request timeout must be between 1 and 300 seconds. Got: {}",
                self.timeout_secs
            )));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Endpoint::Production)
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_credentials_from_lookup() {
        let creds = Credentials::from_lookup(lookup(&[
            (env::API_USER, "alice"),
            (env::API_KEY, "k3y"),
            (env::CLIENT_IP, "203.0.113.7"),
        ]))
        .unwrap();

        assert_eq!(creds.user_name, "alice");
        assert!(creds.validate().is_ok());
    }

    #[test]
    fn test_credentials_from_lookup_incomplete() {
        let creds =
            Credentials::from_lookup(lookup(&[(env::API_USER, "alice"), (env::API_KEY, " ")]));
        assert!(creds.is_none());
    }

    #[test]
    fn test_credentials_validation() {
        let creds = Credentials::new("alice", "k3y", "alice", "not-an-ip");
        assert!(creds.validate().is_err());

        let creds = Credentials::new("alice", "", "alice", "203.0.113.7");
        assert!(creds.validate().is_err());
    }

    #[test]
    fn test_api_key_not_exposed_in_debug() {
        let creds = Credentials::new("alice", "secret_key_12345", "alice", "203.0.113.7");
        let debug_str = format!("{creds:?}");
        assert!(!debug_str.contains("secret_key_12345"));
        assert!(debug_str.contains("Credentials"));
    }

    #[test]
    fn test_endpoint_selection() {
        assert_eq!(Endpoint::from_sandbox(true).url(), SANDBOX_URL);
        assert_eq!(Endpoint::from_sandbox(false).url(), PRODUCTION_URL);
        assert_eq!(sandbox_from_lookup(lookup(&[(env::SANDBOX, "TRUE")])), Some(true));
        assert_eq!(sandbox_from_lookup(lookup(&[])), None);
    }

    #[test]
    fn test_client_config_timeout_range() {
        assert!(ClientConfig::default().validate().is_ok());
        let config = ClientConfig::default().with_timeout(Duration::from_secs(0));
        assert!(config.validate().is_err());
    }
}
