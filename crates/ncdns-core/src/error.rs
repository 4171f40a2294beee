//! Error types for the registrar client
//!
//! This module defines all error types used throughout the crate.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for registrar operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the registrar client
#[derive(Error, Debug)]
pub enum Error {
    /// Caller input is malformed (never reaches the network)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Domain name could not be split into SLD and TLD
    #[error("Invalid domain format: {0}")]
    InvalidFormat(String),

    /// Upstream answered with `Status="ERROR"`
    #[error("{}", format_api_errors(.errors))]
    Api {
        /// Error entries, in the order the upstream sent them
        errors: Vec<ApiErrorEntry>,
    },

    /// HTTP-layer failure (non-2xx status, timeout, connection error)
    #[error(
        "Transport error{}: {message}",
        .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
    )]
    Transport {
        /// HTTP status code, when the server answered at all
        status: Option<u16>,
        /// Human-readable cause
        message: String,
    },

    /// Adding an item that already exists
    #[error("Already exists: {0}")]
    DuplicateResource(String),

    /// Referencing an item that does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// No usable credentials were available
    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    /// Response body could not be understood
    #[error("Failed to parse API response: {0}")]
    Parse(String),

    /// Upstream accepted the request but reported the write as unsuccessful
    #[error("Write rejected by upstream for {0}")]
    WriteRejected(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential store errors
    #[error("Credential store error: {0}")]
    CredentialStore(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// One `<Error Number="...">message</Error>` entry from an upstream response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorEntry {
    /// Upstream numeric code, kept as text
    pub code: String,
    /// Upstream message
    pub message: String,
}

/// Coarse classification of upstream error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// API user/key missing or invalid, or API access disabled
    Authentication,
    /// Caller IP is not on the account's allow-list
    IpNotAllowed,
    /// Domain is unknown to the registrar
    DomainNotFound,
    /// Domain exists but belongs to someone else or cannot be edited
    AccessDenied,
    /// Too many requests
    RateLimited,
    /// Failure reported by the registrar's own backend
    UpstreamTransient,
    /// Anything else
    Other,
}

impl ApiErrorKind {
    /// Whether a later identical request could plausibly succeed.
    ///
    /// Purely informational: nothing in this crate retries.
    pub fn is_transient(self) -> bool {
        matches!(self, ApiErrorKind::RateLimited | ApiErrorKind::UpstreamTransient)
    }
}

impl ApiErrorEntry {
    /// Create an error entry
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Classify this entry by its code
    pub fn kind(&self) -> ApiErrorKind {
        match self.code.as_str() {
            "1010101" | "1010102" | "1011101" | "1011102" | "1010104" | "1011104" => {
                ApiErrorKind::Authentication
            }
            "1011150" | "1017150" | "1010150" => ApiErrorKind::IpNotAllowed,
            "2019166" | "2030280" => ApiErrorKind::DomainNotFound,
            "2016166" | "2030166" | "4023330" => ApiErrorKind::AccessDenied,
            "500000" | "1017152" => ApiErrorKind::RateLimited,
            "3031510" | "3050900" | "3011150" | "5050900" => ApiErrorKind::UpstreamTransient,
            _ => ApiErrorKind::Other,
        }
    }
}

impl std::fmt::Display for ApiErrorEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

fn format_api_errors(errors: &[ApiErrorEntry]) -> String {
    if errors.is_empty() {
        return "API error: upstream reported failure without details".to_string();
    }
    let joined = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    format!("API error: {joined}")
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid domain format error
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    /// Create an API error from upstream entries
    pub fn api(errors: Vec<ApiErrorEntry>) -> Self {
        Self::Api { errors }
    }

    /// Create a transport error
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    /// Create a duplicate resource error
    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::DuplicateResource(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a "not authenticated" error
    pub fn not_authenticated(msg: impl Into<String>) -> Self {
        Self::NotAuthenticated(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a credential store error
    pub fn credential_store(msg: impl Into<String>) -> Self {
        Self::CredentialStore(msg.into())
    }

    /// True for errors raised before any network traffic because of bad input
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::InvalidFormat(_))
    }

    /// The upstream code of the first API error, if this is an API error
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Error::Api { errors } => errors.first().map(|e| e.code.as_str()),
            _ => None,
        }
    }

    /// The upstream error list, if this is an API error
    pub fn api_errors(&self) -> Option<&[ApiErrorEntry]> {
        match self {
            Error::Api { errors } => Some(errors),
            _ => None,
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
