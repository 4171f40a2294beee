// # Credential Store Trait
//
// Defines where API credentials and the sandbox preference live between
// invocations.
//
// ## Implementations
//
// - File-based: JSON profile with atomic writes (`FileCredentialStore`)
// - In-memory: environment-supplied credentials and tests (`MemoryCredentialStore`)

use async_trait::async_trait;

use crate::config::Credentials;

/// Trait for credential store implementations
///
/// The API client factory only ever calls [`credentials`](Self::credentials)
/// and [`is_sandbox`](Self::is_sandbox); the mutating methods exist for the
/// login/logout flow.
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Stored credentials, if any
    async fn credentials(&self) -> Result<Option<Credentials>, crate::Error>;

    /// Whether requests should go to the sandbox endpoint
    async fn is_sandbox(&self) -> Result<bool, crate::Error>;

    /// Replace the stored credentials
    async fn save_credentials(&self, credentials: &Credentials) -> Result<(), crate::Error>;

    /// Persist the sandbox preference
    async fn set_sandbox(&self, sandbox: bool) -> Result<(), crate::Error>;

    /// Forget credentials (logout); the sandbox preference is kept
    async fn clear(&self) -> Result<(), crate::Error>;
}
