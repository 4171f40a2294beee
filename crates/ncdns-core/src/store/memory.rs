// # Memory Credential Store
//
// In-memory implementation of CredentialStore.
//
// ## Purpose
//
// Holds credentials supplied for a single invocation (environment
// variables) and backs tests. Nothing survives the process.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::Credentials;
use crate::traits::CredentialStore;

#[derive(Debug, Default)]
struct Profile {
    credentials: Option<Credentials>,
    sandbox: bool,
}

/// In-memory credential store
///
/// # Example
///
/// ```rust,no_run
/// use ncdns_core::config::Credentials;
/// use ncdns_core::store::MemoryCredentialStore;
/// use ncdns_core::traits::CredentialStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryCredentialStore::with_credentials(Credentials::new(
///         "alice", "k3y", "alice", "203.0.113.7",
///     ));
///
///     assert!(store.credentials().await?.is_some());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    inner: Arc<RwLock<Profile>>,
}

impl MemoryCredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds credentials
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Profile {
                credentials: Some(credentials),
                sandbox: false,
            })),
        }
    }

    /// Builder-style sandbox flag
    pub fn sandbox(self, sandbox: bool) -> Self {
        if let Ok(mut guard) = self.inner.try_write() {
            guard.sandbox = sandbox;
        }
        self
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn credentials(&self) -> Result<Option<Credentials>, Error> {
        Ok(self.inner.read().await.credentials.clone())
    }

    async fn is_sandbox(&self) -> Result<bool, Error> {
        Ok(self.inner.read().await.sandbox)
    }

    async fn save_credentials(&self, credentials: &Credentials) -> Result<(), Error> {
        self.inner.write().await.credentials = Some(credentials.clone());
        Ok(())
    }

    async fn set_sandbox(&self, sandbox: bool) -> Result<(), Error> {
        self.inner.write().await.sandbox = sandbox;
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        self.inner.write().await.credentials = None;
        Ok(())
    }
}
