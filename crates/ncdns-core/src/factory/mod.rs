//! Cached API client factory
//!
//! The factory builds an [`ApiClient`] lazily from a [`CredentialStore`] and
//! keeps it until told otherwise. There is no process-wide instance: whoever
//! owns the factory owns the cache.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ncdns_core::factory::ClientFactory;
//!
//! let factory = ClientFactory::new(store, transport);
//!
//! let client = factory.client().await?;   // reads the store
//! let again = factory.client().await?;    // cached
//!
//! factory.invalidate();                   // next call re-reads the store
//! ```
//!
//! ## Thread Safety
//!
//! The cache sits behind a `RwLock`. Replacing it never affects a request
//! already in flight: callers hold their own `Arc<ApiClient>`. Each
//! invalidation bumps a generation count; a client built from credentials
//! read before the bump is never cached.

use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::client::ApiClient;
use crate::config::{ClientConfig, Endpoint};
use crate::error::{Error, Result};
use crate::traits::{CredentialStore, Transport};

/// Cached client plus the invalidation count it was built under
#[derive(Default)]
struct Cache {
    generation: u64,
    client: Option<Arc<ApiClient>>,
}

/// Builds and caches the authenticated client
pub struct ClientFactory {
    store: Arc<dyn CredentialStore>,
    transport: Arc<dyn Transport>,
    timeout_secs: Option<u64>,
    cache: RwLock<Cache>,
}

impl ClientFactory {
    /// Create a factory over a credential store and a transport
    pub fn new(store: Arc<dyn CredentialStore>, transport: Arc<dyn Transport>) -> Self {
        Self {
            store,
            transport,
            timeout_secs: None,
            cache: RwLock::new(Cache::default()),
        }
    }

    /// Per-request timeout applied by every client this factory builds
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Return the cached client, building it on first use
    ///
    /// A build that overlaps [`invalidate`](Self::invalidate) or
    /// [`logout`](Self::logout) is discarded and the store is read again.
    ///
    /// # Errors
    ///
    /// - `Error::NotAuthenticated` when the store holds no credentials
    /// - `Error::Config` when the stored credentials are invalid
    pub async fn client(&self) -> Result<Arc<ApiClient>> {
        loop {
            let generation = {
                let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
                if let Some(client) = &cache.client {
                    return Ok(client.clone());
                }
                cache.generation
            };

            let client = self.build().await?;

            let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
            if cache.generation != generation {
                debug!("Credentials changed while building the API client; rebuilding");
                continue;
            }
            // Another task may have filled the cache while the store was read.
            return Ok(cache.client.get_or_insert(client).clone());
        }
    }

    async fn build(&self) -> Result<Arc<ApiClient>> {
        let credentials = self.store.credentials().await?.ok_or_else(|| {
            Error::not_authenticated(
                "no credentials configured; run `ncdns auth login` or set NAMECHEAP_* variables",
            )
        })?;
        let endpoint = Endpoint::from_sandbox(self.store.is_sandbox().await?);

        let mut config = ClientConfig::new(endpoint);
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
        }

        let client = Arc::new(ApiClient::new(credentials, config, self.transport.clone())?);
        debug!("Built API client for {} ({:?})", client.user_name(), endpoint);
        Ok(client)
    }

    /// Drop the cached client
    pub fn invalidate(&self) {
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        cache.generation += 1;
        if cache.client.take().is_some() {
            debug!("API client cache invalidated");
        }
    }

    /// True when a client is cached
    pub fn is_cached(&self) -> bool {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).client.is_some()
    }

    /// Forget stored credentials and drop the cached client
    pub async fn logout(&self) -> Result<()> {
        self.store.clear().await?;
        self.invalidate();
        Ok(())
    }
}

impl std::fmt::Debug for ClientFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientFactory")
            .field("transport", &self.transport.transport_name())
            .field("cached", &self.is_cached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::store::MemoryCredentialStore;
    use crate::traits::TransportRequest;
    use async_trait::async_trait;

    struct NullTransport;

    #[async_trait]
    impl Transport for NullTransport {
        async fn send(&self, _request: &TransportRequest) -> Result<String> {
            Err(Error::transport(None, "offline"))
        }

        fn transport_name(&self) -> &'static str {
            "null"
        }
    }

    fn creds() -> Credentials {
        Credentials::new("alice", "k3y", "alice", "203.0.113.7")
    }

    #[tokio::test]
    async fn test_missing_credentials_is_not_authenticated() {
        let factory = ClientFactory::new(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(NullTransport),
        );

        let err = factory.client().await.unwrap_err();
        assert!(matches!(err, Error::NotAuthenticated(_)));
        assert!(!factory.is_cached());
    }

    #[tokio::test]
    async fn test_client_cached_until_invalidated() {
        let store = Arc::new(MemoryCredentialStore::with_credentials(creds()));
        let factory = ClientFactory::new(store.clone(), Arc::new(NullTransport));

        let first = factory.client().await.unwrap();
        let second = factory.client().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.endpoint(), Endpoint::Production);

        store.set_sandbox(true).await.unwrap();
        factory.invalidate();

        let third = factory.client().await.unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.endpoint(), Endpoint::Sandbox);
    }

    #[tokio::test]
    async fn test_timeout_reaches_built_client() {
        let store = Arc::new(MemoryCredentialStore::with_credentials(creds()));
        let factory = ClientFactory::new(store, Arc::new(NullTransport)).with_timeout_secs(0);

        // Zero is outside the accepted range, so the build must see it
        assert!(matches!(factory.client().await.unwrap_err(), Error::Config(_)));
    }

    #[tokio::test]
    async fn test_logout_clears_store_and_cache() {
        let store = Arc::new(MemoryCredentialStore::with_credentials(creds()));
        let factory = ClientFactory::new(store.clone(), Arc::new(NullTransport));

        factory.client().await.unwrap();
        factory.logout().await.unwrap();

        assert!(!factory.is_cached());
        assert!(store.credentials().await.unwrap().is_none());
        assert!(factory.client().await.is_err());
    }
}
