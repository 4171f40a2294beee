//! Contract Test: Client factory caching
//!
//! Constraints verified:
//! - Missing credentials fail with NotAuthenticated before any network call
//! - The client is built once and reused until invalidated
//! - Invalidation makes the next call re-read the credential store
//! - A logout that lands mid-build never leaves the old client cached
//! - The factory's timeout travels with every request

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use common::*;
use ncdns_core::config::{Credentials, SANDBOX_URL};
use ncdns_core::store::MemoryCredentialStore;
use ncdns_core::sync::ZoneSync;
use ncdns_core::traits::CredentialStore;
use ncdns_core::{ClientFactory, Error};
use tokio::sync::Notify;

/// Store that parks the first `credentials()` call until released
struct PausingStore {
    inner: MemoryCredentialStore,
    paused: AtomicBool,
    entered: Notify,
    release: Notify,
}

impl PausingStore {
    fn new(credentials: Credentials) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryCredentialStore::with_credentials(credentials),
            paused: AtomicBool::new(false),
            entered: Notify::new(),
            release: Notify::new(),
        })
    }
}

#[async_trait]
impl CredentialStore for PausingStore {
    async fn credentials(&self) -> Result<Option<Credentials>, Error> {
        let snapshot = self.inner.credentials().await?;
        if !self.paused.swap(true, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        Ok(snapshot)
    }

    async fn is_sandbox(&self) -> Result<bool, Error> {
        self.inner.is_sandbox().await
    }

    async fn save_credentials(&self, credentials: &Credentials) -> Result<(), Error> {
        self.inner.save_credentials(credentials).await
    }

    async fn set_sandbox(&self, sandbox: bool) -> Result<(), Error> {
        self.inner.set_sandbox(sandbox).await
    }

    async fn clear(&self) -> Result<(), Error> {
        self.inner.clear().await
    }
}

#[tokio::test]
async fn unauthenticated_fails_before_network() {
    let transport = ScriptedTransport::new(vec![]);
    let factory = ClientFactory::new(Arc::new(MemoryCredentialStore::new()), transport.clone());

    let err = factory.client().await.unwrap_err();

    assert!(matches!(err, Error::NotAuthenticated(_)));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn invalidation_picks_up_new_credentials() {
    let store = Arc::new(MemoryCredentialStore::with_credentials(test_credentials()).sandbox(true));
    let transport = ScriptedTransport::new(vec![get_hosts(&[]), get_hosts(&[])]);
    let factory = ClientFactory::new(store.clone(), transport.clone());

    let sync = ZoneSync::new(factory.client().await.unwrap());
    sync.list_dns_records("example.com").await.unwrap();

    store
        .save_credentials(&Credentials::new("bob", "other-key", "bob", "198.51.100.4"))
        .await
        .unwrap();

    // Still cached: the old client keeps its credentials
    assert_eq!(factory.client().await.unwrap().user_name(), "alice");

    factory.invalidate();
    let sync = ZoneSync::new(factory.client().await.unwrap());
    sync.list_dns_records("example.com").await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].url, SANDBOX_URL);
    assert_eq!(requests[0].param("ApiUser"), Some("alice"));
    assert_eq!(requests[1].param("ApiUser"), Some("bob"));
    assert_eq!(requests[1].param("ClientIp"), Some("198.51.100.4"));
}

#[tokio::test]
async fn logout_during_build_is_not_cached() {
    let store = PausingStore::new(test_credentials());
    let transport = ScriptedTransport::new(vec![]);
    let factory = Arc::new(ClientFactory::new(store.clone(), transport));

    let building = tokio::spawn({
        let factory = factory.clone();
        async move { factory.client().await }
    });

    // The build has read the old credentials and is parked
    store.entered.notified().await;
    factory.logout().await.unwrap();
    store.release.notify_one();

    let err = building.await.unwrap().unwrap_err();
    assert!(matches!(err, Error::NotAuthenticated(_)));
    assert!(!factory.is_cached());
    assert!(matches!(factory.client().await.unwrap_err(), Error::NotAuthenticated(_)));
}

#[tokio::test]
async fn factory_timeout_travels_with_requests() {
    let store = Arc::new(MemoryCredentialStore::with_credentials(test_credentials()));
    let transport = ScriptedTransport::new(vec![get_hosts(&[])]);
    let factory = ClientFactory::new(store, transport.clone()).with_timeout_secs(7);

    let sync = ZoneSync::new(factory.client().await.unwrap());
    sync.list_dns_records("example.com").await.unwrap();

    assert_eq!(transport.requests()[0].timeout, Some(Duration::from_secs(7)));
}
