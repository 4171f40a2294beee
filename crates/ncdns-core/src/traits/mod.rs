//! Core traits for the registrar client
//!
//! This module defines the abstract interfaces that implementations plug into.
//!
//! - [`Transport`]: Perform one HTTP exchange
//! - [`CredentialStore`]: Persist credentials and the sandbox preference

pub mod credential_store;
pub mod transport;

pub use credential_store::CredentialStore;
pub use transport::{HttpMethod, Transport, TransportRequest};
