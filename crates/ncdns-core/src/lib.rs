// # ncdns-core
//
// Core library for the ncdns registrar client.
//
// ## Architecture Overview
//
// - **domain**: Splits fully-qualified names into the `(SLD, TLD)` pair the registrar addresses zones by
// - **wire**: Normalizes the registrar's XML so repeatable elements are always sequences
// - **client**: Authenticated request/post over a pluggable `Transport`
// - **factory**: Lazily built, explicitly invalidated client cache over a `CredentialStore`
// - **sync**: `ZoneSync`, single-item DNS host and mail forward operations over full-replace writes
// - **domains**: `DomainAdmin`, nameserver, registrar lock and domain list commands
//
// ## Design Principles
//
// 1. **Library-First**: The binary only parses arguments and prints results
// 2. **No Ambient State**: Every operation receives its client explicitly
// 3. **Upstream Is Truth**: Sets are read fresh before every write, never cached
// 4. **Fail Before Writing**: Validation, `NotFound` and `DuplicateResource` abort before any write

pub mod client;
pub mod config;
pub mod domain;
pub mod domains;
pub mod error;
pub mod factory;
pub mod record;
pub mod store;
pub mod sync;
pub mod traits;
pub mod wire;

// Re-export core types for convenience
pub use client::{ApiClient, Params};
pub use config::{ClientConfig, Credentials, Endpoint};
pub use domain::{DomainName, split};
pub use domains::{DomainAdmin, ListDomainsQuery, LockAction};
pub use error::{ApiErrorEntry, ApiErrorKind, Error, Result};
pub use factory::ClientFactory;
pub use record::{DnsRecord, DnsRecordInput, DnsRecordPatch, MailForward, RecordType};
pub use store::{FileCredentialStore, MemoryCredentialStore};
pub use sync::{SyncOutcome, ZoneSync};
pub use traits::{CredentialStore, Transport};
pub use wire::ApiResponse;
