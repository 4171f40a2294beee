//! Zone synchronization engine
//!
//! The registrar only offers full-replace writes for DNS hosts and mail
//! forwards. [`ZoneSync`] exposes single-item operations on top of them.
//!
//! ## Flow
//!
//! ```text
//!  caller ──► validate input ──► split domain
//!                                     │
//!                                     ▼
//!                         ┌──────────────────────┐
//!                         │ read  (getHosts)     │── error ──► abort, no write
//!                         └──────────────────────┘
//!                                     │
//!                                     ▼
//!                         ┌──────────────────────┐
//!                         │ compute (plan.rs)    │── NotFound/Duplicate ──► abort
//!                         └──────────────────────┘
//!                                     │
//!                                     ▼
//!                         ┌──────────────────────┐
//!                         │ write (setHosts)     │── error ──► reported as-is
//!                         └──────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! Read and write are two separate round trips and the registrar offers no
//! version token. A change made elsewhere between them is overwritten. No
//! compensating action is taken after a failed write: the registrar applies
//! the replace atomically or not at all.

pub mod encode;
pub mod plan;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::client::{ApiClient, Params};
use crate::domain::{DomainName, split};
use crate::error::Result;
use crate::record::{DnsRecord, DnsRecordInput, DnsRecordPatch, MailForward};
use crate::wire::payload::{self, GetForwardingEnvelope, GetHostsEnvelope};

/// Upstream command names used by the engine
pub mod commands {
    /// Read the host list
    pub const GET_HOSTS: &str = "namecheap.domains.dns.getHosts";
    /// Replace the host list
    pub const SET_HOSTS: &str = "namecheap.domains.dns.setHosts";
    /// Read mail forwards
    pub const GET_EMAIL_FORWARDING: &str = "namecheap.domains.dns.getEmailForwarding";
    /// Replace mail forwards
    pub const SET_EMAIL_FORWARDING: &str = "namecheap.domains.dns.setEmailForwarding";
}

/// Which collection a write replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncResource {
    /// DNS host records
    Hosts,
    /// Mail forwarding rules
    MailForwards,
}

/// Summary of a completed full-replace write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    /// Registrable domain that was written
    pub domain: String,
    /// Collection that was replaced
    pub resource: SyncResource,
    /// Items read before the write
    pub previous_count: usize,
    /// Items submitted in the write
    pub submitted_count: usize,
}

/// Host records as read, plus the mail mode the write must carry back
struct ZoneHosts {
    records: Vec<DnsRecord>,
    email_type: Option<String>,
}

/// Incremental DNS host and mail forward operations
#[derive(Debug, Clone)]
pub struct ZoneSync {
    client: Arc<ApiClient>,
}

impl ZoneSync {
    /// Create an engine over an authenticated client
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Current host records of a domain's zone
    pub async fn list_dns_records(&self, domain: &str) -> Result<Vec<DnsRecord>> {
        let domain = split(domain)?;
        Ok(self.fetch_hosts(&domain).await?.records)
    }

    /// Add one record, keeping every existing one
    pub async fn add_dns_record(&self, domain: &str, input: DnsRecordInput) -> Result<SyncOutcome> {
        input.validate()?;
        let domain = split(domain)?;

        let current = self.fetch_hosts(&domain).await?;
        let next = plan::compute_after_add(&current.records, input);
        self.store_hosts(&domain, &current, &next).await
    }

    /// Change the fields given in `patch` on the record with `host_id`
    pub async fn update_dns_record(
        &self,
        domain: &str,
        host_id: &str,
        patch: DnsRecordPatch,
    ) -> Result<SyncOutcome> {
        patch.validate()?;
        let domain = split(domain)?;

        let current = self.fetch_hosts(&domain).await?;
        let next = plan::compute_after_update(&current.records, host_id, &patch)?;
        self.store_hosts(&domain, &current, &next).await
    }

    /// Remove the record with `host_id`
    pub async fn delete_dns_record(&self, domain: &str, host_id: &str) -> Result<SyncOutcome> {
        let domain = split(domain)?;

        let current = self.fetch_hosts(&domain).await?;
        let next = plan::compute_after_delete(&current.records, host_id)?;
        self.store_hosts(&domain, &current, &next).await
    }

    /// Current mail forwards of a domain
    pub async fn list_mail_forwards(&self, domain: &str) -> Result<Vec<MailForward>> {
        let domain = split(domain)?;
        self.fetch_forwards(&domain).await
    }

    /// Add a forward for a mailbox that does not exist yet
    pub async fn add_mail_forward(
        &self,
        domain: &str,
        mailbox: &str,
        forward_to: &str,
    ) -> Result<SyncOutcome> {
        let forward = MailForward::new(mailbox.trim(), forward_to.trim());
        forward.validate()?;
        let domain = split(domain)?;

        let current = self.fetch_forwards(&domain).await?;
        let next = plan::compute_after_add_forward(&current, forward)?;
        self.store_forwards(&domain, current.len(), &next).await
    }

    /// Remove the forward for a mailbox (case-insensitive)
    pub async fn remove_mail_forward(&self, domain: &str, mailbox: &str) -> Result<SyncOutcome> {
        let domain = split(domain)?;

        let current = self.fetch_forwards(&domain).await?;
        let next = plan::compute_after_remove_forward(&current, mailbox)?;
        self.store_forwards(&domain, current.len(), &next).await
    }

    async fn fetch_hosts(&self, domain: &DomainName) -> Result<ZoneHosts> {
        if domain.had_subdomain() {
            debug!("Using zone {} for {}", domain, domain.full_domain);
        }

        let params = Params::new().with("SLD", &domain.sld).with("TLD", &domain.tld);
        let data = self.client.request_data(commands::GET_HOSTS, params).await?;
        let envelope: GetHostsEnvelope = payload::decode(&data, "getHosts")?;

        if !envelope.result.is_using_our_dns {
            warn!(
                "{} is not using the registrar's DNS; host records will have no effect until it does",
                domain
            );
        }

        let records = envelope
            .result
            .hosts
            .into_iter()
            .map(DnsRecord::try_from)
            .collect::<Result<Vec<_>>>()?;

        debug!("Read {} host records for {}", records.len(), domain);
        Ok(ZoneHosts {
            records,
            email_type: envelope.result.email_type,
        })
    }

    async fn store_hosts(
        &self,
        domain: &DomainName,
        current: &ZoneHosts,
        next: &[DnsRecord],
    ) -> Result<SyncOutcome> {
        let previous = current.records.len();
        let params = encode::encode_hosts(domain, next, current.email_type.as_deref());
        let data = self.client.post_data(commands::SET_HOSTS, params).await?;
        payload::ensure_acknowledged(&data, &domain.registrable())?;

        info!("Replaced host records for {}: {} -> {}", domain, previous, next.len());
        Ok(SyncOutcome {
            domain: domain.registrable(),
            resource: SyncResource::Hosts,
            previous_count: previous,
            submitted_count: next.len(),
        })
    }

    async fn fetch_forwards(&self, domain: &DomainName) -> Result<Vec<MailForward>> {
        let params = Params::new().with("DomainName", domain.registrable());
        let data = self.client.request_data(commands::GET_EMAIL_FORWARDING, params).await?;
        let envelope: GetForwardingEnvelope = payload::decode(&data, "getEmailForwarding")?;

        let forwards: Vec<MailForward> = envelope
            .result
            .forwards
            .into_iter()
            .map(MailForward::from)
            .collect();
        debug!("Read {} mail forwards for {}", forwards.len(), domain);
        Ok(forwards)
    }

    async fn store_forwards(
        &self,
        domain: &DomainName,
        previous: usize,
        next: &[MailForward],
    ) -> Result<SyncOutcome> {
        let params = encode::encode_forwards(domain, next);
        let data = self.client.post_data(commands::SET_EMAIL_FORWARDING, params).await?;
        payload::ensure_acknowledged(&data, &domain.registrable())?;

        info!("Replaced mail forwards for {}: {} -> {}", domain, previous, next.len());
        Ok(SyncOutcome {
            domain: domain.registrable(),
            resource: SyncResource::MailForwards,
            previous_count: previous,
            submitted_count: next.len(),
        })
    }
}
