//! Domain-level operations without merge logic
//!
//! Nameservers, registrar lock and the account's domain list are plain
//! request/response commands. They share the splitter and the client with
//! [`ZoneSync`](crate::sync::ZoneSync) but never read-then-write.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::{ApiClient, Params};
use crate::domain::split;
use crate::error::{Error, Result};
use crate::wire::payload::{
    self, DomainListEnvelope, GetLockEnvelope, GetNameserversEnvelope, WireDomain,
};

/// Upstream command names
pub mod commands {
    /// Read nameservers
    pub const GET_NAMESERVERS: &str = "namecheap.domains.dns.getList";
    /// Switch to the registrar's nameservers
    pub const SET_DEFAULT_NAMESERVERS: &str = "namecheap.domains.dns.setDefault";
    /// Switch to custom nameservers
    pub const SET_CUSTOM_NAMESERVERS: &str = "namecheap.domains.dns.setCustom";
    /// Read the registrar lock
    pub const GET_REGISTRAR_LOCK: &str = "namecheap.domains.getRegistrarLock";
    /// Change the registrar lock
    pub const SET_REGISTRAR_LOCK: &str = "namecheap.domains.setRegistrarLock";
    /// List the account's domains
    pub const LIST_DOMAINS: &str = "namecheap.domains.getList";
}

/// Most custom nameservers the registrar accepts
pub const MAX_CUSTOM_NAMESERVERS: usize = 12;

/// Smallest page the domain list accepts
pub const MIN_PAGE_SIZE: u32 = 10;

/// Largest page the domain list accepts
pub const MAX_PAGE_SIZE: u32 = 100;

/// Nameserver delegation of a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameserverInfo {
    /// Registrable domain
    pub domain: String,
    /// True when delegated to the registrar's own DNS
    pub is_using_our_dns: bool,
    /// Delegated nameservers
    pub nameservers: Vec<String>,
}

/// Registrar lock change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LockAction {
    /// Prevent transfers
    Lock,
    /// Allow transfers
    Unlock,
}

impl LockAction {
    /// Wire value of `LockAction`
    pub fn as_str(self) -> &'static str {
        match self {
            LockAction::Lock => "LOCK",
            LockAction::Unlock => "UNLOCK",
        }
    }
}

/// Registrar lock state of a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockStatus {
    /// Registrable domain
    pub domain: String,
    /// True when transfers are blocked
    pub locked: bool,
}

/// Paging and filtering for [`DomainAdmin::list_domains`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDomainsQuery {
    /// 1-based page number
    pub page: u32,
    /// Items per page, `10..=100`
    pub page_size: u32,
    /// Keyword filter on domain names
    #[serde(default)]
    pub search: Option<String>,
}

impl Default for ListDomainsQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
            search: None,
        }
    }
}

impl ListDomainsQuery {
    /// Reject values the registrar would refuse
    pub fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(Error::validation("page numbers start at 1"));
        }
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(Error::validation(format!(
                "page size must be between {MIN_PAGE_SIZE} and {MAX_PAGE_SIZE}. Got: {}",
                self.page_size
            )));
        }
        Ok(())
    }

    fn to_params(&self) -> Params {
        Params::new()
            .with("Page", self.page)
            .with("PageSize", self.page_size)
            .with_opt("SearchTerm", self.search.as_deref().map(str::trim))
    }
}

/// One domain in the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainSummary {
    /// Registrar identifier
    pub id: String,
    /// Domain name
    pub name: String,
    /// Owning user
    pub user: String,
    /// Registration date as reported
    pub created: String,
    /// Expiry date as reported
    pub expires: String,
    /// Registration has lapsed
    pub is_expired: bool,
    /// Registrar lock is on
    pub is_locked: bool,
    /// Auto-renewal is on
    pub auto_renew: bool,
    /// Delegated to the registrar's DNS
    pub is_our_dns: bool,
}

impl From<WireDomain> for DomainSummary {
    fn from(d: WireDomain) -> Self {
        Self {
            id: d.id,
            name: d.name,
            user: d.user,
            created: d.created,
            expires: d.expires,
            is_expired: d.is_expired,
            is_locked: d.is_locked,
            auto_renew: d.auto_renew,
            is_our_dns: d.is_our_dns,
        }
    }
}

/// One page of the domain list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainPage {
    /// Domains on this page
    pub domains: Vec<DomainSummary>,
    /// Domains across all pages
    pub total_items: u32,
    /// Page number
    pub current_page: u32,
    /// Page size
    pub page_size: u32,
}

/// Nameserver, lock and domain-list operations
#[derive(Debug, Clone)]
pub struct DomainAdmin {
    client: Arc<ApiClient>,
}

impl DomainAdmin {
    /// Create over an authenticated client
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Nameservers a domain is delegated to
    pub async fn get_nameservers(&self, domain: &str) -> Result<NameserverInfo> {
        let domain = split(domain)?;
        let params = Params::new().with("SLD", &domain.sld).with("TLD", &domain.tld);

        let data = self.client.request_data(commands::GET_NAMESERVERS, params).await?;
        let envelope: GetNameserversEnvelope = payload::decode(&data, "dns.getList")?;

        Ok(NameserverInfo {
            domain: domain.registrable(),
            is_using_our_dns: envelope.result.is_using_our_dns,
            nameservers: envelope.result.nameservers,
        })
    }

    /// Delegate a domain back to the registrar's nameservers
    pub async fn set_default_nameservers(&self, domain: &str) -> Result<()> {
        let domain = split(domain)?;
        let params = Params::new().with("SLD", &domain.sld).with("TLD", &domain.tld);

        let data = self.client.post_data(commands::SET_DEFAULT_NAMESERVERS, params).await?;
        payload::ensure_acknowledged(&data, &domain.registrable())?;

        info!("{} now uses the registrar's nameservers", domain);
        Ok(())
    }

    /// Delegate a domain to custom nameservers
    pub async fn set_custom_nameservers(&self, domain: &str, nameservers: &[String]) -> Result<()> {
        let nameservers = validate_nameservers(nameservers)?;
        let domain = split(domain)?;
        let params = Params::new()
            .with("SLD", &domain.sld)
            .with("TLD", &domain.tld)
            .with("Nameservers", nameservers.join(","));

        let data = self.client.post_data(commands::SET_CUSTOM_NAMESERVERS, params).await?;
        payload::ensure_acknowledged(&data, &domain.registrable())?;

        info!("{} delegated to {}", domain, nameservers.join(", "));
        Ok(())
    }

    /// Registrar lock state
    pub async fn get_registrar_lock(&self, domain: &str) -> Result<LockStatus> {
        let domain = split(domain)?;
        let params = Params::new().with("DomainName", domain.registrable());

        let data = self.client.request_data(commands::GET_REGISTRAR_LOCK, params).await?;
        let envelope: GetLockEnvelope = payload::decode(&data, "getRegistrarLock")?;

        Ok(LockStatus {
            domain: domain.registrable(),
            locked: envelope.result.locked,
        })
    }

    /// Lock or unlock a domain
    pub async fn set_registrar_lock(&self, domain: &str, action: LockAction) -> Result<LockStatus> {
        let domain = split(domain)?;
        let params = Params::new()
            .with("DomainName", domain.registrable())
            .with("LockAction", action.as_str());

        let data = self.client.post_data(commands::SET_REGISTRAR_LOCK, params).await?;
        payload::ensure_acknowledged(&data, &domain.registrable())?;

        info!("{} registrar lock: {}", domain, action.as_str());
        Ok(LockStatus {
            domain: domain.registrable(),
            locked: action == LockAction::Lock,
        })
    }

    /// One page of the account's domains
    pub async fn list_domains(&self, query: &ListDomainsQuery) -> Result<DomainPage> {
        query.validate()?;

        let data = self.client.request_data(commands::LIST_DOMAINS, query.to_params()).await?;
        let envelope: DomainListEnvelope = payload::decode(&data, "domains.getList")?;

        let domains: Vec<DomainSummary> = envelope
            .result
            .domains
            .into_iter()
            .map(DomainSummary::from)
            .collect();
        let paging = envelope.paging;

        Ok(DomainPage {
            total_items: paging
                .as_ref()
                .and_then(|p| p.total_items)
                .unwrap_or(domains.len() as u32),
            current_page: paging.as_ref().and_then(|p| p.current_page).unwrap_or(query.page),
            page_size: paging.as_ref().and_then(|p| p.page_size).unwrap_or(query.page_size),
            domains,
        })
    }

    /// Check that the credentials and client IP are accepted
    pub async fn verify_access(&self) -> Result<()> {
        let query = ListDomainsQuery {
            page: 1,
            page_size: MIN_PAGE_SIZE,
            search: None,
        };
        self.list_domains(&query).await.map(|_| ())
    }
}

fn validate_nameservers(nameservers: &[String]) -> Result<Vec<String>> {
    if nameservers.is_empty() || nameservers.len() > MAX_CUSTOM_NAMESERVERS {
        return Err(Error::validation(format!(
            "between 1 and {MAX_CUSTOM_NAMESERVERS} nameservers are required. Got: {}",
            nameservers.len()
        )));
    }

    nameservers
        .iter()
        .map(|ns| {
            // Nameservers are plain host names; reuse the label rules
            split(ns).map(|d| d.full_domain).map_err(|_| {
                Error::validation(format!(
                    "'{}' is not a valid nameserver host name",
                    ns.trim()
                ))
            })
        })
        .collect()
}
