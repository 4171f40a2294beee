//! Command-specific payload shapes
//!
//! Each struct mirrors one `CommandResponse` body after normalization. They
//! are crate-private; callers only see the model types they convert into.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::de;
use crate::error::{Error, Result};
use crate::record::{DEFAULT_TTL, DnsRecord, MailForward, RecordType};

/// Decode a normalized payload into a typed shape
pub(crate) fn decode<T: DeserializeOwned>(data: &Value, what: &str) -> Result<T> {
    T::deserialize(data).map_err(|e| Error::parse(format!("unexpected {what} payload: {e}")))
}

/// Fail if any result element reports the write as unsuccessful.
///
/// `Status="OK"` is necessary but some commands additionally carry
/// `IsSuccess`/`Updated` on their result element.
pub(crate) fn ensure_acknowledged(data: &Value, target: &str) -> Result<()> {
    let Some(results) = data.as_object() else {
        return Ok(());
    };
    for (name, result) in results {
        for flag in ["@_IsSuccess", "@_Updated", "@_Update"] {
            if result.get(flag) == Some(&Value::Bool(false)) {
                tracing::debug!("{} reported {}=false", name, &flag[2..]);
                return Err(Error::WriteRejected(target.to_string()));
            }
        }
    }
    Ok(())
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetHostsEnvelope {
    #[serde(rename = "DomainDNSGetHostsResult")]
    pub result: GetHostsResult,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetHostsResult {
    #[serde(rename = "@_Domain", default, deserialize_with = "de::string")]
    pub domain: String,
    #[serde(
        rename = "@_IsUsingOurDNS",
        default = "default_true",
        deserialize_with = "de::bool_lenient"
    )]
    pub is_using_our_dns: bool,
    #[serde(rename = "@_EmailType", default, deserialize_with = "de::opt_string")]
    pub email_type: Option<String>,
    #[serde(rename = "host", alias = "Host", default)]
    pub hosts: Vec<WireHost>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireHost {
    #[serde(rename = "@_HostId", default, deserialize_with = "de::opt_string")]
    pub host_id: Option<String>,
    #[serde(rename = "@_Name", deserialize_with = "de::string")]
    pub name: String,
    #[serde(rename = "@_Type", deserialize_with = "de::string")]
    pub record_type: String,
    #[serde(rename = "@_Address", default, deserialize_with = "de::string")]
    pub address: String,
    #[serde(rename = "@_TTL", default, deserialize_with = "de::opt_u32")]
    pub ttl: Option<u32>,
    #[serde(rename = "@_MXPref", default, deserialize_with = "de::opt_u32")]
    pub mx_pref: Option<u32>,
    #[serde(rename = "@_IsActive", default = "default_true", deserialize_with = "de::bool_lenient")]
    pub is_active: bool,
}

impl TryFrom<WireHost> for DnsRecord {
    type Error = Error;

    fn try_from(host: WireHost) -> Result<Self> {
        // An unknown type must not be dropped: the next full-replace write
        // would delete it upstream.
        let record_type: RecordType = host.record_type.parse().map_err(|_| {
            Error::parse(format!(
                "host '{}' has unsupported record type '{}'",
                host.name, host.record_type
            ))
        })?;

        let mx_pref = match record_type {
            RecordType::Mx => host.mx_pref,
            _ => None,
        };

        Ok(DnsRecord {
            host_id: host.host_id,
            name: host.name,
            record_type,
            address: host.address,
            ttl: host.ttl.unwrap_or(DEFAULT_TTL),
            mx_pref,
            is_active: host.is_active,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetForwardingEnvelope {
    #[serde(rename = "DomainEmailForwardingResult")]
    pub result: ForwardingResult,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForwardingResult {
    #[serde(rename = "Forward", default)]
    pub forwards: Vec<WireForward>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireForward {
    #[serde(rename = "@_mailbox", alias = "@_MailBox", deserialize_with = "de::string")]
    pub mailbox: String,
    #[serde(rename = "#text", default, deserialize_with = "de::string")]
    pub forward_to: String,
}

impl From<WireForward> for MailForward {
    fn from(forward: WireForward) -> Self {
        MailForward::new(forward.mailbox, forward.forward_to)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetNameserversEnvelope {
    #[serde(rename = "DomainDNSGetListResult")]
    pub result: NameserversResult,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NameserversResult {
    #[serde(rename = "@_Domain", default, deserialize_with = "de::string")]
    pub domain: String,
    #[serde(rename = "@_IsUsingOurDNS", default, deserialize_with = "de::bool_lenient")]
    pub is_using_our_dns: bool,
    #[serde(rename = "Nameserver", default, deserialize_with = "de::string_vec")]
    pub nameservers: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetLockEnvelope {
    #[serde(rename = "DomainGetRegistrarLockResult")]
    pub result: LockResult,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LockResult {
    #[serde(rename = "@_RegistrarLockStatus", deserialize_with = "de::bool_lenient")]
    pub locked: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DomainListEnvelope {
    #[serde(rename = "DomainGetListResult")]
    pub result: DomainListResult,
    #[serde(rename = "Paging", default)]
    pub paging: Option<WirePaging>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DomainListResult {
    #[serde(rename = "Domain", default)]
    pub domains: Vec<WireDomain>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireDomain {
    #[serde(rename = "@_ID", default, deserialize_with = "de::string")]
    pub id: String,
    #[serde(rename = "@_Name", deserialize_with = "de::string")]
    pub name: String,
    #[serde(rename = "@_User", default, deserialize_with = "de::string")]
    pub user: String,
    #[serde(rename = "@_Created", default, deserialize_with = "de::string")]
    pub created: String,
    #[serde(rename = "@_Expires", default, deserialize_with = "de::string")]
    pub expires: String,
    #[serde(rename = "@_IsExpired", default, deserialize_with = "de::bool_lenient")]
    pub is_expired: bool,
    #[serde(rename = "@_IsLocked", default, deserialize_with = "de::bool_lenient")]
    pub is_locked: bool,
    #[serde(rename = "@_AutoRenew", default, deserialize_with = "de::bool_lenient")]
    pub auto_renew: bool,
    #[serde(rename = "@_IsOurDNS", default, deserialize_with = "de::bool_lenient")]
    pub is_our_dns: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WirePaging {
    #[serde(rename = "TotalItems", default, deserialize_with = "de::opt_u32")]
    pub total_items: Option<u32>,
    #[serde(rename = "CurrentPage", default, deserialize_with = "de::opt_u32")]
    pub current_page: Option<u32>,
    #[serde(rename = "PageSize", default, deserialize_with = "de::opt_u32")]
    pub page_size: Option<u32>,
}
