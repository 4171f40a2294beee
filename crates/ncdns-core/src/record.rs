//! DNS record and mail-forward model
//!
//! These are the typed shapes the synchronization engine computes over. Wire
//! decoding lives in [`crate::wire::payload`]; parameter encoding lives in
//! [`crate::sync::encode`].

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};

/// TTL applied when a record does not specify one
pub const DEFAULT_TTL: u32 = 1800;

/// MX preference applied when an MX record does not specify one
pub const DEFAULT_MX_PREF: u32 = 10;

/// Smallest TTL the registrar accepts
pub const MIN_TTL: u32 = 60;

/// Largest TTL the registrar accepts
pub const MAX_TTL: u32 = 60000;

/// DNS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// IPv4 address
    A,
    /// IPv6 address
    Aaaa,
    /// Canonical name
    Cname,
    /// Mail exchanger
    Mx,
    /// Free text
    Txt,
    /// Delegation
    Ns,
    /// Service locator
    Srv,
    /// Certification authority authorization
    Caa,
    /// Apex alias
    Alias,
    /// 302 URL redirect
    Url,
    /// 301 URL redirect
    Url301,
    /// Framed URL redirect
    Frame,
}

impl RecordType {
    /// Every supported type, in display order
    pub const ALL: [RecordType; 12] = [
        RecordType::A,
        RecordType::Aaaa,
        RecordType::Cname,
        RecordType::Mx,
        RecordType::Txt,
        RecordType::Ns,
        RecordType::Srv,
        RecordType::Caa,
        RecordType::Alias,
        RecordType::Url,
        RecordType::Url301,
        RecordType::Frame,
    ];

    /// Upper-case wire name
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Txt => "TXT",
            RecordType::Ns => "NS",
            RecordType::Srv => "SRV",
            RecordType::Caa => "CAA",
            RecordType::Alias => "ALIAS",
            RecordType::Url => "URL",
            RecordType::Url301 => "URL301",
            RecordType::Frame => "FRAME",
        }
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        RecordType::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| {
                let valid: Vec<&str> = RecordType::ALL.iter().map(|t| t.as_str()).collect();
                Error::validation(format!(
                    "invalid record type '{s}'; valid types: {}",
                    valid.join(", ")
                ))
            })
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in a domain's host list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsRecord {
    /// Upstream identifier; `None` for records not yet created
    pub host_id: Option<String>,
    /// Host label (`@` for the apex)
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Value or target
    pub address: String,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Priority, only meaningful for MX records
    pub mx_pref: Option<u32>,
    /// Upstream activation flag
    pub is_active: bool,
}

impl DnsRecord {
    /// Build a not-yet-created record from caller input
    pub fn from_input(input: DnsRecordInput) -> Self {
        let mx_pref = match input.record_type {
            RecordType::Mx => Some(input.mx_pref.unwrap_or(DEFAULT_MX_PREF)),
            _ => input.mx_pref,
        };
        Self {
            host_id: None,
            name: input.name,
            record_type: input.record_type,
            address: input.address,
            ttl: input.ttl.unwrap_or(DEFAULT_TTL),
            mx_pref,
            is_active: true,
        }
    }

    /// Whether this record carries the given upstream id
    pub fn has_id(&self, host_id: &str) -> bool {
        self.host_id.as_deref() == Some(host_id)
    }
}

/// Caller-supplied description of a new record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecordInput {
    /// Host label (`@` for the apex)
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Value or target
    pub address: String,
    /// TTL in seconds, [`DEFAULT_TTL`] when absent
    #[serde(default)]
    pub ttl: Option<u32>,
    /// MX priority, [`DEFAULT_MX_PREF`] for MX records when absent
    #[serde(default)]
    pub mx_pref: Option<u32>,
}

impl DnsRecordInput {
    /// Create a new record input
    pub fn new(
        name: impl Into<String>,
        record_type: RecordType,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type,
            address: address.into(),
            ttl: None,
            mx_pref: None,
        }
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Set the MX preference
    pub fn with_mx_pref(mut self, mx_pref: u32) -> Self {
        self.mx_pref = Some(mx_pref);
        self
    }

    /// Reject inputs the registrar would refuse
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_address(&self.address)?;
        if let Some(ttl) = self.ttl {
            validate_ttl(ttl)?;
        }
        if let Some(pref) = self.mx_pref {
            validate_mx_pref(pref)?;
        }
        Ok(())
    }
}

/// Partial update of an existing record; `None` fields keep their value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecordPatch {
    /// New host label
    #[serde(default)]
    pub name: Option<String>,
    /// New record type
    #[serde(default)]
    pub record_type: Option<RecordType>,
    /// New value
    #[serde(default)]
    pub address: Option<String>,
    /// New TTL
    #[serde(default)]
    pub ttl: Option<u32>,
    /// New MX preference
    #[serde(default)]
    pub mx_pref: Option<u32>,
}

impl DnsRecordPatch {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.record_type.is_none()
            && self.address.is_none()
            && self.ttl.is_none()
            && self.mx_pref.is_none()
    }

    /// Reject patches the registrar would refuse
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::validation("update specifies no fields to change"));
        }
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(address) = &self.address {
            validate_address(address)?;
        }
        if let Some(ttl) = self.ttl {
            validate_ttl(ttl)?;
        }
        if let Some(pref) = self.mx_pref {
            validate_mx_pref(pref)?;
        }
        Ok(())
    }

    /// Apply the patch to a record, leaving unspecified fields untouched
    pub fn apply_to(&self, record: &DnsRecord) -> DnsRecord {
        let mut updated = record.clone();
        if let Some(name) = &self.name {
            updated.name = name.clone();
        }
        if let Some(record_type) = self.record_type {
            updated.record_type = record_type;
        }
        if let Some(address) = &self.address {
            updated.address = address.clone();
        }
        if let Some(ttl) = self.ttl {
            updated.ttl = ttl;
        }
        if let Some(mx_pref) = self.mx_pref {
            updated.mx_pref = Some(mx_pref);
        }
        updated
    }
}

/// Mail forwarding rule scoped to a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailForward {
    /// Local part, e.g. `info`
    pub mailbox: String,
    /// Destination address
    pub forward_to: String,
}

impl MailForward {
    /// Create a mail forward
    pub fn new(mailbox: impl Into<String>, forward_to: impl Into<String>) -> Self {
        Self {
            mailbox: mailbox.into(),
            forward_to: forward_to.into(),
        }
    }

    /// Case-insensitive mailbox comparison
    pub fn is_mailbox(&self, mailbox: &str) -> bool {
        self.mailbox.eq_ignore_ascii_case(mailbox.trim())
    }

    /// Reject forwards the registrar would refuse
    pub fn validate(&self) -> Result<()> {
        let mailbox = self.mailbox.trim();
        if mailbox.is_empty() {
            return Err(Error::validation("mailbox cannot be empty"));
        }
        if mailbox.contains('@') || mailbox.chars().any(char::is_whitespace) {
            return Err(Error::validation(format!(
                "mailbox '{mailbox}' must be a bare local part without '@' or spaces"
            )));
        }
        let target = self.forward_to.trim();
        match target.split_once('@') {
            Some((local, host)) if !local.is_empty() && host.contains('.') => Ok(()),
            _ => Err(Error::validation(format!(
                "forward target '{target}' is not an email address"
            ))),
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("host name cannot be empty (use '@' for the apex)"));
    }
    Ok(())
}

fn validate_address(address: &str) -> Result<()> {
    if address.trim().is_empty() {
        return Err(Error::validation("record address cannot be empty"));
    }
    Ok(())
}

fn validate_ttl(ttl: u32) -> Result<()> {
    if !(MIN_TTL..=MAX_TTL).contains(&ttl) {
        return Err(Error::validation(format!(
            "TTL must be between {MIN_TTL} and {MAX_TTL} seconds. Got: {ttl}"
        )));
    }
    Ok(())
}

fn validate_mx_pref(pref: u32) -> Result<()> {
    if pref > u32::from(u16::MAX) {
        return Err(Error::validation(format!(
            "MX preference must be between 0 and 65535. Got: {pref}"
        )));
    }
    Ok(())
}
