//! Domain name splitting
//!
//! The registrar addresses DNS zones by registrable domain only, as an
//! `(SLD, TLD)` pair. [`split`] reduces any fully-qualified name to that pair,
//! silently discarding subdomain labels.
//!
//! Multi-part public suffixes are recognized from a short built-in table.
//! Anything not in the table is treated as a single-label TLD.

use serde::Serialize;

use crate::error::{Error, Result};

/// Multi-label public suffixes the registrar sells second-level names under.
const MULTI_PART_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "me.uk", "ltd.uk", "plc.uk", "net.uk", "sch.uk",
    "com.au", "net.au", "org.au", "id.au",
    "co.nz", "net.nz", "org.nz",
    "co.za", "org.za",
    "com.br", "net.br",
    "com.mx", "org.mx",
    "co.in", "net.in", "org.in", "firm.in", "gen.in", "ind.in",
    "com.cn", "net.cn", "org.cn",
    "com.tw", "org.tw",
    "com.sg", "com.ph", "com.pe", "com.ve", "com.co", "net.co", "nom.co",
    "co.jp", "com.es", "nom.es", "org.es",
    "com.de", "com.sc", "com.vc", "com.ag", "com.bz", "net.bz", "org.bz",
];

/// Registrable domain derived from a fully-qualified name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainName {
    /// Second-level label, e.g. `example`
    pub sld: String,
    /// Possibly multi-label suffix, e.g. `co.uk`
    pub tld: String,
    /// The name as given (lower-cased, trailing dot removed)
    pub full_domain: String,
}

impl DomainName {
    /// `sld.tld`, without any subdomain that was present in the input
    pub fn registrable(&self) -> String {
        format!("{}.{}", self.sld, self.tld)
    }

    /// True when the input carried labels left of the SLD
    pub fn had_subdomain(&self) -> bool {
        self.full_domain != self.registrable()
    }
}

impl std::fmt::Display for DomainName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.sld, self.tld)
    }
}

/// Split a fully-qualified domain into `(sld, tld)`.
///
/// - `example.com` → `example` / `com`
/// - `sub.example.com` → `example` / `com`
/// - `example.co.uk` → `example` / `co.uk`
///
/// Fails with [`Error::InvalidFormat`] when the input has no dot, has empty
/// labels, or contains characters that cannot appear in a host name.
pub fn split(domain: &str) -> Result<DomainName> {
    let normalized = domain.trim().trim_end_matches('.').to_ascii_lowercase();

    if normalized.is_empty() {
        return Err(Error::invalid_format("domain name cannot be empty"));
    }

    if normalized.len() > 253 {
        return Err(Error::invalid_format(format!(
            "domain name too long: {} chars (max 253)",
            normalized.len()
        )));
    }

    let labels: Vec<&str> = normalized.split('.').collect();
    if labels.len() < 2 {
        return Err(Error::invalid_format(format!(
            "'{domain}' has no TLD; expected a name such as example.com"
        )));
    }

    for label in &labels {
        validate_label(label, domain)?;
    }

    let n = labels.len();
    let (sld, tld) = if n >= 3 && is_multi_part_suffix(labels[n - 2], labels[n - 1]) {
        (labels[n - 3], format!("{}.{}", labels[n - 2], labels[n - 1]))
    } else {
        (labels[n - 2], labels[n - 1].to_string())
    };

    Ok(DomainName {
        sld: sld.to_string(),
        tld,
        full_domain: normalized.clone(),
    })
}

fn is_multi_part_suffix(second_last: &str, last: &str) -> bool {
    MULTI_PART_SUFFIXES.iter().any(|suffix| {
        suffix
            .split_once('.')
            .is_some_and(|(a, b)| a == second_last && b == last)
    })
}

fn validate_label(label: &str, domain: &str) -> Result<()> {
    if label.is_empty() {
        return Err(Error::invalid_format(format!(
            "'{domain}' has an empty label"
        )));
    }

    if label.len() > 63 {
        return Err(Error::invalid_format(format!(
            "label '{label}' is too long: {} chars (max 63)",
            label.len()
        )));
    }

    if !label.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
        return Err(Error::invalid_format(format!(
            "label '{label}' contains invalid characters"
        )));
    }

    if label.starts_with('-') || label.ends_with('-') {
        return Err(Error::invalid_format(format!(
            "label '{label}' cannot start or end with a hyphen"
        )));
    }

    Ok(())
}
