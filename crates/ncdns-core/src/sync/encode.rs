//! Numbered-parameter encoding for full-replace writes
//!
//! Item `n` (1-based) becomes `HostName{n}`, `RecordType{n}`, `Address{n}`,
//! `TTL{n}` and, for MX records only, `MXPref{n}`.

use crate::client::Params;
use crate::domain::DomainName;
use crate::record::{DEFAULT_MX_PREF, DnsRecord, MailForward, RecordType};

/// Parameters for `namecheap.domains.dns.setHosts`
///
/// `email_type` is the mail mode read alongside the hosts. The write replaces
/// it too, so it is sent back unchanged unless the new set holds an MX record.
pub fn encode_hosts(
    domain: &DomainName,
    records: &[DnsRecord],
    email_type: Option<&str>,
) -> Params {
    let mut params = Params::new().with("SLD", &domain.sld).with("TLD", &domain.tld);

    for (i, record) in records.iter().enumerate() {
        let n = i + 1;
        params.push(format!("HostName{n}"), Some(&record.name));
        params.push(format!("RecordType{n}"), Some(record.record_type));
        params.push(format!("Address{n}"), Some(&record.address));
        params.push(format!("TTL{n}"), Some(record.ttl));
        if record.record_type == RecordType::Mx {
            params.push(format!("MXPref{n}"), Some(record.mx_pref.unwrap_or(DEFAULT_MX_PREF)));
        }
    }

    // Without MX the registrar keeps its own mail service and ignores MX hosts
    let email_type = if records.iter().any(|r| r.record_type == RecordType::Mx) {
        Some("MX")
    } else {
        email_type.map(str::trim).filter(|t| !t.is_empty())
    };
    params.push("EmailType", email_type);

    params
}

/// Parameters for `namecheap.domains.dns.setEmailForwarding`
pub fn encode_forwards(domain: &DomainName, forwards: &[MailForward]) -> Params {
    let mut params = Params::new().with("DomainName", domain.registrable());

    for (i, forward) in forwards.iter().enumerate() {
        let n = i + 1;
        params.push(format!("MailBox{n}"), Some(forward.mailbox.trim()));
        params.push(format!("ForwardTo{n}"), Some(forward.forward_to.trim()));
    }

    params
}
