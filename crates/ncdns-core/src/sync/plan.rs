//! Pure set computations for full-replace writes
//!
//! Each function takes the complete current set and returns the complete
//! desired set, or fails without touching anything. Nothing here performs
//! I/O, so a failure here means no write is ever issued.

use crate::error::{Error, Result};
use crate::record::{DnsRecord, DnsRecordInput, DnsRecordPatch, MailForward};

/// Current records plus one new record appended at the end
pub fn compute_after_add(current: &[DnsRecord], input: DnsRecordInput) -> Vec<DnsRecord> {
    let mut next = current.to_vec();
    next.push(DnsRecord::from_input(input));
    next
}

/// Current records with the one carrying `host_id` patched in place
///
/// Order and every other record are preserved exactly.
pub fn compute_after_update(
    current: &[DnsRecord],
    host_id: &str,
    patch: &DnsRecordPatch,
) -> Result<Vec<DnsRecord>> {
    if !current.iter().any(|r| r.has_id(host_id)) {
        return Err(Error::not_found(format!("host record with id '{host_id}'")));
    }

    Ok(current
        .iter()
        .map(|record| {
            if record.has_id(host_id) {
                patch.apply_to(record)
            } else {
                record.clone()
            }
        })
        .collect())
}

/// Current records without the one carrying `host_id`
pub fn compute_after_delete(current: &[DnsRecord], host_id: &str) -> Result<Vec<DnsRecord>> {
    let next: Vec<DnsRecord> = current.iter().filter(|r| !r.has_id(host_id)).cloned().collect();

    if next.len() == current.len() {
        return Err(Error::not_found(format!("host record with id '{host_id}'")));
    }
    Ok(next)
}

/// Current forwards plus a new one, rejecting a mailbox that already exists
pub fn compute_after_add_forward(
    current: &[MailForward],
    forward: MailForward,
) -> Result<Vec<MailForward>> {
    if current.iter().any(|f| f.is_mailbox(&forward.mailbox)) {
        return Err(Error::duplicate(format!(
            "mail forward for mailbox '{}'",
            forward.mailbox
        )));
    }

    let mut next = current.to_vec();
    next.push(forward);
    Ok(next)
}

/// Current forwards without the given mailbox (case-insensitive)
pub fn compute_after_remove_forward(
    current: &[MailForward],
    mailbox: &str,
) -> Result<Vec<MailForward>> {
    let next: Vec<MailForward> = current
        .iter()
        .filter(|f| !f.is_mailbox(mailbox))
        .cloned()
        .collect();

    if next.len() == current.len() {
        return Err(Error::not_found(format!("mail forward for mailbox '{mailbox}'")));
    }
    Ok(next)
}
