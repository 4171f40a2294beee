//! Contract Test: Mail forward synchronization
//!
//! Constraints verified:
//! - Mailboxes are unique case-insensitively; duplicates are rejected before any write
//! - Removing an unknown mailbox is rejected before any write
//! - Writes resubmit the full forward list with numbered parameters

mod common;

use common::*;
use ncdns_core::record::MailForward;
use ncdns_core::sync::{SyncResource, ZoneSync, commands};
use ncdns_core::Error;

#[tokio::test]
async fn list_forwards_normalizes_cardinality() {
    let transport = ScriptedTransport::new(vec![
        get_forwards(&[]),
        get_forwards(&[("info", "me@example.net")]),
        get_forwards(&[("info", "me@example.net"), ("sales", "team@example.net")]),
    ]);
    let sync = ZoneSync::new(client_over(transport.clone()));

    assert!(sync.list_mail_forwards("example.com").await.unwrap().is_empty());
    assert_eq!(
        sync.list_mail_forwards("example.com").await.unwrap(),
        vec![MailForward::new("info", "me@example.net")]
    );
    assert_eq!(sync.list_mail_forwards("example.com").await.unwrap().len(), 2);

    let read = &transport.requests()[0];
    assert_eq!(read.param("Command"), Some(commands::GET_EMAIL_FORWARDING));
    assert_eq!(read.param("DomainName"), Some("example.com"));
}

#[tokio::test]
async fn add_forward_appends() {
    let transport = ScriptedTransport::new(vec![
        get_forwards(&[("info", "me@example.net")]),
        set_forwards_ok(),
    ]);
    let sync = ZoneSync::new(client_over(transport.clone()));

    let outcome = sync
        .add_mail_forward("mail.example.com", "sales", "team@example.net")
        .await
        .unwrap();

    assert_eq!(outcome.resource, SyncResource::MailForwards);
    assert_eq!(outcome.domain, "example.com");
    assert_eq!(outcome.submitted_count, 2);

    let write = &transport.calls_to(commands::SET_EMAIL_FORWARDING)[0];
    assert_eq!(write.param("DomainName"), Some("example.com"));
    assert_eq!(write.param("MailBox1"), Some("info"));
    assert_eq!(write.param("ForwardTo1"), Some("me@example.net"));
    assert_eq!(write.param("MailBox2"), Some("sales"));
    assert_eq!(write.param("ForwardTo2"), Some("team@example.net"));
}

#[tokio::test]
async fn duplicate_mailbox_rejected_without_write() {
    let transport = ScriptedTransport::new(vec![get_forwards(&[("Info", "me@example.net")])]);
    let sync = ZoneSync::new(client_over(transport.clone()));

    let err = sync
        .add_mail_forward("example.com", "INFO", "other@example.net")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DuplicateResource(_)));
    assert!(transport.writes().is_empty());
}

#[tokio::test]
async fn remove_forward_case_insensitive() {
    let transport = ScriptedTransport::new(vec![
        get_forwards(&[("info", "me@example.net"), ("sales", "team@example.net")]),
        set_forwards_ok(),
    ]);
    let sync = ZoneSync::new(client_over(transport.clone()));

    let outcome = sync.remove_mail_forward("example.com", "Sales").await.unwrap();
    assert_eq!(outcome.previous_count, 2);
    assert_eq!(outcome.submitted_count, 1);

    let write = &transport.writes()[0];
    assert_eq!(write.param("MailBox1"), Some("info"));
    assert_eq!(write.param("MailBox2"), None);
}

#[tokio::test]
async fn remove_unknown_mailbox_rejected_without_write() {
    let transport = ScriptedTransport::new(vec![get_forwards(&[("info", "me@example.net")])]);
    let sync = ZoneSync::new(client_over(transport.clone()));

    let err = sync.remove_mail_forward("example.com", "support").await.unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn invalid_forward_target_never_reaches_network() {
    let transport = ScriptedTransport::new(vec![]);
    let sync = ZoneSync::new(client_over(transport.clone()));

    let err = sync
        .add_mail_forward("example.com", "info", "not-an-address")
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(transport.call_count(), 0);
}
