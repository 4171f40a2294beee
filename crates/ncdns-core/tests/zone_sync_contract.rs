//! Contract Test: DNS host synchronization over full-replace writes
//!
//! Constraints verified:
//! - Every mutation reads the full host list, then writes the full new list
//! - Existing records survive an add, in order, with their values
//! - Nothing is written when the read fails or the target id is unknown
//! - A failed write is reported, never masked as success
//! - Invalid input never reaches the network
//! - The domain's mail mode is written back unless an MX record overrides it

mod common;

use common::*;
use ncdns_core::record::{DnsRecordInput, DnsRecordPatch, RecordType};
use ncdns_core::sync::{SyncResource, ZoneSync, commands};
use ncdns_core::traits::HttpMethod;
use ncdns_core::Error;

#[tokio::test]
async fn add_record_resubmits_existing_records() {
    let transport = ScriptedTransport::new(vec![
        get_hosts(&[host("1", "@", "A", "1.2.3.4", 1800)]),
        set_hosts_ok(),
    ]);
    let sync = ZoneSync::new(client_over(transport.clone()));

    let outcome = sync
        .add_dns_record(
            "example.com",
            DnsRecordInput::new("www", RecordType::A, "5.6.7.8").with_ttl(1800),
        )
        .await
        .expect("add succeeds");

    assert_eq!(outcome.domain, "example.com");
    assert_eq!(outcome.resource, SyncResource::Hosts);
    assert_eq!(outcome.previous_count, 1);
    assert_eq!(outcome.submitted_count, 2);

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, HttpMethod::Get);
    assert_eq!(requests[0].param("Command"), Some(commands::GET_HOSTS));
    assert_eq!(requests[0].param("SLD"), Some("example"));
    assert_eq!(requests[0].param("TLD"), Some("com"));

    let write = &requests[1];
    assert_eq!(write.method, HttpMethod::Post);
    assert_eq!(write.param("Command"), Some(commands::SET_HOSTS));
    assert_eq!(write.param("HostName1"), Some("@"));
    assert_eq!(write.param("Address1"), Some("1.2.3.4"));
    assert_eq!(write.param("HostName2"), Some("www"));
    assert_eq!(write.param("Address2"), Some("5.6.7.8"));
    assert_eq!(write.param("TTL2"), Some("1800"));
    assert_eq!(write.param("HostName3"), None);
}

#[tokio::test]
async fn host_write_keeps_mail_mode() {
    let transport = ScriptedTransport::new(vec![
        get_hosts(&[host("1", "@", "A", "1.2.3.4", 1800)]),
        set_hosts_ok(),
        get_hosts(&[host("1", "@", "A", "1.2.3.4", 1800)]),
        set_hosts_ok(),
    ]);
    let sync = ZoneSync::new(client_over(transport.clone()));

    sync.add_dns_record(
        "example.com",
        DnsRecordInput::new("www", RecordType::A, "5.6.7.8"),
    )
    .await
    .unwrap();
    sync.add_dns_record(
        "example.com",
        DnsRecordInput::new("@", RecordType::Mx, "mx.example.net"),
    )
    .await
    .unwrap();

    let writes = transport.writes();
    assert_eq!(writes[0].param("EmailType"), Some("FWD"));
    assert_eq!(writes[1].param("EmailType"), Some("MX"));
}

#[tokio::test]
async fn subdomain_input_targets_registrable_zone() {
    let transport = ScriptedTransport::new(vec![get_hosts(&[])]);
    let sync = ZoneSync::new(client_over(transport.clone()));

    let records = sync.list_dns_records("www.example.co.uk").await.unwrap();
    assert!(records.is_empty());

    let read = &transport.requests()[0];
    assert_eq!(read.param("SLD"), Some("example"));
    assert_eq!(read.param("TLD"), Some("co.uk"));
}

#[tokio::test]
async fn update_changes_only_target_record() {
    let transport = ScriptedTransport::new(vec![
        get_hosts(&[
            host("10", "@", "A", "1.2.3.4", 1800),
            host("11", "www", "CNAME", "example.com.", 300),
        ]),
        set_hosts_ok(),
    ]);
    let sync = ZoneSync::new(client_over(transport.clone()));

    let patch = DnsRecordPatch {
        address: Some("9.9.9.9".to_string()),
        ..Default::default()
    };
    sync.update_dns_record("example.com", "10", patch).await.unwrap();

    let write = &transport.writes()[0];
    assert_eq!(write.param("Address1"), Some("9.9.9.9"));
    assert_eq!(write.param("TTL1"), Some("1800"));
    assert_eq!(write.param("HostName2"), Some("www"));
    assert_eq!(write.param("RecordType2"), Some("CNAME"));
    assert_eq!(write.param("Address2"), Some("example.com."));
    assert_eq!(write.param("TTL2"), Some("300"));
}

#[tokio::test]
async fn delete_unknown_id_never_writes() {
    let transport =
        ScriptedTransport::new(vec![get_hosts(&[host("1", "@", "A", "1.2.3.4", 1800)])]);
    let sync = ZoneSync::new(client_over(transport.clone()));

    let err = sync.delete_dns_record("example.com", "999").await.unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(transport.call_count(), 1);
    assert!(transport.writes().is_empty());
}

#[tokio::test]
async fn update_unknown_id_never_writes() {
    let transport =
        ScriptedTransport::new(vec![get_hosts(&[host("1", "@", "A", "1.2.3.4", 1800)])]);
    let sync = ZoneSync::new(client_over(transport.clone()));

    let patch = DnsRecordPatch {
        ttl: Some(600),
        ..Default::default()
    };
    let err = sync.update_dns_record("example.com", "2", patch).await.unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert!(transport.writes().is_empty());
}

#[tokio::test]
async fn delete_removes_record_from_write() {
    let transport = ScriptedTransport::new(vec![
        get_hosts(&[
            host("1", "@", "A", "1.2.3.4", 1800),
            host("2", "old", "A", "1.2.3.5", 1800),
            host("3", "www", "A", "1.2.3.6", 1800),
        ]),
        set_hosts_ok(),
    ]);
    let sync = ZoneSync::new(client_over(transport.clone()));

    let outcome = sync.delete_dns_record("example.com", "2").await.unwrap();
    assert_eq!(outcome.submitted_count, 2);

    let write = &transport.writes()[0];
    assert_eq!(write.param("HostName1"), Some("@"));
    assert_eq!(write.param("HostName2"), Some("www"));
    assert_eq!(write.param("HostName3"), None);
}

#[tokio::test]
async fn failed_read_aborts_before_write() {
    let transport =
        ScriptedTransport::new(vec![error_response(&[("2019166", "Domain not found")])]);
    let sync = ZoneSync::new(client_over(transport.clone()));

    let err = sync
        .add_dns_record("example.com", DnsRecordInput::new("www", RecordType::A, "5.6.7.8"))
        .await
        .unwrap_err();

    assert_eq!(err.api_code(), Some("2019166"));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn transport_failure_on_read_aborts_before_write() {
    let transport = ScriptedTransport::new(vec![Scripted::Status(503)]);
    let sync = ZoneSync::new(client_over(transport.clone()));

    let err = sync.delete_dns_record("example.com", "1").await.unwrap_err();

    assert!(matches!(err, Error::Transport { status: Some(503), .. }));
    assert!(transport.writes().is_empty());
}

#[tokio::test]
async fn failed_write_is_surfaced() {
    let transport = ScriptedTransport::new(vec![
        get_hosts(&[host("1", "@", "A", "1.2.3.4", 1800)]),
        error_response(&[("2030166", "Domain is invalid"), ("3031510", "Backend error")]),
    ]);
    let sync = ZoneSync::new(client_over(transport.clone()));

    let err = sync
        .add_dns_record("example.com", DnsRecordInput::new("www", RecordType::A, "5.6.7.8"))
        .await
        .unwrap_err();

    let errors = err.api_errors().expect("api error");
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[1].code, "3031510");
    assert_eq!(transport.remaining(), 0);
}

#[tokio::test]
async fn unacknowledged_write_is_rejected() {
    let transport = ScriptedTransport::new(vec![
        get_hosts(&[]),
        ok_response(r#"<DomainDNSSetHostsResult Domain="example.com" IsSuccess="false" />"#),
    ]);
    let sync = ZoneSync::new(client_over(transport.clone()));

    let err = sync
        .add_dns_record("example.com", DnsRecordInput::new("@", RecordType::A, "1.2.3.4"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::WriteRejected(_)));
}

#[tokio::test]
async fn mx_records_carry_preference_and_email_type() {
    let transport = ScriptedTransport::new(vec![
        get_hosts(&[host("1", "@", "A", "1.2.3.4", 1800)]),
        set_hosts_ok(),
    ]);
    let sync = ZoneSync::new(client_over(transport.clone()));

    sync.add_dns_record(
        "example.com",
        DnsRecordInput::new("@", RecordType::Mx, "mx1.example.net").with_mx_pref(5),
    )
    .await
    .unwrap();

    let write = &transport.writes()[0];
    assert_eq!(write.param("MXPref1"), None);
    assert_eq!(write.param("RecordType2"), Some("MX"));
    assert_eq!(write.param("MXPref2"), Some("5"));
    assert_eq!(write.param("EmailType"), Some("MX"));
}

#[tokio::test]
async fn unknown_record_type_on_read_is_not_dropped() {
    let transport = ScriptedTransport::new(vec![get_hosts(&[
        host("1", "@", "A", "1.2.3.4", 1800),
        host("2", "@", "SSHFP", "1 1 abcdef", 1800),
    ])]);
    let sync = ZoneSync::new(client_over(transport.clone()));

    let err = sync
        .add_dns_record("example.com", DnsRecordInput::new("www", RecordType::A, "5.6.7.8"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Parse(_)));
    assert!(transport.writes().is_empty());
}

#[tokio::test]
async fn invalid_input_never_reaches_network() {
    let transport = ScriptedTransport::new(vec![]);
    let sync = ZoneSync::new(client_over(transport.clone()));

    let bad_ttl = DnsRecordInput::new("www", RecordType::A, "5.6.7.8").with_ttl(5);
    assert!(sync.add_dns_record("example.com", bad_ttl).await.unwrap_err().is_validation());

    let ok = DnsRecordInput::new("www", RecordType::A, "5.6.7.8");
    assert!(sync.add_dns_record("com", ok).await.unwrap_err().is_validation());

    let empty_patch = DnsRecordPatch::default();
    assert!(
        sync.update_dns_record("example.com", "1", empty_patch)
            .await
            .unwrap_err()
            .is_validation()
    );

    assert_eq!(transport.call_count(), 0);
}
