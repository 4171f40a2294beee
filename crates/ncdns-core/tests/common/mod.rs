//! Test doubles and fixtures for contract tests
//!
//! `ScriptedTransport` replays canned responses in order and records every
//! request it was given, so tests can assert both on what the engine did
//! and on what it never sent.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ncdns_core::config::{ClientConfig, Credentials, Endpoint};
use ncdns_core::error::{Error, Result};
use ncdns_core::traits::{HttpMethod, Transport, TransportRequest};
use ncdns_core::ApiClient;

/// One canned transport outcome
#[derive(Debug, Clone)]
pub enum Scripted {
    /// HTTP 200 with this body
    Body(String),
    /// Non-2xx HTTP status
    Status(u16),
    /// Connection failure or timeout
    Offline,
}

/// A transport that replays scripted outcomes
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Every request sent so far
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests sent so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests sent with POST
    pub fn writes(&self) -> Vec<TransportRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == HttpMethod::Post)
            .collect()
    }

    /// Requests for one command
    pub fn calls_to(&self, command: &str) -> Vec<TransportRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.param("Command") == Some(command))
            .collect()
    }

    /// Outcomes not yet consumed
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &TransportRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Body(body)) => Ok(body),
            Some(Scripted::Status(code)) => Err(Error::transport(Some(code), "scripted status")),
            Some(Scripted::Offline) => Err(Error::transport(None, "scripted connection failure")),
            None => panic!(
                "ScriptedTransport ran out of responses at {:?}",
                request.param("Command")
            ),
        }
    }

    fn transport_name(&self) -> &'static str {
        "scripted"
    }
}

pub fn test_credentials() -> Credentials {
    Credentials::new("alice", "test-api-key", "alice", "203.0.113.7")
}

/// A sandbox client over the given transport
pub fn client_over(transport: Arc<ScriptedTransport>) -> Arc<ApiClient> {
    Arc::new(
        ApiClient::new(test_credentials(), ClientConfig::new(Endpoint::Sandbox), transport)
            .expect("test credentials are valid"),
    )
}

/// Wrap a `CommandResponse` body in a successful envelope
pub fn ok_response(command_response: &str) -> Scripted {
    Scripted::Body(format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<ApiResponse Status="OK" xmlns="http://api.namecheap.com/xml.response">
  <Errors />
  <Warnings />
  <RequestedCommand>test.command</RequestedCommand>
  <CommandResponse Type="test.command">{command_response}</CommandResponse>
  <Server>TEST</Server>
  <ExecutionTime>0.01</ExecutionTime>
</ApiResponse>"#
    ))
}

/// A failed envelope carrying `(code, message)` errors in order
pub fn error_response(errors: &[(&str, &str)]) -> Scripted {
    let entries: String = errors
        .iter()
        .map(|(code, msg)| format!(r#"<Error Number="{code}">{msg}</Error>"#))
        .collect();
    Scripted::Body(format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<ApiResponse Status="ERROR" xmlns="http://api.namecheap.com/xml.response">
  <Errors>{entries}</Errors>
  <Warnings />
  <RequestedCommand>test.command</RequestedCommand>
  <CommandResponse />
</ApiResponse>"#
    ))
}

/// A `<host>` element
pub fn host(id: &str, name: &str, record_type: &str, address: &str, ttl: u32) -> String {
    format!(
        r#"<host HostId="{id}" Name="{name}" Type="{record_type}" Address="{address}" MXPref="10" TTL="{ttl}" AssociatedAppTitle="" FriendlyName="" IsActive="true" IsDDNSEnabled="false" />"#
    )
}

/// `getHosts` response for `example.com` with the given `<host>` elements
pub fn get_hosts(hosts: &[String]) -> Scripted {
    ok_response(&format!(
        r#"<DomainDNSGetHostsResult Domain="example.com" EmailType="FWD" IsUsingOurDNS="true">{}</DomainDNSGetHostsResult>"#,
        hosts.concat()
    ))
}

/// Acknowledged `setHosts` response
pub fn set_hosts_ok() -> Scripted {
    ok_response(
        r#"<DomainDNSSetHostsResult Domain="example.com" IsSuccess="true"><Warnings /></DomainDNSSetHostsResult>"#,
    )
}

/// `getEmailForwarding` response with `(mailbox, target)` pairs
pub fn get_forwards(forwards: &[(&str, &str)]) -> Scripted {
    let entries: String = forwards
        .iter()
        .map(|(mailbox, to)| format!(r#"<Forward mailbox="{mailbox}">{to}</Forward>"#))
        .collect();
    ok_response(&format!(
        r#"<DomainEmailForwardingResult Domain="example.com">{entries}</DomainEmailForwardingResult>"#
    ))
}

/// Acknowledged `setEmailForwarding` response
pub fn set_forwards_ok() -> Scripted {
    ok_response(r#"<DomainEmailForwardingResult Domain="example.com" IsSuccess="true" />"#)
}
