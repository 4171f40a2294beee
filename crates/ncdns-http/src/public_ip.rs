// # Public IP Lookup
//
// Finds the caller's public address so it can be saved as the allow-listed
// `ClientIp`. Plain-text IP echo services are asked in order; the first
// valid answer wins.

use ncdns_core::{Error, Result};
use std::net::IpAddr;
use std::time::Duration;

/// Per-service timeout
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// IP echo services, asked in order
pub const DEFAULT_IP_SERVICES: &[&str] = &[
    "https://api.ipify.org",  // returns plain text IP
    "https://ifconfig.me/ip", // No rate limit documented
    "https://icanhazip.com",  // No rate limit documented
];

/// Ask the default services for the public address
pub async fn detect_public_ip() -> Result<IpAddr> {
    detect_public_ip_from(DEFAULT_IP_SERVICES).await
}

/// Ask the given services, in order, for the public address
pub async fn detect_public_ip_from<S: AsRef<str>>(services: &[S]) -> Result<IpAddr> {
    let client = reqwest::Client::builder()
        .timeout(LOOKUP_TIMEOUT)
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

    for service in services {
        let service = service.as_ref();
        match fetch_ip(&client, service).await {
            Ok(ip) => {
                tracing::debug!("Public IP {} reported by {}", ip, service);
                return Ok(ip);
            }
            Err(e) => tracing::warn!("IP lookup via {} failed: {}", service, e),
        }
    }

    Err(Error::transport(
        None,
        "could not determine public IP address; pass it explicitly",
    ))
}

async fn fetch_ip(client: &reqwest::Client, url: &str) -> Result<IpAddr> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::transport(None, format!("Request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::transport(Some(status.as_u16()), format!("HTTP error: {}", status)));
    }

    let text = response
        .text()
        .await
        .map_err(|e| Error::transport(None, format!("Failed to read response: {}", e)))?;

    parse_ip(&text)
}

fn parse_ip(text: &str) -> Result<IpAddr> {
    let text = text.trim();
    text.parse()
        .map_err(|_| Error::parse(format!("Invalid IP address: {}", text)))
}
