//! RDAP (Registration Data Access Protocol) client.
//!
//! RDAP answers with a standard status code and a JSON domain object, which
//! makes it the preferred protocol: 404 means the registry has no record,
//! 200 with a domain object means the name is registered.

use crate::error::DomainScoutError;
use crate::types::{Availability, DomainInfo, LookupResult, Protocol};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use std::time::{Duration, Instant};

const USER_AGENT: &str = concat!("domain-scout/", env!("CARGO_PKG_VERSION"));

/// RDAP client for checking domain availability.
#[derive(Clone)]
pub struct RdapClient {
    /// HTTP client for making RDAP requests
    http_client: reqwest::Client,
    /// Bound on one request/response exchange
    timeout: Duration,
}

impl RdapClient {
    /// Create a new RDAP client with the default 8 second timeout.
    pub fn new() -> Result<Self, DomainScoutError> {
        Self::with_timeout(Duration::from_secs(8))
    }

    /// Create a new RDAP client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainScoutError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                DomainScoutError::network_with_source(
                    "Failed to create RDAP HTTP client",
                    e.to_string(),
                )
            })?;

        Ok(Self {
            http_client,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Look up `domain` at the RDAP service rooted at `base_url`.
    ///
    /// Never fails: transport errors, timeouts, unexpected status codes and
    /// malformed bodies all produce an `Unknown` result with a diagnostic.
    /// A single attempt is made.
    pub async fn lookup(&self, domain: &str, tld: &str, base_url: &str) -> LookupResult {
        let start = Instant::now();
        let url = domain_url(base_url, domain);
        tracing::debug!(domain, %url, "RDAP request");

        let outcome = tokio::time::timeout(self.timeout, self.fetch(&url)).await;

        let result = match outcome {
            Ok(Ok((status, body))) => {
                let (availability, diagnostic, info) = classify_rdap_response(status, &body);
                tracing::debug!(
                    domain,
                    status,
                    verdict = %availability,
                    "RDAP response classified"
                );
                LookupResult {
                    diagnostic,
                    info,
                    ..LookupResult::new(domain, tld, Some(Protocol::Rdap), availability)
                }
            }
            Ok(Err(e)) if e.is_timeout() => self.timed_out(domain, tld),
            Ok(Err(e)) => {
                tracing::debug!(domain, error = %e, "RDAP request failed");
                LookupResult::unknown(
                    domain,
                    tld,
                    Some(Protocol::Rdap),
                    format!("request failed: {}", e),
                )
            }
            Err(_) => self.timed_out(domain, tld),
        };

        result.with_duration(start.elapsed())
    }

    fn timed_out(&self, domain: &str, tld: &str) -> LookupResult {
        tracing::debug!(domain, timeout = ?self.timeout, "RDAP request timed out");
        LookupResult::unknown(
            domain,
            tld,
            Some(Protocol::Rdap),
            format!("timeout after {:?}", self.timeout),
        )
    }

    /// Issue the GET and return the status code, plus the body for 200 OK.
    async fn fetch(&self, url: &str) -> Result<(u16, String), reqwest::Error> {
        let response = self
            .http_client
            .get(url)
            .header(ACCEPT, "application/rdap+json, application/json")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Ok((status.as_u16(), String::new()));
        }

        let body = response.text().await?;
        Ok((status.as_u16(), body))
    }
}

/// Build `<base>/domain/<domain>`, tolerating a trailing slash on the base.
pub fn domain_url(base_url: &str, domain: &str) -> String {
    format!("{}/domain/{}", base_url.trim_end_matches('/'), domain)
}

/// Map an RDAP status code and body to a verdict.
///
/// Returns the availability, a diagnostic for unknown verdicts, and the
/// registration details of taken domains.
pub fn classify_rdap_response(
    status: u16,
    body: &str,
) -> (Availability, Option<String>, Option<DomainInfo>) {
    match status {
        404 => (Availability::Available, None, None),
        200 => match serde_json::from_str::<serde_json::Value>(body) {
            Ok(json) if is_domain_object(&json) => {
                (Availability::Taken, None, Some(extract_domain_info(&json)))
            }
            Ok(_) => (
                Availability::Unknown,
                Some("unexpected RDAP payload: no domain object".to_string()),
                None,
            ),
            Err(e) => (
                Availability::Unknown,
                Some(format!("malformed RDAP JSON: {}", e)),
                None,
            ),
        },
        429 => (
            Availability::Unknown,
            Some("HTTP 429 (rate limited)".to_string()),
            None,
        ),
        code => (Availability::Unknown, Some(format!("HTTP {}", code)), None),
    }
}

/// A domain object declares `objectClassName: "domain"`; some servers omit
/// it but always send `ldhName`.
fn is_domain_object(json: &serde_json::Value) -> bool {
    json.get("objectClassName").and_then(|c| c.as_str()) == Some("domain")
        || json.get("ldhName").and_then(|n| n.as_str()).is_some()
}

/// Extract registration details from an RDAP domain object.
pub fn extract_domain_info(json: &serde_json::Value) -> DomainInfo {
    let mut info = DomainInfo::default();

    // Registrar: first entity carrying the "registrar" role
    if let Some(entities) = json.get("entities").and_then(|e| e.as_array()) {
        info.registrar = entities
            .iter()
            .filter(|entity| has_role(entity, "registrar"))
            .find_map(|entity| {
                extract_vcard_name(entity).or_else(|| extract_entity_identifier(entity))
            });
    }

    if let Some(events) = json.get("events").and_then(|e| e.as_array()) {
        for event in events {
            let action = event.get("eventAction").and_then(|a| a.as_str());
            let date = event.get("eventDate").and_then(|d| d.as_str());
            if let (Some(action), Some(date)) = (action, date) {
                match action {
                    "registration" => info.creation_date = Some(date.to_string()),
                    "expiration" => info.expiration_date = Some(date.to_string()),
                    "last changed" => info.updated_date = Some(date.to_string()),
                    _ => {}
                }
            }
        }
    }

    if let Some(statuses) = json.get("status").and_then(|s| s.as_array()) {
        info.status = statuses
            .iter()
            .filter_map(|s| s.as_str().map(String::from))
            .collect();
    }

    if let Some(nameservers) = json.get("nameservers").and_then(|ns| ns.as_array()) {
        info.nameservers = nameservers
            .iter()
            .filter_map(|ns| ns.get("ldhName").and_then(|n| n.as_str()))
            .map(|n| n.to_lowercase())
            .collect();
    }

    info
}

fn has_role(entity: &serde_json::Value, role: &str) -> bool {
    entity
        .get("roles")
        .and_then(|r| r.as_array())
        .map(|roles| roles.iter().any(|r| r.as_str() == Some(role)))
        .unwrap_or(false)
}

/// The `fn` property of an entity's jCard.
fn extract_vcard_name(entity: &serde_json::Value) -> Option<String> {
    entity
        .get("vcardArray")
        .and_then(|v| v.get(1))
        .and_then(|props| props.as_array())?
        .iter()
        .filter_map(|prop| prop.as_array())
        .find(|prop| prop.len() >= 4 && prop[0].as_str() == Some("fn"))
        .and_then(|prop| prop[3].as_str())
        .map(String::from)
}

/// Fallback registrar name: IANA id, then handle, then name.
fn extract_entity_identifier(entity: &serde_json::Value) -> Option<String> {
    entity
        .get("publicIds")
        .and_then(|ids| ids.get(0))
        .and_then(|id| id.get("identifier"))
        .and_then(|i| i.as_str())
        .or_else(|| entity.get("handle").and_then(|h| h.as_str()))
        .or_else(|| entity.get("name").and_then(|n| n.as_str()))
        .map(String::from)
}
