//! Core data types for domain availability probing.
//!
//! This module defines the candidate, result and run types shared by the
//! registry, the protocol clients, the dispatcher and the CLI.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A bare name paired with one target TLD.
///
/// Both parts are trimmed and lowercased on construction and a leading dot
/// on the TLD is dropped, so `DomainCandidate::new("VerifAI", ".COM")`
/// yields `verifai.com`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainCandidate {
    name: String,
    tld: String,
}

impl DomainCandidate {
    /// Build a candidate from a bare name and a TLD.
    pub fn new(name: &str, tld: &str) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            tld: normalize_tld(tld),
        }
    }

    /// The bare name, without TLD.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The target TLD, without leading dot.
    pub fn tld(&self) -> &str {
        &self.tld
    }

    /// The fully-qualified domain string, `name.tld`.
    pub fn fqdn(&self) -> String {
        format!("{}.{}", self.name, self.tld)
    }
}

/// Lowercase a TLD and strip surrounding whitespace and a leading dot.
pub(crate) fn normalize_tld(tld: &str) -> String {
    tld.trim().trim_start_matches('.').to_lowercase()
}

/// Lookup protocol used for a TLD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "rdap")]
    Rdap,

    #[serde(rename = "whois")]
    Whois,
}

/// Three-state availability verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    /// The registry has no record of the domain
    Available,

    /// The domain is registered
    Taken,

    /// The lookup failed, timed out, or the response could not be classified
    Unknown,
}

impl Availability {
    /// Lowercase label used in CSV and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::Taken => "taken",
            Availability::Unknown => "unknown",
        }
    }
}

/// Registration details extracted from an RDAP domain object.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DomainInfo {
    /// The registrar that manages this domain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar: Option<String>,

    /// When the domain was first registered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,

    /// When the domain registration expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,

    /// Last update date of the domain record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<String>,

    /// Domain status codes (e.g., "client transfer prohibited")
    pub status: Vec<String>,

    /// Nameservers associated with the domain
    pub nameservers: Vec<String>,
}

/// Outcome of checking one (name, TLD) pair.
///
/// Exactly one of these is produced per pair; it is never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupResult {
    /// Fully-qualified domain that was checked (e.g., "verifai.com")
    pub domain: String,

    /// Target TLD without leading dot
    pub tld: String,

    /// Protocol used; `None` when the TLD is not in the registry
    pub protocol: Option<Protocol>,

    /// Availability verdict
    pub availability: Availability,

    /// Diagnostic for unknown verdicts: timeout, HTTP status, response snippet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,

    /// Registration details, only for taken RDAP lookups with detailed info on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<DomainInfo>,

    /// How long the lookup took
    #[serde(skip)]
    pub check_duration: Option<Duration>,
}

impl LookupResult {
    /// Build a result with a definite verdict and no diagnostic.
    pub fn new(
        domain: impl Into<String>,
        tld: impl Into<String>,
        protocol: Option<Protocol>,
        availability: Availability,
    ) -> Self {
        Self {
            domain: domain.into(),
            tld: tld.into(),
            protocol,
            availability,
            diagnostic: None,
            info: None,
            check_duration: None,
        }
    }

    /// Build an unknown result carrying a diagnostic.
    pub fn unknown(
        domain: impl Into<String>,
        tld: impl Into<String>,
        protocol: Option<Protocol>,
        diagnostic: impl Into<String>,
    ) -> Self {
        Self {
            diagnostic: Some(diagnostic.into()),
            ..Self::new(domain, tld, protocol, Availability::Unknown)
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.check_duration = Some(duration);
        self
    }

    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }

    pub fn is_taken(&self) -> bool {
        self.availability == Availability::Taken
    }

    pub fn is_unknown(&self) -> bool {
        self.availability == Availability::Unknown
    }
}

/// Ordered results of one invocation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Run {
    results: Vec<LookupResult>,
}

impl Run {
    pub fn new(results: Vec<LookupResult>) -> Self {
        Self { results }
    }

    pub fn push(&mut self, result: LookupResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &[LookupResult] {
        &self.results
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LookupResult> {
        self.results.iter()
    }

    pub fn available(&self) -> impl Iterator<Item = &LookupResult> {
        self.results.iter().filter(|r| r.is_available())
    }

    pub fn available_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_available()).count()
    }

    pub fn taken_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_taken()).count()
    }

    pub fn unknown_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_unknown()).count()
    }

    /// Consume the run and return it ordered by (TLD, domain) for display.
    pub fn sorted(mut self) -> Self {
        self.results
            .sort_by(|a, b| a.tld.cmp(&b.tld).then_with(|| a.domain.cmp(&b.domain)));
        self
    }
}

impl IntoIterator for Run {
    type Item = LookupResult;
    type IntoIter = std::vec::IntoIter<LookupResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl FromIterator<LookupResult> for Run {
    fn from_iter<I: IntoIterator<Item = LookupResult>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Configuration options for the dispatcher and protocol clients.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Maximum number of lookups in flight
    /// Default: 10, Range: 1-100
    pub concurrency: usize,

    /// Per-request bound for RDAP lookups
    /// Default: 8 seconds
    pub rdap_timeout: Duration,

    /// Per-exchange bound for WHOIS lookups
    /// Default: 8 seconds
    pub whois_timeout: Duration,

    /// Minimum spacing between request starts across all workers
    /// Default: zero (no pacing)
    pub request_delay: Duration,

    /// Whether to keep registration details on taken RDAP results
    /// Default: false
    pub detailed_info: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            rdap_timeout: Duration::from_secs(8),
            whois_timeout: Duration::from_secs(8),
            request_delay: Duration::ZERO,
            detailed_info: false,
        }
    }
}

impl CheckConfig {
    /// Set the number of concurrent lookups, capped to 1..=100.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, 100);
        self
    }

    /// Set the same timeout for both protocols.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.rdap_timeout = timeout;
        self.whois_timeout = timeout;
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_detailed_info(mut self, enabled: bool) -> Self {
        self.detailed_info = enabled;
        self
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Rdap => write!(f, "RDAP"),
            Protocol::Whois => write!(f, "WHOIS"),
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Availability::Available => write!(f, "AVAILABLE"),
            Availability::Taken => write!(f, "TAKEN"),
            Availability::Unknown => write!(f, "UNKNOWN"),
        }
    }
}
