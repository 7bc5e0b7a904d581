//! TLD registry: which protocol and endpoint serve each TLD.
//!
//! The registry is an immutable table built once at startup and shared by
//! reference. RDAP is used wherever the registry operator offers it; WHOIS
//! entries exist only for TLDs without a working RDAP service.

use crate::error::DomainScoutError;
use crate::protocols::whois::WhoisPatterns;
use crate::types::{normalize_tld, Protocol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Standard WHOIS port.
pub const WHOIS_PORT: u16 = 43;

/// TLDs checked when the caller does not name any.
pub const DEFAULT_TLDS: &[&str] = &["com", "ai", "app", "io", "co"];

/// Built-in RDAP base URLs, sourced from the IANA bootstrap file
/// (https://data.iana.org/rdap/dns.json). Requests go to `<base>/domain/<name>`.
const RDAP_ENDPOINTS: &[(&str, &str)] = &[
    ("com", "https://rdap.verisign.com/com/v1"),
    ("net", "https://rdap.verisign.com/net/v1"),
    ("org", "https://rdap.publicinterestregistry.org/rdap"),
    ("ai", "https://rdap.identitydigital.services/rdap"),
    ("app", "https://pubapi.registry.google/rdap"),
    ("dev", "https://pubapi.registry.google/rdap"),
    ("tech", "https://rdap.centralnic.com/tech"),
];

/// ccTLDs without RDAP support, served over WHOIS.
const WHOIS_SERVERS: &[(&str, &str)] = &[
    ("io", "whois.nic.io"),
    ("co", "whois.nic.co"),
    ("me", "whois.nic.me"),
];

/// A WHOIS server and the phrasing it uses.
#[derive(Debug, Clone, PartialEq)]
pub struct WhoisServer {
    pub host: String,
    pub port: u16,
    pub patterns: WhoisPatterns,
}

impl WhoisServer {
    /// A server on the standard port with the default phrase tables.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: WHOIS_PORT,
            patterns: WhoisPatterns::default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_patterns(mut self, patterns: WhoisPatterns) -> Self {
        self.patterns = patterns;
        self
    }
}

/// Where lookups for a TLD are sent.
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    /// RDAP base URL, without the trailing `/domain/` segment
    Rdap { base_url: String },

    /// WHOIS text-protocol server
    Whois(WhoisServer),
}

/// Registry entry for a single TLD.
#[derive(Debug, Clone, PartialEq)]
pub struct TldDescriptor {
    pub tld: String,
    pub endpoint: Endpoint,
}

impl TldDescriptor {
    pub fn rdap(tld: &str, base_url: impl Into<String>) -> Self {
        Self {
            tld: normalize_tld(tld),
            endpoint: Endpoint::Rdap {
                base_url: base_url.into(),
            },
        }
    }

    pub fn whois(tld: &str, server: WhoisServer) -> Self {
        Self {
            tld: normalize_tld(tld),
            endpoint: Endpoint::Whois(server),
        }
    }

    pub fn protocol(&self) -> Protocol {
        match self.endpoint {
            Endpoint::Rdap { .. } => Protocol::Rdap,
            Endpoint::Whois(_) => Protocol::Whois,
        }
    }

    /// Human-readable endpoint: the RDAP base URL or `host:port`.
    pub fn endpoint_display(&self) -> String {
        match &self.endpoint {
            Endpoint::Rdap { base_url } => base_url.clone(),
            Endpoint::Whois(server) => format!("{}:{}", server.host, server.port),
        }
    }
}

/// A `[registry.<tld>]` section from a configuration file.
///
/// Exactly one of `rdap` or `whois` must be set. Pattern lists are added to
/// the default WHOIS phrase tables rather than replacing them.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RegistryEntry {
    /// RDAP base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rdap: Option<String>,

    /// WHOIS server hostname
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois: Option<String>,

    /// WHOIS port (default 43)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Extra phrases meaning "not registered"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_patterns: Option<Vec<String>>,

    /// Extra fields that indicate a registration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taken_patterns: Option<Vec<String>>,
}

impl RegistryEntry {
    /// Turn the entry into a descriptor, rejecting ambiguous or empty entries.
    pub fn to_descriptor(&self, tld: &str) -> Result<TldDescriptor, DomainScoutError> {
        let tld = normalize_tld(tld);
        if tld.is_empty() || tld.contains('.') || tld.contains(' ') {
            return Err(DomainScoutError::config(format!(
                "Invalid TLD '{}' in registry",
                tld
            )));
        }

        match (&self.rdap, &self.whois) {
            (Some(base_url), None) => {
                let base_url = base_url.trim();
                if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
                    return Err(DomainScoutError::config(format!(
                        "RDAP endpoint for '{}' must be an http(s) URL, got '{}'",
                        tld, base_url
                    )));
                }
                if self.port.is_some()
                    || self.available_patterns.is_some()
                    || self.taken_patterns.is_some()
                {
                    return Err(DomainScoutError::config(format!(
                        "Registry entry '{}' sets WHOIS options on an RDAP endpoint",
                        tld
                    )));
                }
                Ok(TldDescriptor::rdap(&tld, base_url))
            }
            (None, Some(host)) => {
                let host = host.trim();
                if host.is_empty() {
                    return Err(DomainScoutError::config(format!(
                        "WHOIS host for '{}' cannot be empty",
                        tld
                    )));
                }
                let patterns = WhoisPatterns::default().extended(
                    self.available_patterns.as_deref().unwrap_or_default(),
                    self.taken_patterns.as_deref().unwrap_or_default(),
                );
                let server = WhoisServer::new(host)
                    .with_port(self.port.unwrap_or(WHOIS_PORT))
                    .with_patterns(patterns);
                Ok(TldDescriptor::whois(&tld, server))
            }
            (Some(_), Some(_)) => Err(DomainScoutError::config(format!(
                "Registry entry '{}' cannot set both 'rdap' and 'whois'",
                tld
            ))),
            (None, None) => Err(DomainScoutError::config(format!(
                "Registry entry '{}' must set either 'rdap' or 'whois'",
                tld
            ))),
        }
    }
}

/// Immutable TLD → descriptor table.
#[derive(Debug, Clone, Default)]
pub struct TldRegistry {
    entries: BTreeMap<String, TldDescriptor>,
}

impl TldRegistry {
    /// The built-in table.
    pub fn builtin() -> Self {
        let rdap = RDAP_ENDPOINTS
            .iter()
            .map(|(tld, url)| TldDescriptor::rdap(tld, *url));
        let whois = WHOIS_SERVERS
            .iter()
            .map(|(tld, host)| TldDescriptor::whois(tld, WhoisServer::new(*host)));

        Self::from_descriptors(rdap.chain(whois))
    }

    /// Build a registry from explicit descriptors. Later entries for the same
    /// TLD replace earlier ones.
    pub fn from_descriptors<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = TldDescriptor>,
    {
        let entries = descriptors
            .into_iter()
            .map(|d| (d.tld.clone(), d))
            .collect();
        Self { entries }
    }

    /// Add or replace entries from configuration file sections.
    pub fn with_overrides(
        mut self,
        overrides: &BTreeMap<String, RegistryEntry>,
    ) -> Result<Self, DomainScoutError> {
        for (tld, entry) in overrides {
            let descriptor = entry.to_descriptor(tld)?;
            tracing::debug!(
                tld = %descriptor.tld,
                protocol = %descriptor.protocol(),
                endpoint = %descriptor.endpoint_display(),
                "registry override"
            );
            self.entries.insert(descriptor.tld.clone(), descriptor);
        }
        Ok(self)
    }

    /// Look up the descriptor for a TLD (case-insensitive, leading dot ignored).
    pub fn resolve(&self, tld: &str) -> Result<&TldDescriptor, DomainScoutError> {
        let key = normalize_tld(tld);
        self.entries
            .get(&key)
            .ok_or_else(|| DomainScoutError::unsupported_tld(key))
    }

    pub fn contains(&self, tld: &str) -> bool {
        self.entries.contains_key(&normalize_tld(tld))
    }

    /// Supported TLDs in alphabetical order.
    pub fn tlds(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_descriptors_are_complete() {
        let registry = TldRegistry::builtin();
        assert_eq!(registry.len(), 10);

        for tld in registry.tlds() {
            let descriptor = registry.resolve(&tld).unwrap();
            assert!(!descriptor.endpoint_display().is_empty());
            assert!(matches!(
                descriptor.protocol(),
                Protocol::Rdap | Protocol::Whois
            ));
        }
    }

    #[test]
    fn test_builtin_protocol_split() {
        let registry = TldRegistry::builtin();
        for tld in ["com", "net", "org", "ai", "app", "dev", "tech"] {
            assert_eq!(registry.resolve(tld).unwrap().protocol(), Protocol::Rdap);
        }
        for tld in ["io", "co", "me"] {
            assert_eq!(registry.resolve(tld).unwrap().protocol(), Protocol::Whois);
        }
        assert_eq!(
            registry.resolve("io").unwrap().endpoint_display(),
            "whois.nic.io:43"
        );
    }

    #[test]
    fn test_default_tlds_are_supported() {
        let registry = TldRegistry::builtin();
        assert!(DEFAULT_TLDS.iter().all(|tld| registry.contains(tld)));
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let registry = TldRegistry::builtin();
        assert_eq!(registry.resolve(".COM").unwrap().tld, "com");
    }

    #[test]
    fn test_resolve_unsupported_tld() {
        let registry = TldRegistry::builtin();
        let err = registry.resolve("zzz").unwrap_err();
        assert!(matches!(err, DomainScoutError::UnsupportedTld { ref tld } if tld == "zzz"));
    }

    #[test]
    fn test_tlds_sorted() {
        let tlds = TldRegistry::builtin().tlds();
        let mut sorted = tlds.clone();
        sorted.sort();
        assert_eq!(tlds, sorted);
    }

    #[test]
    fn test_overrides_add_and_replace() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "xyz".to_string(),
            RegistryEntry {
                rdap: Some("https://rdap.centralnic.com/xyz".to_string()),
                ..Default::default()
            },
        );
        overrides.insert(
            "io".to_string(),
            RegistryEntry {
                whois: Some("whois.example.net".to_string()),
                port: Some(4343),
                available_patterns: Some(vec!["is free".to_string()]),
                ..Default::default()
            },
        );

        let registry = TldRegistry::builtin().with_overrides(&overrides).unwrap();
        assert_eq!(registry.len(), 11);
        assert_eq!(registry.resolve("xyz").unwrap().protocol(), Protocol::Rdap);

        let io = registry.resolve("io").unwrap();
        assert_eq!(io.endpoint_display(), "whois.example.net:4343");
        match &io.endpoint {
            Endpoint::Whois(server) => {
                assert!(server.patterns.available.contains(&"is free".to_string()));
                assert!(server.patterns.available.contains(&"no match".to_string()));
            }
            other => panic!("expected WHOIS endpoint, got {:?}", other),
        }
    }

    #[test]
    fn test_override_with_both_protocols_rejected() {
        let entry = RegistryEntry {
            rdap: Some("https://rdap.example".to_string()),
            whois: Some("whois.example".to_string()),
            ..Default::default()
        };
        assert!(entry.to_descriptor("ex").is_err());
    }

    #[test]
    fn test_override_without_protocol_rejected() {
        assert!(RegistryEntry::default().to_descriptor("ex").is_err());
    }

    #[test]
    fn test_override_rejects_non_http_rdap() {
        let entry = RegistryEntry {
            rdap: Some("rdap.example/v1".to_string()),
            ..Default::default()
        };
        assert!(entry.to_descriptor("ex").is_err());
    }
}
