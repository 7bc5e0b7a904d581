//! Protocol implementations for domain checking.
//!
//! RDAP and WHOIS clients, plus the registry that decides which one a TLD uses.

/// RDAP (Registration Data Access Protocol) implementation
pub mod rdap;

/// WHOIS protocol implementation
pub mod whois;

/// TLD registry mappings
pub mod registry;

pub use rdap::{classify_rdap_response, domain_url, extract_domain_info, RdapClient};
pub use registry::{
    Endpoint, RegistryEntry, TldDescriptor, TldRegistry, WhoisServer, DEFAULT_TLDS, WHOIS_PORT,
};
pub use whois::{WhoisClient, WhoisPatterns};
