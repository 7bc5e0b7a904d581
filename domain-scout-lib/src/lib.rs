//! # Domain Scout Library
//!
//! Checks whether candidate domain names are available across a set of TLDs,
//! using RDAP where a registry offers it and WHOIS where it does not.
//!
//! Every (name, TLD) pair produces exactly one [`LookupResult`] with a
//! three-state [`Availability`]: `Available`, `Taken` or `Unknown`. Network
//! failures, timeouts and unsupported TLDs become `Unknown` with a diagnostic
//! instead of errors, so one bad lookup never aborts a run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_scout_lib::{CheckConfig, DomainChecker, TldRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let checker = DomainChecker::with_config(
//!         Arc::new(TldRegistry::builtin()),
//!         CheckConfig::default().with_concurrency(5),
//!     )?;
//!
//!     let names = vec!["verifai".to_string()];
//!     let tlds = vec!["com".to_string(), "io".to_string()];
//!     let run = checker.check_all(&names, &tlds).await;
//!
//!     for result in run.iter() {
//!         println!("{} - {}", result.domain, result.availability);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **RDAP**: HTTP lookups classified by status code and payload shape
//! - **WHOIS**: raw port-43 queries classified by per-server phrase tables
//! - **Bounded concurrency**: a fixed number of lookups in flight, optional pacing
//! - **Configurable registry**: built-in table extended from TOML config files

pub use checker::{cross_product, DomainChecker, UNSUPPORTED_TLD};
pub use concurrent::Pacer;
pub use config::{
    load_env_config, load_env_config_from, parse_timeout_string, ConfigManager, DefaultsConfig,
    EnvConfig, FileConfig,
};
pub use error::DomainScoutError;
pub use protocols::{
    classify_rdap_response, domain_url, extract_domain_info, Endpoint, RdapClient,
    RegistryEntry, TldDescriptor, TldRegistry, WhoisClient, WhoisPatterns, WhoisServer,
    DEFAULT_TLDS, WHOIS_PORT,
};
pub use types::{
    Availability, CheckConfig, DomainCandidate, DomainInfo, LookupResult, Protocol, Run,
};
pub use wordlist::{check_label, dedupe_names, is_valid_label, normalize_tlds, WordList};

pub mod protocols;

mod checker;
mod concurrent;
mod config;
mod error;
mod types;
mod wordlist;

pub type Result<T> = std::result::Result<T, DomainScoutError>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
