//! Domain checker: routes each (name, TLD) pair to the right protocol.
//!
//! The checker owns one RDAP client, one WHOIS client and a shared reference
//! to the TLD registry. Every pair it is given produces exactly one
//! `LookupResult`; nothing that goes wrong during a lookup escapes as an error.

use crate::concurrent::Pacer;
use crate::error::DomainScoutError;
use crate::protocols::registry::{Endpoint, TldRegistry};
use crate::protocols::{RdapClient, WhoisClient};
use crate::types::{CheckConfig, DomainCandidate, LookupResult, Run};
use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;

/// Diagnostic attached to pairs whose TLD is not in the registry.
pub const UNSUPPORTED_TLD: &str = "unsupported TLD";

/// Main domain checker that dispatches lookups to RDAP or WHOIS.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use domain_scout_lib::{DomainCandidate, DomainChecker, TldRegistry};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let checker = DomainChecker::new(Arc::new(TldRegistry::builtin()))?;
///     let result = checker.check(&DomainCandidate::new("verifai", "io")).await;
///     println!("{}: {}", result.domain, result.availability);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct DomainChecker {
    /// TLD → protocol table, shared and never mutated
    registry: Arc<TldRegistry>,
    /// Configuration settings for this checker instance
    config: CheckConfig,
    rdap_client: RdapClient,
    whois_client: WhoisClient,
    /// Spaces request starts across all concurrent lookups
    pacer: Arc<Pacer>,
}

impl DomainChecker {
    /// Create a checker with the default configuration.
    pub fn new(registry: Arc<TldRegistry>) -> Result<Self, DomainScoutError> {
        Self::with_config(registry, CheckConfig::default())
    }

    /// Create a checker with custom configuration.
    ///
    /// Fails only if the HTTP client cannot be built.
    pub fn with_config(
        registry: Arc<TldRegistry>,
        config: CheckConfig,
    ) -> Result<Self, DomainScoutError> {
        let rdap_client = RdapClient::with_timeout(config.rdap_timeout)?;
        let whois_client = WhoisClient::with_timeout(config.whois_timeout);
        let pacer = Arc::new(Pacer::new(config.request_delay));

        Ok(Self {
            registry,
            config,
            rdap_client,
            whois_client,
            pacer,
        })
    }

    /// Check one candidate.
    ///
    /// 1. Resolve the TLD; an unsupported TLD yields `Unknown` with the
    ///    diagnostic "unsupported TLD".
    /// 2. Dispatch `name.tld` to the RDAP or WHOIS client.
    /// 3. Return the client's result as is.
    pub async fn check(&self, candidate: &DomainCandidate) -> LookupResult {
        let domain = candidate.fqdn();
        let tld = candidate.tld();

        let descriptor = match self.registry.resolve(tld) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                tracing::debug!(%domain, error = %e, "skipping lookup");
                return LookupResult::unknown(domain, tld, None, UNSUPPORTED_TLD);
            }
        };

        self.pacer.wait().await;

        let mut result = match &descriptor.endpoint {
            Endpoint::Rdap { base_url } => self.rdap_client.lookup(&domain, tld, base_url).await,
            Endpoint::Whois(server) => self.whois_client.lookup(&domain, tld, server).await,
        };

        if !self.config.detailed_info {
            result.info = None;
        }
        result
    }

    /// Check `name.tld`.
    pub async fn check_name(&self, name: &str, tld: &str) -> LookupResult {
        self.check(&DomainCandidate::new(name, tld)).await
    }

    /// Check every name against every TLD.
    ///
    /// Results come back in submission order (name-major), one per pair.
    pub async fn check_all(&self, names: &[String], tlds: &[String]) -> Run {
        self.check_candidates(&cross_product(names, tlds)).await
    }

    /// Check a list of candidates with at most `concurrency` lookups in
    /// flight, keeping submission order.
    pub async fn check_candidates(&self, candidates: &[DomainCandidate]) -> Run {
        stream::iter(candidates)
            .map(|candidate| self.check(candidate))
            .buffered(self.config.concurrency)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect()
    }

    /// Check candidates and yield results as they complete.
    ///
    /// Completion order differs from submission order; callers that need a
    /// stable order should sort the collected `Run`.
    pub fn check_stream(
        &self,
        candidates: Vec<DomainCandidate>,
    ) -> Pin<Box<dyn Stream<Item = LookupResult> + Send + '_>> {
        let stream = stream::iter(candidates)
            .map(move |candidate| async move { self.check(&candidate).await })
            .buffer_unordered(self.config.concurrency);

        Box::pin(stream)
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    pub fn registry(&self) -> &TldRegistry {
        &self.registry
    }
}

/// Pair every name with every TLD, name-major.
pub fn cross_product(names: &[String], tlds: &[String]) -> Vec<DomainCandidate> {
    names
        .iter()
        .flat_map(|name| tlds.iter().map(move |tld| DomainCandidate::new(name, tld)))
        .collect()
}
