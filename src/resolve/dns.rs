//! DNS transport seam and its trust-dns implementation.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use trust_dns_resolver::config::*;
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::TokioAsyncResolver;

use crate::error::LookupError;

/// Record types the resolver asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Ns,
    A,
    Aaaa,
    Mx,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Ns => "NS",
            RecordKind::A => "A",
            RecordKind::Aaaa => "AAAA",
            RecordKind::Mx => "MX",
        };
        f.write_str(name)
    }
}

/// Answers a single query with the first record's value.
///
/// Host names (NS, MX exchange) come back lowercased without the trailing
/// root dot. No answer is `Err(LookupError::NoAnswer)`.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn query(&self, domain: &str, kind: RecordKind) -> Result<String, LookupError>;
}

/// [`DnsTransport`] backed by the trust-dns async resolver
pub struct TrustDnsTransport {
    resolver: TokioAsyncResolver,
}

impl TrustDnsTransport {
    /// Single attempt per query, bounded by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 1;
        let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), opts);
        Self { resolver }
    }
}

#[async_trait]
impl DnsTransport for TrustDnsTransport {
    async fn query(&self, domain: &str, kind: RecordKind) -> Result<String, LookupError> {
        let first = match kind {
            RecordKind::Ns => self
                .resolver
                .ns_lookup(domain)
                .await
                .map_err(map_resolve_error)?
                .iter()
                .next()
                .map(|ns| host_name(&ns.to_string())),
            RecordKind::A => self
                .resolver
                .ipv4_lookup(domain)
                .await
                .map_err(map_resolve_error)?
                .iter()
                .next()
                .map(|a| a.to_string()),
            RecordKind::Aaaa => self
                .resolver
                .ipv6_lookup(domain)
                .await
                .map_err(map_resolve_error)?
                .iter()
                .next()
                .map(|aaaa| aaaa.to_string()),
            RecordKind::Mx => self
                .resolver
                .mx_lookup(domain)
                .await
                .map_err(map_resolve_error)?
                .iter()
                .next()
                .map(|mx| host_name(&mx.exchange().to_string())),
        };

        first.ok_or(LookupError::NoAnswer)
    }
}

fn host_name(name: &str) -> String {
    name.trim_end_matches('.').to_lowercase()
}

fn map_resolve_error(err: ResolveError) -> LookupError {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => LookupError::NoAnswer,
        ResolveErrorKind::Timeout => LookupError::Timeout,
        _ => LookupError::Dns(err.to_string()),
    }
}
