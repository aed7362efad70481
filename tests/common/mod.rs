//! Shared test doubles: scripted DNS and WHOIS transports.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use squatwatch::{
    BannerGrabber, Capabilities, DnsTransport, Enricher, LookupError, RecordKind, Resolver,
    ScanConfig, WhoisEnricher, WhoisTransport,
};

/// DNS answers keyed by domain; anything unscripted has no answer
#[derive(Default)]
pub struct ScriptedDns {
    answers: HashMap<String, HashMap<RecordKind, String>>,
    queries: AtomicUsize,
}

impl ScriptedDns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, domain: &str, kind: RecordKind, value: &str) -> Self {
        self.answers
            .entry(domain.to_string())
            .or_default()
            .insert(kind, value.to_string());
        self
    }

    /// NS plus A for `domain`
    pub fn registered(self, domain: &str, address: &str) -> Self {
        self.answer(domain, RecordKind::Ns, "ns1.parking.example.net")
            .answer(domain, RecordKind::A, address)
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsTransport for ScriptedDns {
    async fn query(&self, domain: &str, kind: RecordKind) -> Result<String, LookupError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.answers
            .get(domain)
            .and_then(|records| records.get(&kind))
            .cloned()
            .ok_or(LookupError::NoAnswer)
    }
}

/// Raw WHOIS responses keyed by domain; anything unscripted fails
#[derive(Default)]
pub struct ScriptedWhois {
    responses: HashMap<String, String>,
}

impl ScriptedWhois {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn response(mut self, domain: &str, raw: &str) -> Self {
        self.responses.insert(domain.to_string(), raw.to_string());
        self
    }
}

#[async_trait]
impl WhoisTransport for ScriptedWhois {
    async fn query(&self, domain: &str) -> Result<String, LookupError> {
        self.responses
            .get(domain)
            .cloned()
            .ok_or_else(|| LookupError::Whois("connection refused".to_string()))
    }
}

/// Config that wires no live backend
pub fn offline_config() -> ScanConfig {
    ScanConfig {
        concurrency: 4,
        capabilities: Capabilities::none(),
        ..Default::default()
    }
}

/// Enricher over the scripted transports
pub fn scripted_enricher(dns: Arc<ScriptedDns>, whois: ScriptedWhois) -> Enricher {
    Enricher::new(
        Resolver::new(dns, Duration::from_millis(200)),
        WhoisEnricher::new(Arc::new(whois), Duration::from_millis(200)),
        BannerGrabber::disabled(),
        Duration::from_secs(2),
    )
}
