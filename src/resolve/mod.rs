//! Best-effort enrichment of a candidate.
//!
//! Each lookup is a single attempt bounded by its own timeout and by the
//! candidate's overall deadline, whichever comes first. A failed lookup
//! leaves its field absent; nothing here returns an error to the caller.
//!
//! ```text
//! NS ──ok──▶ A ┐
//!            AAAA ├─▶ WHOIS (if NS or A), banners (if enabled)
//!            MX ┘
//! ```

pub mod banner;
pub mod dns;
pub mod whois;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use crate::config::ScanConfig;
use crate::error::LookupError;

pub use dns::{DnsTransport, RecordKind, TrustDnsTransport};
pub use whois::{parse_registration_dates, TcpWhoisTransport, WhoisRecord, WhoisTransport};

/// DNS answers for one candidate. Absent means no answer or a failed query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionRecord {
    pub ns: Option<String>,
    pub a: Option<String>,
    pub aaaa: Option<String>,
    pub mx: Option<String>,
}

impl ResolutionRecord {
    /// True when no record type answered
    pub fn is_empty(&self) -> bool {
        self.ns.is_none() && self.a.is_none() && self.aaaa.is_none() && self.mx.is_none()
    }

    /// Whether the candidate looks registered enough to be worth a WHOIS call
    pub fn is_registered(&self) -> bool {
        self.ns.is_some() || self.a.is_some()
    }
}

/// Everything learned about one candidate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrichment {
    pub dns: ResolutionRecord,
    pub whois: WhoisRecord,
    /// Country of the `a` address; no geolocation backend ships with the crate
    pub country: Option<String>,
    pub http_banner: Option<String>,
    pub smtp_banner: Option<String>,
}

/// Run `fut` until the earlier of `deadline` and `limit` from now.
async fn bounded<T, F>(deadline: Instant, limit: Duration, fut: F) -> Result<T, LookupError>
where
    F: Future<Output = Result<T, LookupError>>,
{
    let until = deadline.min(Instant::now() + limit);
    timeout_at(until, fut).await.map_err(|_| LookupError::Timeout)?
}

/// NS-gated DNS lookups
pub struct Resolver {
    transport: Option<Arc<dyn DnsTransport>>,
    query_timeout: Duration,
}

impl Resolver {
    pub fn new(transport: Arc<dyn DnsTransport>, query_timeout: Duration) -> Self {
        Self {
            transport: Some(transport),
            query_timeout,
        }
    }

    /// A resolver that answers every candidate with an empty record
    pub fn disabled() -> Self {
        Self {
            transport: None,
            query_timeout: Duration::ZERO,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        if config.capabilities.dns {
            Self::new(
                Arc::new(TrustDnsTransport::new(config.dns_timeout)),
                config.dns_timeout,
            )
        } else {
            warn!("DNS lookups disabled, every candidate will come back empty");
            Self::disabled()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// NS first; A, AAAA and MX only if NS answered.
    pub async fn resolve(&self, domain: &str, deadline: Instant) -> ResolutionRecord {
        let Some(transport) = self.transport.as_deref() else {
            return ResolutionRecord::default();
        };

        let Some(ns) = self.lookup(transport, domain, RecordKind::Ns, deadline).await else {
            return ResolutionRecord::default();
        };

        let (a, aaaa, mx) = tokio::join!(
            self.lookup(transport, domain, RecordKind::A, deadline),
            self.lookup(transport, domain, RecordKind::Aaaa, deadline),
            self.lookup(transport, domain, RecordKind::Mx, deadline),
        );

        ResolutionRecord {
            ns: Some(ns),
            a,
            aaaa,
            mx,
        }
    }

    async fn lookup(
        &self,
        transport: &dyn DnsTransport,
        domain: &str,
        kind: RecordKind,
        deadline: Instant,
    ) -> Option<String> {
        match bounded(deadline, self.query_timeout, transport.query(domain, kind)).await {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(domain, record = %kind, error = %e, "DNS lookup failed");
                None
            }
        }
    }
}

/// Registration dates for candidates that resolve
pub struct WhoisEnricher {
    transport: Option<Arc<dyn WhoisTransport>>,
    query_timeout: Duration,
}

impl WhoisEnricher {
    pub fn new(transport: Arc<dyn WhoisTransport>, query_timeout: Duration) -> Self {
        Self {
            transport: Some(transport),
            query_timeout,
        }
    }

    pub fn disabled() -> Self {
        Self {
            transport: None,
            query_timeout: Duration::ZERO,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        if config.capabilities.whois {
            Self::new(
                Arc::new(TcpWhoisTransport::new(config.whois_timeout)),
                config.whois_timeout,
            )
        } else {
            Self::disabled()
        }
    }

    /// Empty unless `record` has NS or A; failures leave both dates absent.
    pub async fn enrich(
        &self,
        domain: &str,
        record: &ResolutionRecord,
        deadline: Instant,
    ) -> WhoisRecord {
        let Some(transport) = self.transport.as_deref() else {
            return WhoisRecord::default();
        };
        if !record.is_registered() {
            return WhoisRecord::default();
        }

        let result = bounded(deadline, self.query_timeout, async {
            let raw = transport.query(domain).await?;
            parse_registration_dates(&raw)
        })
        .await;

        result.unwrap_or_else(|e| {
            debug!(domain, error = %e, "WHOIS lookup failed");
            WhoisRecord::default()
        })
    }
}

/// Optional HTTP and SMTP banner grabs
pub struct BannerGrabber {
    http: Option<reqwest::Client>,
    smtp: bool,
    smtp_port: u16,
    limit: Duration,
}

impl BannerGrabber {
    pub fn new(http: Option<reqwest::Client>, smtp: bool, limit: Duration) -> Self {
        Self {
            http,
            smtp,
            smtp_port: banner::SMTP_PORT,
            limit,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, false, Duration::ZERO)
    }

    /// Greet MX hosts on `port` instead of 25
    pub fn with_smtp_port(mut self, port: u16) -> Self {
        self.smtp_port = port;
        self
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        let http = config.capabilities.http_banner.then(|| {
            reqwest::Client::builder()
                .timeout(config.banner_timeout)
                .redirect(reqwest::redirect::Policy::none())
                .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
                .build()
                .unwrap_or_default()
        });

        Self::new(http, config.capabilities.smtp_banner, config.banner_timeout)
    }

    /// `(http, smtp)` banners, each only attempted when its record exists
    pub async fn grab(
        &self,
        domain: &str,
        record: &ResolutionRecord,
        deadline: Instant,
    ) -> (Option<String>, Option<String>) {
        let http = async {
            let client = self.http.as_ref()?;
            record.a.as_ref()?;
            bounded(deadline, self.limit, banner::http_banner(client, domain))
                .await
                .map_err(|e| debug!(domain, error = %e, "HTTP banner failed"))
                .ok()
        };

        let smtp = async {
            if !self.smtp {
                return None;
            }
            let mx = record.mx.as_deref()?;
            bounded(deadline, self.limit, banner::smtp_banner(mx, self.smtp_port, self.limit))
                .await
                .map_err(|e| debug!(domain, mx, error = %e, "SMTP banner failed"))
                .ok()
        };

        tokio::join!(http, smtp)
    }
}

/// Resolver, WHOIS and banners chained under one per-candidate deadline
pub struct Enricher {
    resolver: Resolver,
    whois: WhoisEnricher,
    banners: BannerGrabber,
    candidate_timeout: Duration,
}

impl Enricher {
    pub fn new(
        resolver: Resolver,
        whois: WhoisEnricher,
        banners: BannerGrabber,
        candidate_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            whois,
            banners,
            candidate_timeout,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(
            Resolver::from_config(config),
            WhoisEnricher::from_config(config),
            BannerGrabber::from_config(config),
            config.candidate_timeout,
        )
    }

    pub async fn enrich(&self, domain: &str) -> Enrichment {
        let deadline = Instant::now() + self.candidate_timeout;

        let dns = self.resolver.resolve(domain, deadline).await;
        if dns.is_empty() {
            return Enrichment::default();
        }

        let (whois, (http_banner, smtp_banner)) = tokio::join!(
            self.whois.enrich(domain, &dns, deadline),
            self.banners.grab(domain, &dns, deadline),
        );

        Enrichment {
            dns,
            whois,
            country: None,
            http_banner,
            smtp_banner,
        }
    }
}
