//! Per-watched-domain scan and the watch-list run driver.
//!
//! A scan generates every candidate for one watched domain, fans them out to
//! a bounded set of concurrent enrichment chains, and feeds each candidate
//! with signal through the novelty check. Output order follows candidate
//! generation order regardless of which lookup finishes first.

use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::ScanConfig;
use crate::domain::BaseDomain;
use crate::error::Result;
use crate::fuzz::{Variant, VariantGenerator};
use crate::notify::Notifier;
use crate::novelty::{Novelty, NoveltyFilter};
use crate::progress::{LogProgress, Progress};
use crate::report::{build_notification, format_info};
use crate::resolve::Enricher;
use crate::store::{DiscoveredDomain, Storage};

/// Outcome of scanning one watched domain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// The watched domain, normalized
    pub watched: String,
    /// Candidates enriched
    pub considered: usize,
    /// New discoveries, in candidate order
    pub discoveries: Vec<DiscoveredDomain>,
}

/// Outcome of one pass over the watch list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Watch entries scanned
    pub scanned: usize,
    /// Watch entries skipped for an invalid domain
    pub skipped: usize,
    /// Candidates enriched across all entries
    pub considered: usize,
    /// New discoveries across all entries
    pub discovered: usize,
    /// Alerts handed to the notifier
    pub notified: usize,
}

pub struct Pipeline {
    config: ScanConfig,
    generator: VariantGenerator,
    enricher: Enricher,
    store: Arc<dyn Storage>,
    novelty: NoveltyFilter,
    progress: Arc<dyn Progress>,
}

impl Pipeline {
    /// Pipeline with live backends chosen by `config.capabilities`
    pub fn new(config: ScanConfig, store: Arc<dyn Storage>) -> Result<Self> {
        config.validate()?;
        let enricher = Enricher::from_config(&config);
        Ok(Self {
            generator: VariantGenerator::new(),
            enricher,
            novelty: NoveltyFilter::new(store.clone()),
            store,
            progress: Arc::new(LogProgress),
            config,
        })
    }

    pub fn with_enricher(mut self, enricher: Enricher) -> Self {
        self.enricher = enricher;
        self
    }

    pub fn with_generator(mut self, generator: VariantGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    /// Validated candidates for `base`, capped at `max_variants`
    pub fn candidates(&self, base: &BaseDomain) -> Vec<Variant> {
        let variants = self.generator.variants(base);
        match self.config.max_variants {
            Some(max) => variants.take(max).collect(),
            None => variants.collect(),
        }
    }

    /// Scan one watched domain.
    ///
    /// Lookup failures only blank the affected fields; a storage failure
    /// aborts the scan and is returned.
    pub async fn scan_domain(&self, base: &BaseDomain) -> Result<ScanReport> {
        let watched = base.to_string();
        let variants = self.candidates(base);
        let considered = variants.len();

        info!(watched = %watched, "scanning {} candidates", considered);
        self.progress.scan_started(&watched, considered);

        let outcomes: Vec<Option<DiscoveredDomain>> = stream::iter(variants)
            .map(|variant| self.process_candidate(variant))
            .buffered(self.config.concurrency)
            .try_collect()
            .await?;

        let discoveries: Vec<DiscoveredDomain> = outcomes.into_iter().flatten().collect();

        self.progress
            .scan_finished(&watched, considered, discoveries.len());

        Ok(ScanReport {
            watched,
            considered,
            discoveries,
        })
    }

    /// Enrich, format and novelty-check a single candidate
    async fn process_candidate(&self, variant: Variant) -> Result<Option<DiscoveredDomain>> {
        let enrichment = self.enricher.enrich(&variant.candidate).await;
        let info = format_info(&enrichment);

        let outcome = if info.is_empty() {
            None
        } else {
            let discovery = DiscoveredDomain::new(variant.candidate.clone(), info);
            match self.novelty.admit(&discovery).await? {
                Novelty::New => {
                    info!(
                        kind = %variant.kind,
                        domain = %discovery.domain,
                        info = %discovery.info,
                        "new discovery"
                    );
                    Some(discovery)
                }
                Novelty::Known => None,
            }
        };

        self.progress.candidate_done(&variant.candidate);
        Ok(outcome)
    }

    /// Scan every watched domain and alert its owner about new discoveries.
    ///
    /// Invalid watch entries are skipped. Storage and notify failures end the
    /// run and are returned.
    pub async fn run(&self, notifier: &dyn Notifier) -> Result<RunSummary> {
        let watch = self.store.watched_domains().await?;
        let mut summary = RunSummary::default();

        if watch.is_empty() {
            warn!("watch list is empty, nothing to scan");
            return Ok(summary);
        }

        for entry in &watch {
            let base = match BaseDomain::parse(&entry.domain) {
                Ok(base) => base,
                Err(e) => {
                    warn!(domain = %entry.domain, error = %e, "skipping watch entry");
                    summary.skipped += 1;
                    continue;
                }
            };

            let report = self.scan_domain(&base).await?;
            summary.scanned += 1;
            summary.considered += report.considered;
            summary.discovered += report.discoveries.len();

            info!(
                watched = %report.watched,
                considered = report.considered,
                "found {} new entries",
                report.discoveries.len()
            );

            if let Some(notification) =
                build_notification(&entry.email, &report.watched, &report.discoveries)
            {
                notifier.send(&notification).await?;
                summary.notified += 1;
            }
        }

        Ok(summary)
    }
}
