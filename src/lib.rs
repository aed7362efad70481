//! # squatwatch
//!
//! Typosquat monitoring: generates plausible misspellings of watched domains,
//! checks which of them resolve, enriches hits with registration data and
//! reports only the hits not seen on an earlier run.
//!
//! ```no_run
//! use std::sync::Arc;
//! use squatwatch::{ConsoleNotifier, JsonFileStore, Pipeline, ScanConfig};
//!
//! # async fn demo() -> squatwatch::Result<()> {
//! let store = Arc::new(JsonFileStore::open("squatwatch.json").await?);
//! let pipeline = Pipeline::new(ScanConfig::default(), store)?;
//! let summary = pipeline.run(&ConsoleNotifier).await?;
//! println!("{} new discoveries", summary.discovered);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod fuzz;
pub mod notify;
pub mod novelty;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod resolve;
pub mod store;

pub use config::{Capabilities, ScanConfig};
pub use domain::{is_valid_domain, normalize_domain, BaseDomain};
pub use error::{Error, LookupError, Result};
pub use fuzz::{MutationKind, Variant, VariantGenerator};
pub use notify::{ConsoleNotifier, MemoryNotifier, Notification, Notifier, SmtpNotifier};
pub use novelty::{Novelty, NoveltyFilter};
pub use pipeline::{Pipeline, RunSummary, ScanReport};
pub use progress::{LogProgress, Progress};
pub use report::format_info;
pub use resolve::{
    BannerGrabber, DnsTransport, Enricher, Enrichment, RecordKind, ResolutionRecord, Resolver,
    WhoisEnricher, WhoisRecord, WhoisTransport,
};
pub use store::{DiscoveredDomain, JsonFileStore, MemoryStore, Storage, WatchEntry};
