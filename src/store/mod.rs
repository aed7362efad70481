//! Storage collaborator.
//!
//! The pipeline reads the watch list and the set of previously discovered
//! domains through [`Storage`], and records new discoveries through it.
//! Administration of the watch list lives outside this crate.

mod file;
mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// A domain an operator wants protected, and who to alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEntry {
    pub email: String,
    pub domain: String,
}

impl WatchEntry {
    pub fn new(email: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            domain: domain.into(),
        }
    }
}

/// A candidate with DNS presence, recorded the first time it is seen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredDomain {
    pub domain: String,
    pub info: String,
}

impl DiscoveredDomain {
    pub fn new(domain: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            info: info.into(),
        }
    }
}

/// Storage backend.
///
/// Implementations must be safe to call concurrently. The pipeline serializes
/// `is_known_discovery` + `record_discovery` per domain itself, so
/// implementations need no cross-call transaction.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Every watch entry, in storage order
    async fn watched_domains(&self) -> Result<Vec<WatchEntry>>;

    /// Whether `domain` was already recorded (exact match)
    async fn is_known_discovery(&self, domain: &str) -> Result<bool>;

    /// Persist a new discovery
    async fn record_discovery(&self, discovery: &DiscoveredDomain) -> Result<()>;

    /// Every recorded discovery
    async fn discoveries(&self) -> Result<Vec<DiscoveredDomain>>;
}
