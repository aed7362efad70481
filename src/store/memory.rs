// In-memory storage. Nothing survives the process; used by tests and by
// one-off checks that should not remember what they found.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{DiscoveredDomain, Storage, WatchEntry};
use crate::error::Result;

#[derive(Debug, Default)]
struct Inner {
    watch: Vec<WatchEntry>,
    discoveries: Vec<DiscoveredDomain>,
}

/// [`Storage`] held in memory behind a `RwLock`
///
/// Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with a watch list
    pub fn with_watch_list(watch: Vec<WatchEntry>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                watch,
                discoveries: Vec::new(),
            })),
        }
    }

    pub async fn add_watch(&self, entry: WatchEntry) {
        self.inner.write().await.watch.push(entry);
    }

    /// Number of recorded discoveries
    pub async fn len(&self) -> usize {
        self.inner.read().await.discoveries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.discoveries.is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn watched_domains(&self) -> Result<Vec<WatchEntry>> {
        Ok(self.inner.read().await.watch.clone())
    }

    async fn is_known_discovery(&self, domain: &str) -> Result<bool> {
        let guard = self.inner.read().await;
        Ok(guard.discoveries.iter().any(|d| d.domain == domain))
    }

    async fn record_discovery(&self, discovery: &DiscoveredDomain) -> Result<()> {
        self.inner.write().await.discoveries.push(discovery.clone());
        Ok(())
    }

    async fn discoveries(&self) -> Result<Vec<DiscoveredDomain>> {
        Ok(self.inner.read().await.discoveries.clone())
    }
}
