//! New-versus-known decision for candidates with DNS presence.
//!
//! The check against storage and the insert that follows run as one unit per
//! domain: concurrent workers holding the same candidate (duplicates across
//! mutation families are common) queue on a per-domain lock, so at most one
//! of them records it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;

use crate::error::{Error, Result};
use crate::store::{DiscoveredDomain, Storage};

/// Outcome of the novelty check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Novelty {
    /// Not seen before; now recorded
    New,
    /// Already recorded by an earlier run or another worker
    Known,
}

/// Serializes check-then-insert per domain against shared storage
pub struct NoveltyFilter {
    store: Arc<dyn Storage>,
    in_flight: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl NoveltyFilter {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self {
            store,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Record `discovery` unless its domain is already known.
    pub async fn admit(&self, discovery: &DiscoveredDomain) -> Result<Novelty> {
        let key_lock = self.key_lock(&discovery.domain)?;
        let guard = key_lock.lock().await;

        let result = self.check_and_record(discovery).await;

        drop(guard);
        self.release(&discovery.domain, key_lock);
        result
    }

    async fn check_and_record(&self, discovery: &DiscoveredDomain) -> Result<Novelty> {
        if self.store.is_known_discovery(&discovery.domain).await? {
            return Ok(Novelty::Known);
        }
        self.store.record_discovery(discovery).await?;
        Ok(Novelty::New)
    }

    fn key_lock(&self, domain: &str) -> Result<Arc<AsyncMutex<()>>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .map_err(|_| Error::storage("novelty lock table poisoned"))?;
        Ok(in_flight
            .entry(domain.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone())
    }

    /// Drop the table entry once no other worker holds or awaits it
    fn release(&self, domain: &str, key_lock: Arc<AsyncMutex<()>>) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            // one reference in the table, one here
            if Arc::strong_count(&key_lock) == 2 {
                in_flight.remove(domain);
            }
        }
    }
}
