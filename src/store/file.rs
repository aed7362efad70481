// # JSON File Store
//
// Watch list and discoveries in one JSON document:
//
// ```json
// {
//   "version": "1.0",
//   "watch": [{ "email": "ops@example.com", "domain": "example.com" }],
//   "discoveries": [{ "domain": "examp1e.com", "info": "93.184.216.34" }]
// }
// ```
//
// The watch list is edited by hand or by outside tooling. Every recorded
// discovery rewrites the file through a temporary file and a rename, so a
// crash mid-write leaves the previous document intact.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::{DiscoveredDomain, Storage, WatchEntry};
use crate::error::{Error, Result};

const STORE_FILE_VERSION: &str = "1.0";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default = "current_version")]
    version: String,
    #[serde(default)]
    watch: Vec<WatchEntry>,
    #[serde(default)]
    discoveries: Vec<DiscoveredDomain>,
}

fn current_version() -> String {
    STORE_FILE_VERSION.to_string()
}

#[derive(Debug)]
struct State {
    document: StoreFile,
    known: HashSet<String>,
}

/// [`Storage`] persisted to a JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: RwLock<State>,
}

impl JsonFileStore {
    /// Open `path`; a missing file is an empty store and is created on the
    /// first write.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let document = Self::load(&path).await?;
        let known = document.discoveries.iter().map(|d| d.domain.clone()).collect();

        tracing::debug!(
            path = %path.display(),
            watched = document.watch.len(),
            discoveries = document.discoveries.len(),
            "opened store"
        );

        Ok(Self {
            path,
            state: RwLock::new(State { document, known }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(path: &Path) -> Result<StoreFile> {
        if !fs::try_exists(path).await? {
            return Ok(StoreFile {
                version: current_version(),
                ..Default::default()
            });
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::storage(format!("failed to read {}: {}", path.display(), e))
        })?;

        let document: StoreFile = serde_json::from_str(&content).map_err(|e| {
            Error::storage(format!("failed to parse {}: {}", path.display(), e))
        })?;

        if document.version != STORE_FILE_VERSION {
            tracing::warn!(
                "store version mismatch: expected {}, got {}. Loading anyway.",
                STORE_FILE_VERSION,
                document.version
            );
        }

        Ok(document)
    }

    async fn write(&self, document: &StoreFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(document)?;
        let temp_path = self.path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            Error::storage(format!("failed to create {}: {}", temp_path.display(), e))
        })?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::storage(format!("failed to replace {}: {}", self.path.display(), e))
        })?;

        Ok(())
    }
}

#[async_trait]
impl Storage for JsonFileStore {
    async fn watched_domains(&self) -> Result<Vec<WatchEntry>> {
        Ok(self.state.read().await.document.watch.clone())
    }

    async fn is_known_discovery(&self, domain: &str) -> Result<bool> {
        Ok(self.state.read().await.known.contains(domain))
    }

    async fn record_discovery(&self, discovery: &DiscoveredDomain) -> Result<()> {
        let mut state = self.state.write().await;
        state.document.discoveries.push(discovery.clone());

        if let Err(e) = self.write(&state.document).await {
            state.document.discoveries.pop();
            return Err(e);
        }

        state.known.insert(discovery.domain.clone());
        Ok(())
    }

    async fn discoveries(&self) -> Result<Vec<DiscoveredDomain>> {
        Ok(self.state.read().await.document.discoveries.clone())
    }
}
