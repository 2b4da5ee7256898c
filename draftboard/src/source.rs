// Player feed loading: local files or HTTP, with a cached fallback.

use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::board::catalog::{LoadError, PlayerCatalog};
use crate::db::{StateStore, CATALOG_CACHE_KEY};

// ---------------------------------------------------------------------------
// DataSource
// ---------------------------------------------------------------------------

/// Where a JSON document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Http(String),
}

/// A source could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: {message}")]
pub struct SourceError {
    pub location: String,
    pub message: String,
}

impl DataSource {
    /// `http://` and `https://` locations are fetched over the network;
    /// anything else is a file path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSource::Http(trimmed.to_string())
        } else {
            DataSource::File(PathBuf::from(trimmed))
        }
    }

    pub fn location(&self) -> String {
        match self {
            DataSource::File(path) => path.display().to_string(),
            DataSource::Http(url) => url.clone(),
        }
    }

    /// Read the raw document body.
    pub async fn read_text(&self) -> Result<String, SourceError> {
        let err = |message: String| SourceError {
            location: self.location(),
            message,
        };
        match self {
            DataSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| err(e.to_string())),
            DataSource::Http(url) => {
                let response = reqwest::get(url.as_str())
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| err(e.to_string()))?;
                response.text().await.map_err(|e| err(e.to_string()))
            }
        }
    }

    /// Read and parse the document as JSON.
    pub async fn read_json(&self) -> Result<Value, LoadError> {
        let text = self.read_text().await.map_err(|e| LoadError::Unreachable {
            location: e.location,
            message: e.message,
        })?;
        serde_json::from_str(&text).map_err(|source| LoadError::InvalidJson {
            location: self.location(),
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// Catalog loading
// ---------------------------------------------------------------------------

/// Where the loaded catalog came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrigin {
    /// The configured feed.
    Primary,
    /// The copy cached after the last good load.
    Cache,
    /// Nothing usable; the board is empty.
    Empty,
}

impl CatalogOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            CatalogOrigin::Primary => "live",
            CatalogOrigin::Cache => "cached",
            CatalogOrigin::Empty => "no data",
        }
    }
}

#[derive(Debug)]
pub struct LoadedCatalog {
    pub catalog: PlayerCatalog,
    pub origin: CatalogOrigin,
    pub loaded_at: DateTime<Local>,
}

/// Load the player catalog, falling back to the cached copy and then to an
/// empty board. Never fails; every degraded path is logged.
///
/// A good primary load refreshes the cache.
pub async fn load_catalog(source: &DataSource, store: &dyn StateStore) -> LoadedCatalog {
    let primary = match source.read_json().await {
        Ok(records) => PlayerCatalog::load(&records).map(|catalog| (catalog, records)),
        Err(e) => Err(e),
    };

    let (catalog, origin) = match primary {
        Ok((catalog, records)) => {
            info!("Loaded {} players from {}", catalog.len(), source.location());
            if let Err(e) = store.save_state(CATALOG_CACHE_KEY, &records) {
                warn!("Failed to cache player data: {}", e);
            }
            (catalog, CatalogOrigin::Primary)
        }
        Err(e) => {
            warn!("Failed loading player data: {}", e);
            match load_cached(store) {
                Some(catalog) => {
                    info!("Using cached player data ({} players)", catalog.len());
                    (catalog, CatalogOrigin::Cache)
                }
                None => {
                    warn!("No cached player data; starting with an empty board");
                    (PlayerCatalog::default(), CatalogOrigin::Empty)
                }
            }
        }
    };

    LoadedCatalog {
        catalog,
        origin,
        loaded_at: Local::now(),
    }
}

fn load_cached(store: &dyn StateStore) -> Option<PlayerCatalog> {
    let records = match store.load_state(CATALOG_CACHE_KEY) {
        Ok(Some(records)) => records,
        Ok(None) => return None,
        Err(e) => {
            warn!("Failed to read cached player data: {}", e);
            return None;
        }
    };
    match PlayerCatalog::load(&records) {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            warn!("Cached player data is unusable: {}", e);
            None
        }
    }
}

/// Clock time in the board's "Updated" label, e.g. `3:07 PM`.
pub fn format_updated(at: &DateTime<Local>) -> String {
    at.format("%-I:%M %p").to_string()
}
