//! # Snapshots
//!
//! Whole-market JSON snapshots: every order file and the catalog. The
//! operator CLI loads a snapshot, runs sweeps against it and writes it back.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use agrimart_core::Timestamp;

use crate::catalog::{InMemoryCatalog, Product};
use crate::state::{MarketState, OrderFile};

/// Snapshot file failures.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("cannot access snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("snapshot {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Serialized market contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub taken_at: Timestamp,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub orders: Vec<OrderFile>,
}

impl MarketSnapshot {
    /// Capture the current state and catalog.
    pub fn capture(state: &MarketState, catalog: &InMemoryCatalog, taken_at: Timestamp) -> Self {
        Self {
            taken_at,
            products: catalog.products(),
            orders: state.files(),
        }
    }

    /// Rebuild live state and catalog from the snapshot.
    pub fn restore(self) -> (MarketState, InMemoryCatalog) {
        (
            MarketState::from_files(self.orders),
            InMemoryCatalog::from_products(self.products),
        )
    }

    /// Read a snapshot file.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SnapshotError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the snapshot, replacing the file only once fully written.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| SnapshotError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let tmp = path.with_extension("json.tmp");
        let io_err = |source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        };
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(io_err)?;
        tracing::debug!(path = %path.display(), orders = self.orders.len(), "snapshot saved");
        Ok(())
    }
}
