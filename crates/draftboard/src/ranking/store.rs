// Flat-file persistence for the custom order.
//
// The file holds only identities (player + position), one row per ranked
// player in rank order. ADP values are never stored.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::order::CustomOrder;
use crate::player::{PlayerKey, PLAYER_COLUMN, POSITION_COLUMN};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

#[derive(Debug, Deserialize)]
struct OrderRow {
    #[serde(rename = "Player Team (Bye)")]
    player: String,
    #[serde(rename = "POS")]
    position: String,
}

/// Distinguishes temp files of concurrent saves within one process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// CSV-backed store for the custom order.
#[derive(Debug, Clone)]
pub struct RankingStore {
    path: PathBuf,
}

impl RankingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RankingStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted order. A missing, unreadable, malformed, or empty
    /// file all mean "no custom order".
    pub fn load(&self) -> Option<CustomOrder> {
        if !self.path.exists() {
            debug!("no rankings file at {}", self.path.display());
            return None;
        }

        match self.try_load() {
            Ok(order) if order.is_empty() => {
                debug!("rankings file {} has no rows", self.path.display());
                None
            }
            Ok(order) => {
                debug!(
                    "loaded {} ranked players from {}",
                    order.len(),
                    self.path.display()
                );
                Some(order)
            }
            Err(e) => {
                warn!("ignoring unreadable rankings file: {}", e);
                None
            }
        }
    }

    fn try_load(&self) -> Result<CustomOrder, StoreError> {
        let file = File::open(&self.path).map_err(|e| StoreError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        read_order(file).map_err(|e| StoreError::Csv {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Replace the persisted order.
    ///
    /// Writes a sibling temp file and renames it over the target, so a
    /// concurrent reader sees either the old file or the new one.
    pub fn save(&self, order: &CustomOrder) -> Result<(), StoreError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| StoreError::Io { path, source }
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }

        let tmp = self.temp_path();
        if let Err(e) = self.write_temp(&tmp, order) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }

        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(io_err(&self.path)(e));
        }

        info!(
            "saved {} ranked players to {}",
            order.len(),
            self.path.display()
        );
        Ok(())
    }

    fn write_temp(&self, tmp: &Path, order: &CustomOrder) -> Result<(), StoreError> {
        let csv_err = |source| StoreError::Csv {
            path: tmp.to_path_buf(),
            source,
        };

        let file = File::create(tmp).map_err(|e| StoreError::Io {
            path: tmp.to_path_buf(),
            source: e,
        })?;
        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record([PLAYER_COLUMN, POSITION_COLUMN])
            .map_err(csv_err)?;
        for key in order.iter() {
            writer
                .write_record([key.player.as_str(), key.position.as_str()])
                .map_err(csv_err)?;
        }

        let file = writer.into_inner().map_err(|e| StoreError::Io {
            path: tmp.to_path_buf(),
            source: e.into_error(),
        })?;
        file.sync_all().map_err(|e| StoreError::Io {
            path: tmp.to_path_buf(),
            source: e,
        })
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "rankings.csv".to_string());
        let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.path
            .with_file_name(format!(".{name}.{}.{seq}.tmp", std::process::id()))
    }
}

/// Parse an order from CSV. Any malformed row fails the whole read.
fn read_order<R: Read>(rdr: R) -> Result<CustomOrder, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut entries = Vec::new();
    for result in reader.deserialize::<OrderRow>() {
        let row = result?;
        entries.push(PlayerKey::new(row.player.trim(), row.position.trim()));
    }
    Ok(CustomOrder::new(entries))
}
