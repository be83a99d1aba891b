//! Persistence for the ladder engine.
//!
//! The store is an in-memory set of ordered tables (BTreeMap range scans)
//! persisted as one JSONL file per table. Any storage engine that supports
//! ordered range scans could sit behind the same surface.

use std::path::PathBuf;
use thiserror::Error;

mod jsonl;
mod store;

pub use jsonl::{JsonlFile, TableFile};
pub use store::{LadderKey, LadderStore, SnapshotTier};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Duplicate snapshot for team {team_id} at {timestamp}")]
    DuplicateSnapshot {
        team_id: crate::models::TeamId,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// On-disk layout of the data directory.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Directory holding the main and archive snapshot tiers.
    pub fn snapshots_dir(&self) -> PathBuf {
        self.data_dir.join("snapshots")
    }

    pub fn table_path(&self, table: TableFile) -> PathBuf {
        match table {
            TableFile::SnapshotsMain | TableFile::SnapshotsArchive => {
                self.snapshots_dir().join(table.filename())
            }
            _ => self.data_dir.join(table.filename()),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::new(PathBuf::from("/data"));
        assert_eq!(
            config.table_path(TableFile::Teams),
            PathBuf::from("/data/teams.jsonl")
        );
        assert_eq!(
            config.table_path(TableFile::SnapshotsArchive),
            PathBuf::from("/data/snapshots/archive.jsonl")
        );
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }
}
