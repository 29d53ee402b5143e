//! # JSON File Store
//!
//! Keeps the whole unit set in one pretty-printed JSON array.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Atomic Snapshot Write                                │
//! │                                                                         │
//! │  save(records)                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  serialize → units.json.tmp   (write_all + sync_all)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  rename(units.json.tmp → units.json)                                   │
//! │                                                                         │
//! │  Crash before rename: old units.json is intact                         │
//! │  Crash after rename:  new units.json is complete                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use hostel_core::UnitRecord;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::UnitStore;
use crate::error::StoreResult;

/// Unit store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store for `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "units.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl UnitStore for JsonFileStore {
    async fn load(&self) -> StoreResult<Option<Vec<UnitRecord>>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Snapshot file not found");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let records: Vec<UnitRecord> = serde_json::from_slice(&bytes)?;
        info!(
            path = %self.path.display(),
            count = records.len(),
            "Loaded unit snapshot"
        );
        Ok(Some(records))
    }

    async fn save(&self, records: &[UnitRecord]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = serde_json::to_vec_pretty(records)?;
        let temp = self.temp_path();

        let mut file = tokio::fs::File::create(&temp).await?;
        file.write_all(&contents).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&temp, &self.path).await?;

        debug!(
            path = %self.path.display(),
            count = records.len(),
            "Unit snapshot saved"
        );
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "json"
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use hostel_core::{ledger::provision, Unit};

    #[tokio::test]
    async fn test_missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("units.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("units.json"));

        let mut units = provision(3);
        units[1] = units[1]
            .check_out("Alice", "Room 101", Duration::hours(2), Utc::now())
            .unwrap();
        let records: Vec<UnitRecord> = units.iter().map(UnitRecord::from).collect();

        store.save(&records).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, records);

        // No temp file left behind
        assert!(!store.temp_path().exists());

        let unit = Unit::try_from(loaded[1].clone()).unwrap();
        assert_eq!(unit.hold().unwrap().holder(), "Alice");
    }

    #[tokio::test]
    async fn test_file_layout_uses_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("units.json"));
        let records: Vec<UnitRecord> = provision(1).iter().map(UnitRecord::from).collect();
        store.save(&records).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["unitId"], 1);
        assert_eq!(value[0]["status"], "available");
        assert!(value[0]["holder"].is_null());
        assert!(value[0]["dueAt"].is_null());
    }

    #[tokio::test]
    async fn test_garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("units.json");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::new(path);
        assert!(store.load().await.is_err());
    }
}
