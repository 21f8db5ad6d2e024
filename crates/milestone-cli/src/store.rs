//! JSON snapshot file persistence.
//!
//! The registry itself never touches disk. This module is the persistence
//! collaborator: it reads a [`Snapshot`] to hydrate a registry at startup
//! and writes the exported snapshot back after a mutation. A missing file
//! reads as an empty snapshot.
//!
//! Writes go to a sibling temporary file that is then renamed over the
//! target, so an interrupted write never leaves a truncated snapshot.

use std::path::{Path, PathBuf};

use milestone_types::Snapshot;

/// Errors that can occur when reading or writing a snapshot file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to read or write the snapshot file.
    #[error("snapshot file {path}: {source}")]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The snapshot file does not hold a valid snapshot.
    #[error("snapshot file {path} is not a valid snapshot: {source}")]
    Json {
        /// The file being parsed or written.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

/// A snapshot file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    path: PathBuf,
    pretty: bool,
}

impl SnapshotFile {
    /// Bind to `path`. Nothing is read until [`load`](Self::load).
    pub fn new(path: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            path: path.into(),
            pretty,
        }
    }

    /// The bound file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot. A missing file yields an empty snapshot.
    pub fn load(&self) -> Result<Snapshot, StoreError> {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "Snapshot file not found, starting empty");
            return Ok(Snapshot::new());
        }
        let snapshot = read_snapshot(&self.path)?;
        tracing::info!(
            path = %self.path.display(),
            namespaces = snapshot.as_map().len(),
            events = snapshot.event_count(),
            "Snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Write the snapshot, replacing the file atomically.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(snapshot)
        } else {
            serde_json::to_string(snapshot)
        };
        let json = rendered.map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json).map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(
            path = %self.path.display(),
            events = snapshot.event_count(),
            "Snapshot saved"
        );
        Ok(())
    }
}

/// Read a snapshot from an arbitrary JSON file. The file must exist.
pub fn read_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
    let contents = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert("", "event1", 2);
        snapshot.insert("firstNamespace", "event2", -1);
        snapshot
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("absent.json"), true);
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        for pretty in [true, false] {
            let file = SnapshotFile::new(dir.path().join(format!("snap-{pretty}.json")), pretty);
            file.save(&sample()).unwrap();
            assert_eq!(file.load().unwrap(), sample());
        }
    }

    #[test]
    fn save_leaves_no_temporary_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("snap.json"), false);
        file.save(&sample()).unwrap();
        assert!(!dir.path().join("snap.json.tmp").exists());
        assert!(file.path().exists());
    }

    #[test]
    fn written_file_is_the_nested_shape() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("snap.json"), false);
        file.save(&sample()).unwrap();
        let raw = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(raw, r#"{"":{"event1":2},"firstNamespace":{"event2":-1}}"#);
    }

    #[test]
    fn invalid_json_is_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, r#"{"ns": {"key": "not a number"}}"#).unwrap();

        let err = SnapshotFile::new(&path, true).load().unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn read_snapshot_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_snapshot(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
