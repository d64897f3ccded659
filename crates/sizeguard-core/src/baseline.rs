//! Baseline store
//!
//! The persisted snapshot of previously recorded fixture sizes. Loading is a
//! setup precondition: a missing or malformed snapshot aborts the run.
//! Persisting rewrites the whole snapshot with 4-space indented JSON in key
//! order, so repeated updates of an unchanged corpus are byte-identical.

use crate::error::BaselineError;
use crate::fixture::FixtureMap;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// File-backed baseline snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineStore {
    path: PathBuf,
}

impl BaselineStore {
    /// Store backed by the snapshot at `path`
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the recorded baseline
    ///
    /// # Errors
    /// - `BaselineError::Read` if the snapshot is absent or unreadable
    /// - `BaselineError::Parse` if it is not a key → integer size object
    pub async fn load(&self) -> Result<FixtureMap, BaselineError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| BaselineError::Read {
                path: self.path.clone(),
                source,
            })?;

        let map: FixtureMap =
            serde_json::from_slice(&bytes).map_err(|source| BaselineError::Parse {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(path = %self.path.display(), entries = map.len(), "loaded baseline");
        Ok(map)
    }

    /// Overwrite the snapshot with `map`
    ///
    /// Writes to a sibling temp file and renames it into place.
    ///
    /// # Errors
    /// - `BaselineError::Serialize` if encoding fails
    /// - `BaselineError::Write` if the file cannot be written or renamed
    pub async fn persist(&self, map: &FixtureMap) -> Result<(), BaselineError> {
        let bytes = encode(map)?;

        let temp_path = self.path.with_extension("json.tmp");
        let write_err = |source: std::io::Error| BaselineError::Write {
            path: self.path.clone(),
            source,
        };

        tokio::fs::write(&temp_path, &bytes)
            .await
            .map_err(write_err)?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(write_err)?;

        tracing::info!(path = %self.path.display(), entries = map.len(), "baseline updated");
        Ok(())
    }
}

/// Pretty-print with 4-space indentation
fn encode(map: &FixtureMap) -> Result<Vec<u8>, BaselineError> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    map.serialize(&mut serializer)
        .map_err(BaselineError::Serialize)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = BaselineStore::new(dir.path().join("fixtures.json"));
        assert!(matches!(store.load().await, Err(BaselineError::Read { .. })));
    }

    #[tokio::test]
    async fn load_invalid_json_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixtures.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let store = BaselineStore::new(&path);
        assert!(matches!(store.load().await, Err(BaselineError::Parse { .. })));
    }

    #[tokio::test]
    async fn load_rejects_non_integer_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixtures.json");
        std::fs::write(&path, br#"{"a.jpg-small.jpeg": "big"}"#).unwrap();

        let store = BaselineStore::new(&path);
        assert!(matches!(store.load().await, Err(BaselineError::Parse { .. })));
    }

    #[tokio::test]
    async fn persist_writes_sorted_indented_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixtures.json");
        let store = BaselineStore::new(&path);

        let map: FixtureMap = [("b.png-small.png", 20), ("a.jpg-small.jpeg", 10)]
            .into_iter()
            .collect();
        store.persist(&map).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "{\n    \"a.jpg-small.jpeg\": 10,\n    \"b.png-small.png\": 20\n}"
        );
        assert_eq!(store.load().await.unwrap(), map);
    }

    #[tokio::test]
    async fn persist_is_byte_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixtures.json");
        let store = BaselineStore::new(&path);
        let map: FixtureMap = [("a.jpg-large.jpeg", 5000)].into_iter().collect();

        store.persist(&map).await.unwrap();
        let first = std::fs::read(&path).unwrap();

        let reloaded = store.load().await.unwrap();
        store.persist(&reloaded).await.unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn persist_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixtures.json");
        let store = BaselineStore::new(&path);

        store.persist(&FixtureMap::new()).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
