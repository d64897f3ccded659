//! Best-effort artifact persistence
//!
//! Every transcoded output is written to the artifact directory under its
//! fixture key for manual inspection. Failures are collected and logged but
//! never fail the run.

use crate::fixture::{ExtensionTable, FixtureKey};
use crate::transcode::ImageResults;
use futures::future::join_all;
use std::path::{Path, PathBuf};

/// One artifact that could not be written
#[derive(Debug)]
pub struct ArtifactFailure {
    /// Target path
    pub path: PathBuf,
    /// Underlying error
    pub error: std::io::Error,
}

/// Outcome of an artifact write pass
#[derive(Debug, Default)]
pub struct ArtifactReport {
    /// Number of artifacts written
    pub written: usize,
    /// Artifacts that failed
    pub failures: Vec<ArtifactFailure>,
}

impl ArtifactReport {
    /// Check if every artifact was written
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Writes transcoded outputs named by fixture key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    /// Writer targeting `dir`
    #[inline]
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Artifact directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for a fixture key
    #[inline]
    #[must_use]
    pub fn path_for(&self, key: &FixtureKey) -> PathBuf {
        self.dir.join(key.as_str())
    }

    /// Write every result concurrently, collecting failures
    pub async fn write_all(
        &self,
        results: &[ImageResults],
        extensions: &ExtensionTable,
    ) -> ArtifactReport {
        if let Err(error) = tokio::fs::create_dir_all(&self.dir).await {
            tracing::warn!(dir = %self.dir.display(), %error, "could not create artifact directory");
        }

        let writes = results
            .iter()
            .flat_map(|image| image.fixture_entries(extensions))
            .map(|(key, result)| {
                let path = self.path_for(&key);
                async move {
                    match tokio::fs::write(&path, &result.data).await {
                        Ok(()) => Ok(()),
                        Err(error) => Err(ArtifactFailure { path, error }),
                    }
                }
            });

        let mut report = ArtifactReport::default();
        for outcome in join_all(writes).await {
            match outcome {
                Ok(()) => report.written += 1,
                Err(failure) => {
                    tracing::warn!(
                        path = %failure.path.display(),
                        error = %failure.error,
                        "artifact write failed"
                    );
                    report.failures.push(failure);
                }
            }
        }

        tracing::debug!(
            written = report.written,
            failed = report.failures.len(),
            "artifacts persisted"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcode::TranscodeResult;
    use indexmap::IndexMap;

    fn results() -> Vec<ImageResults> {
        let mut variants = IndexMap::new();
        variants.insert("small".to_string(), TranscodeResult::new(b"small".to_vec(), "jpeg"));
        variants.insert("avif".to_string(), TranscodeResult::new(b"avif".to_vec(), "heif"));
        vec![ImageResults {
            image_name: "a.jpg".to_string(),
            source_size: 100,
            results: variants,
        }]
    }

    #[tokio::test]
    async fn writes_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path().join("output"));

        assert_eq!(writer.dir(), dir.path().join("output"));

        let report = writer.write_all(&results(), &ExtensionTable::default()).await;

        assert_eq!(report.written, 2);
        assert!(report.is_complete());
        assert_eq!(
            std::fs::read(dir.path().join("output/a.jpg-small.jpeg")).unwrap(),
            b"small"
        );
        assert_eq!(
            std::fs::read(dir.path().join("output/a.jpg-avif.avif")).unwrap(),
            b"avif"
        );
    }

    #[tokio::test]
    async fn failures_are_collected_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the directory should be
        let blocked = dir.path().join("output");
        std::fs::write(&blocked, b"").unwrap();

        let writer = ArtifactWriter::new(&blocked);
        let report = writer.write_all(&results(), &ExtensionTable::default()).await;

        assert_eq!(report.written, 0);
        assert_eq!(report.failures.len(), 2);
    }
}
