//! Testing utilities for sizeguard workspace
//!
//! Shared test helpers: a deterministic transcoder and temporary harness
//! directories with corpus and baseline fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use sizeguard_core::{
    Codec, CorpusFilter, HarnessConfig, TranscodeError, TranscodeOptions, TranscodeResult,
    Transcoder,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Barrier;

/// Deterministic transcoder
///
/// Output sizes: identity returns the source; otherwise
/// `source_len / 2 + width * factor + growth`, with factor 10 for the source
/// codec, 6 for WebP and 4 for AVIF. AVIF is reported as `heif`.
#[derive(Debug)]
pub struct FakeTranscoder {
    source_format: String,
    growth: u64,
    fail_on: Option<Codec>,
    barrier: Option<Arc<Barrier>>,
    calls: AtomicUsize,
}

impl FakeTranscoder {
    pub fn new() -> Self {
        Self {
            source_format: "jpeg".to_string(),
            growth: 0,
            fail_on: None,
            barrier: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Format reported for pass-through and width-only outputs
    pub fn with_source_format(mut self, format: impl Into<String>) -> Self {
        self.source_format = format.into();
        self
    }

    /// Extra bytes added to every transformed output
    pub fn with_growth(mut self, growth: u64) -> Self {
        self.growth = growth;
        self
    }

    /// Reject every request forcing `codec`
    pub fn failing_on(mut self, codec: Codec) -> Self {
        self.fail_on = Some(codec);
        self
    }

    /// Hold every call until `parties` calls are in flight
    pub fn with_barrier(mut self, parties: usize) -> Self {
        self.barrier = Some(Arc::new(Barrier::new(parties)));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Size this transcoder produces for a source length and options
    pub fn expected_size(&self, source_len: usize, options: &TranscodeOptions) -> u64 {
        let Some(width) = options.width else {
            return source_len as u64;
        };
        let factor = match options.forced_codec() {
            None => 10,
            Some(Codec::Webp) => 6,
            Some(Codec::Avif) => 4,
        };
        source_len as u64 / 2 + u64::from(width) * factor + self.growth
    }
}

impl Default for FakeTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(
        &self,
        source: &[u8],
        options: &TranscodeOptions,
    ) -> Result<TranscodeResult, TranscodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }

        if source.is_empty() {
            return Err(TranscodeError::Decode("empty source".to_string()));
        }
        if options.forced_codec().is_some() && options.forced_codec() == self.fail_on {
            return Err(TranscodeError::Encode {
                format: options.forced_codec().map(|c| c.to_string()).unwrap_or_default(),
                message: "encoder unavailable".to_string(),
            });
        }

        if options.is_identity() {
            return Ok(TranscodeResult::new(source.to_vec(), &self.source_format));
        }

        let size = self.expected_size(source.len(), options) as usize;
        let format = match options.forced_codec() {
            None => self.source_format.as_str(),
            Some(Codec::Webp) => "webp",
            Some(Codec::Avif) => "heif",
        };
        Ok(TranscodeResult::new(vec![0xAB; size], format))
    }
}

/// Temporary harness directory: `images/`, `fixtures.json`, `output/`
#[derive(Debug)]
pub struct HarnessDir {
    dir: tempfile::TempDir,
}

impl HarnessDir {
    /// Empty harness with an `images/` directory and no baseline
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("images")).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn fixtures_path(&self) -> PathBuf {
        self.root().join("fixtures.json")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root().join("output")
    }

    /// Add a corpus image
    pub fn add_image(&self, name: &str, data: &[u8]) -> &Self {
        std::fs::write(self.root().join("images").join(name), data).unwrap();
        self
    }

    /// Write the baseline snapshot
    pub fn write_baseline(&self, entries: &[(&str, u64)]) -> &Self {
        let map: serde_json::Map<String, serde_json::Value> = entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), serde_json::Value::from(*v)))
            .collect();
        std::fs::write(
            self.fixtures_path(),
            serde_json::to_vec_pretty(&serde_json::Value::Object(map)).unwrap(),
        )
        .unwrap();
        self
    }

    pub fn read_baseline(&self) -> String {
        std::fs::read_to_string(self.fixtures_path()).unwrap()
    }

    /// Config rooted at this directory
    pub fn config(&self) -> HarnessConfig {
        HarnessConfig::new().with_root(self.root())
    }

    /// Config selecting a single image
    pub fn config_for(&self, name: &str) -> HarnessConfig {
        self.config()
            .with_filter(CorpusFilter::Exact(name.to_string()))
    }
}

impl Default for HarnessDir {
    fn default() -> Self {
        Self::new()
    }
}
