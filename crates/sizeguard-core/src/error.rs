//! Error types for the regression engine
//!
//! Provides error handling for:
//! - Corpus discovery and image reads
//! - Baseline snapshot load/persist
//! - Transcoder rejections and result validation
//! - Configuration loading
//! - Run phase transitions

use std::path::PathBuf;

/// Errors while enumerating or reading the image corpus
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    /// Corpus directory could not be listed
    #[error("io error listing corpus {path}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A corpus image could not be read
    #[error("io error reading image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CorpusError {
    /// Create list error for path
    pub fn list(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::List {
            path: path.into(),
            source,
        }
    }

    /// Create read error for path
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}

/// Errors while loading or persisting the baseline snapshot
#[derive(Debug, thiserror::Error)]
pub enum BaselineError {
    /// Snapshot file is missing or unreadable
    #[error("io error reading baseline {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot file is not a valid key → size map
    #[error("invalid baseline {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Snapshot could not be serialized
    #[error("failed to serialize baseline: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Snapshot could not be written
    #[error("io error writing baseline {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by, or about, the transcoding collaborator
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    /// Source bytes could not be decoded
    #[error("failed to decode source image: {0}")]
    Decode(String),

    /// Output could not be encoded
    #[error("failed to encode {format} output: {message}")]
    Encode { format: String, message: String },

    /// Options are not satisfiable
    #[error("invalid transcode options: {0}")]
    InvalidOptions(String),

    /// Reported size disagrees with the produced bytes
    #[error("size mismatch: reported {reported} bytes, produced {actual}")]
    SizeMismatch { reported: u64, actual: u64 },

    /// Worker executing the transcode was lost
    #[error("transcode worker failed: {0}")]
    Worker(String),

    /// A specific (image, variant) pair was rejected
    #[error("transcoding {image} as '{variant}' failed: {source}")]
    Variant {
        image: String,
        variant: String,
        #[source]
        source: Box<TranscodeError>,
    },
}

impl TranscodeError {
    /// Attach the (image, variant) pair to a collaborator error
    pub fn for_variant(
        image: impl Into<String>,
        variant: impl Into<String>,
        source: TranscodeError,
    ) -> Self {
        Self::Variant {
            image: image.into(),
            variant: variant.into(),
            source: Box::new(source),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error reading config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the harness
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Variant catalog violates its contract
    #[error("invalid variant catalog: {0}")]
    InvalidCatalog(String),
}

/// Run phase errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PhaseError {
    /// Attempted transition is not part of the run sequence
    #[error("illegal phase transition: {from:?} -> {to:?}")]
    IllegalTransition {
        from: crate::phase::RunPhase,
        to: crate::phase::RunPhase,
    },
}

/// Combined harness error
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("corpus error: {0}")]
    Corpus(#[from] CorpusError),

    #[error("baseline error: {0}")]
    Baseline(#[from] BaselineError),

    #[error("transcode error: {0}")]
    Transcode(#[from] TranscodeError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("phase error: {0}")]
    Phase(#[from] PhaseError),
}

impl HarnessError {
    /// Check if the run failed before any transcoding started
    #[inline]
    #[must_use]
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            Self::Corpus(_)
                | Self::Config(_)
                | Self::Baseline(BaselineError::Read { .. } | BaselineError::Parse { .. })
        )
    }
}

/// Result type alias for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;
