//! Harness configuration
//!
//! Defaults mirror the conventional layout of a harness directory:
//!
//! ```text
//! <root>/
//!   images/         corpus
//!   fixtures.json   baseline snapshot
//!   output/         transcoded artifacts
//! ```
//!
//! A TOML file may override any field; CLI flags override the file.

use crate::corpus::CorpusFilter;
use crate::error::ConfigError;
use crate::fixture::ExtensionTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Directory relative paths resolve against
    pub root: PathBuf,
    /// Corpus directory
    pub corpus_dir: PathBuf,
    /// Baseline snapshot file
    #[serde(rename = "fixtures")]
    pub fixtures_path: PathBuf,
    /// Artifact output directory
    pub output_dir: PathBuf,
    /// Rewrite the baseline at the end of the run
    pub update_fixtures: bool,
    /// Extra format → extension mappings on top of the defaults
    pub extensions: BTreeMap<String, String>,
    /// Corpus selection
    #[serde(skip)]
    pub filter: CorpusFilter,
}

impl HarnessConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// - `ConfigError::Parse` on invalid TOML or unknown fields
    pub fn from_toml_str(path: impl Into<PathBuf>, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.into(),
            source,
        })
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Read` if the file cannot be read
    /// - `ConfigError::Parse` on invalid contents
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(path, &text)
    }

    /// With root directory
    #[inline]
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// With corpus directory
    #[inline]
    #[must_use]
    pub fn with_corpus_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.corpus_dir = dir.into();
        self
    }

    /// With baseline snapshot path
    #[inline]
    #[must_use]
    pub fn with_fixtures_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.fixtures_path = path.into();
        self
    }

    /// With artifact output directory
    #[inline]
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// With baseline-update mode
    #[inline]
    #[must_use]
    pub fn with_update_fixtures(mut self, update: bool) -> Self {
        self.update_fixtures = update;
        self
    }

    /// With corpus filter
    #[inline]
    #[must_use]
    pub fn with_filter(mut self, filter: CorpusFilter) -> Self {
        self.filter = filter;
        self
    }

    /// With an extra format → extension mapping
    #[inline]
    #[must_use]
    pub fn with_extension(mut self, format: impl Into<String>, extension: impl Into<String>) -> Self {
        self.extensions.insert(format.into(), extension.into());
        self
    }

    /// Resolved corpus directory
    #[inline]
    #[must_use]
    pub fn corpus_path(&self) -> PathBuf {
        self.root.join(&self.corpus_dir)
    }

    /// Resolved baseline snapshot path
    #[inline]
    #[must_use]
    pub fn fixtures_file(&self) -> PathBuf {
        self.root.join(&self.fixtures_path)
    }

    /// Resolved artifact directory
    #[inline]
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output_dir)
    }

    /// Extension table: defaults plus configured mappings
    #[must_use]
    pub fn extension_table(&self) -> ExtensionTable {
        self.extensions
            .iter()
            .fold(ExtensionTable::default(), |table, (format, ext)| {
                table.with_mapping(format, ext)
            })
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            corpus_dir: PathBuf::from("images"),
            fixtures_path: PathBuf::from("fixtures.json"),
            output_dir: PathBuf::from("output"),
            update_fixtures: false,
            extensions: BTreeMap::new(),
            filter: CorpusFilter::All,
        }
    }
}
