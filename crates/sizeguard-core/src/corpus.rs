//! Corpus source
//!
//! A directory of named source images. Names are the corpus-relative file
//! names and become the first segment of every fixture key.

use crate::error::CorpusError;
use std::path::{Path, PathBuf};

/// A source image, immutable once loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Corpus-relative name
    pub name: String,
    /// Raw source bytes
    pub data: Vec<u8>,
}

impl Image {
    /// Create image from name and bytes
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Source size in bytes
    #[inline]
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Which corpus images a run selects
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorpusFilter {
    /// Every image
    #[default]
    All,
    /// The image with exactly this file name, if present
    Exact(String),
}

impl CorpusFilter {
    /// Filter from the positional CLI argument
    ///
    /// Values that look like flags (`--...`) select everything.
    #[must_use]
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some(name) if !name.starts_with("--") => Self::Exact(name.to_string()),
            _ => Self::All,
        }
    }

    /// Check if `name` is selected
    #[inline]
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Exact(wanted) => wanted == name,
        }
    }
}

/// Directory-backed image corpus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    dir: PathBuf,
}

impl Corpus {
    /// Corpus rooted at `dir`
    #[inline]
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Corpus directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Names of regular files in the corpus, sorted
    ///
    /// # Errors
    /// - `CorpusError::List` if the directory cannot be read
    pub async fn list(&self) -> Result<Vec<String>, CorpusError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| CorpusError::list(&self.dir, e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CorpusError::list(&self.dir, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| CorpusError::list(entry.path(), e))?;
            if !file_type.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            } else {
                tracing::warn!(path = %entry.path().display(), "skipping non UTF-8 file name");
            }
        }

        names.sort();
        Ok(names)
    }

    /// Load the selected images, in name order
    ///
    /// # Errors
    /// - `CorpusError::List` if the directory cannot be read
    /// - `CorpusError::Read` if a selected image cannot be read
    pub async fn load(&self, filter: &CorpusFilter) -> Result<Vec<Image>, CorpusError> {
        let mut images = Vec::new();
        for name in self.list().await? {
            if !filter.matches(&name) {
                continue;
            }
            let path = self.dir.join(&name);
            let data = tokio::fs::read(&path)
                .await
                .map_err(|e| CorpusError::read(&path, e))?;
            images.push(Image::new(name, data));
        }
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_from_arg() {
        assert_eq!(CorpusFilter::from_arg(None), CorpusFilter::All);
        assert_eq!(
            CorpusFilter::from_arg(Some("--update-fixtures")),
            CorpusFilter::All
        );
        assert_eq!(
            CorpusFilter::from_arg(Some("a.jpg")),
            CorpusFilter::Exact("a.jpg".to_string())
        );
    }

    #[test]
    fn exact_filter_matches_whole_name() {
        let filter = CorpusFilter::Exact("a.jpg".to_string());
        assert!(filter.matches("a.jpg"));
        assert!(!filter.matches("a.jpg.bak"));
        assert!(!filter.matches("A.jpg"));
    }

    #[tokio::test]
    async fn list_is_sorted_and_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.png"), b"b").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let corpus = Corpus::new(dir.path());
        assert_eq!(corpus.dir(), dir.path());
        assert_eq!(corpus.list().await.unwrap(), ["a.jpg", "b.png"]);
    }

    #[tokio::test]
    async fn load_applies_filter() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"aaa").unwrap();
        std::fs::write(dir.path().join("b.png"), b"bb").unwrap();

        let corpus = Corpus::new(dir.path());
        let images = corpus
            .load(&CorpusFilter::Exact("b.png".to_string()))
            .await
            .unwrap();

        assert_eq!(images, [Image::new("b.png", b"bb".to_vec())]);
    }

    #[tokio::test]
    async fn unmatched_filter_selects_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"aaa").unwrap();

        let corpus = Corpus::new(dir.path());
        let images = corpus
            .load(&CorpusFilter::Exact("nope.jpg".to_string()))
            .await
            .unwrap();
        assert!(images.is_empty());
    }

    #[tokio::test]
    async fn missing_directory_is_list_error() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = Corpus::new(dir.path().join("absent"));
        assert!(matches!(corpus.list().await, Err(CorpusError::List { .. })));
    }
}
