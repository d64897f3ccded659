//! Fixture keys and size maps
//!
//! A fixture key names one (image, variant) result:
//! `{image}-{variant}.{extension}`, where the extension is the transcoder's
//! resolved output format passed through an [`ExtensionTable`].

use crate::transcode::ImageResults;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Maps transcoder format identifiers to public file extensions
///
/// Identifiers without an entry are used verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionTable {
    overrides: BTreeMap<String, String>,
}

impl ExtensionTable {
    /// Table with no remapping
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self {
            overrides: BTreeMap::new(),
        }
    }

    /// With an extra format → extension mapping
    #[inline]
    #[must_use]
    pub fn with_mapping(mut self, format: impl Into<String>, extension: impl Into<String>) -> Self {
        self.overrides.insert(format.into(), extension.into());
        self
    }

    /// Public extension for a resolved format
    #[inline]
    #[must_use]
    pub fn extension_for<'a>(&'a self, format: &'a str) -> &'a str {
        self.overrides.get(format).map_or(format, String::as_str)
    }
}

impl Default for ExtensionTable {
    /// HEIF-container output is published as AVIF
    fn default() -> Self {
        Self::empty().with_mapping("heif", "avif")
    }
}

/// Deterministic identifier for one (image, variant) result
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixtureKey(String);

impl FixtureKey {
    /// Compose key from image name, variant name and resolved format
    #[must_use]
    pub fn new(image: &str, variant: &str, format: &str, extensions: &ExtensionTable) -> Self {
        Self(format!(
            "{image}-{variant}.{}",
            extensions.extension_for(format)
        ))
    }

    /// Key as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FixtureKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FixtureKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FixtureKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Fixture key → byte size, iterated in key order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixtureMap {
    entries: BTreeMap<FixtureKey, u64>,
}

impl FixtureMap {
    /// Create empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge per-image results into one map
    #[must_use]
    pub fn from_results(results: &[ImageResults], extensions: &ExtensionTable) -> Self {
        let mut map = Self::new();
        for image in results {
            for (key, result) in image.fixture_entries(extensions) {
                if let Some(previous) = map.insert(key.clone(), result.size()) {
                    tracing::warn!(%key, previous, "fixture key produced twice, keeping latest");
                }
            }
        }
        map
    }

    /// Insert size, returning the previous size for the key
    #[inline]
    pub fn insert(&mut self, key: impl Into<FixtureKey>, size: u64) -> Option<u64> {
        self.entries.insert(key.into(), size)
    }

    /// Size recorded for key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &FixtureKey) -> Option<u64> {
        self.entries.get(key).copied()
    }

    /// Check if key has a recorded size
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &FixtureKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&FixtureKey, u64)> {
        self.entries.iter().map(|(k, v)| (k, *v))
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<FixtureKey>> FromIterator<(K, u64)> for FixtureMap {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcode::TranscodeResult;
    use indexmap::IndexMap;

    #[test]
    fn key_uses_resolved_format() {
        let table = ExtensionTable::default();
        let key = FixtureKey::new("a.jpg", "small", "jpeg", &table);
        assert_eq!(key.as_str(), "a.jpg-small.jpeg");
    }

    #[test]
    fn key_remaps_heif() {
        let table = ExtensionTable::default();
        let key = FixtureKey::new("a.jpg", "avif", "heif", &table);
        assert_eq!(key.to_string(), "a.jpg-avif.avif");
    }

    #[test]
    fn key_is_deterministic() {
        let table = ExtensionTable::default();
        let first = FixtureKey::new("photo.png", "webp", "webp", &table);
        let second = FixtureKey::new("photo.png", "webp", "webp", &table);
        assert_eq!(first, second);
    }

    #[test]
    fn extension_table_is_extendable() {
        let table = ExtensionTable::default().with_mapping("jpg", "jpeg");
        assert_eq!(table.extension_for("jpg"), "jpeg");
        assert_eq!(table.extension_for("heif"), "avif");
        assert_eq!(table.extension_for("png"), "png");
    }

    #[test]
    fn map_iterates_in_key_order() {
        let map: FixtureMap = [("b.png-small.png", 2), ("a.jpg-small.jpeg", 1)]
            .into_iter()
            .collect();
        let keys: Vec<_> = map.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["a.jpg-small.jpeg", "b.png-small.png"]);
    }

    #[test]
    fn map_serializes_as_plain_object() {
        let map: FixtureMap = [("a.jpg-small.jpeg", 1000)].into_iter().collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"a.jpg-small.jpeg":1000}"#);

        let back: FixtureMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn from_results_merges_disjoint_images() {
        let mut a = IndexMap::new();
        a.insert("small".to_string(), TranscodeResult::new(vec![0; 10], "jpeg"));
        let mut b = IndexMap::new();
        b.insert("small".to_string(), TranscodeResult::new(vec![0; 20], "png"));
        b.insert("avif".to_string(), TranscodeResult::new(vec![0; 5], "heif"));

        let results = [
            ImageResults {
                image_name: "a.jpg".to_string(),
                source_size: 100,
                results: a,
            },
            ImageResults {
                image_name: "b.png".to_string(),
                source_size: 200,
                results: b,
            },
        ];

        let map = FixtureMap::from_results(&results, &ExtensionTable::default());
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&"a.jpg-small.jpeg".into()), Some(10));
        assert_eq!(map.get(&"b.png-small.png".into()), Some(20));
        assert_eq!(map.get(&"b.png-avif.avif".into()), Some(5));
    }
}
