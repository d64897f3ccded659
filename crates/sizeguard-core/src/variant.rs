//! Variant catalog
//!
//! The named transcode configurations applied to every corpus image. Variant
//! names are part of every fixture key, so the catalog is the contract between
//! the harness and its recorded baseline.

use crate::error::ConfigError;
use crate::transcode::{Codec, TranscodeOptions};
use indexmap::IndexMap;

/// Width of the `small` variant
pub const SMALL_WIDTH: u32 = 100;
/// Width of the `medium` variant
pub const MEDIUM_WIDTH: u32 = 300;
/// Width of the `large` variant and of the forced-codec variants
pub const LARGE_WIDTH: u32 = 700;

/// A named transcode configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Stable variant name
    pub name: String,
    /// Options passed to the transcoder
    pub options: TranscodeOptions,
}

impl Variant {
    /// Create new variant
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, options: TranscodeOptions) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }

    /// Variant passes the source through untouched
    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.options.is_identity()
    }

    /// Variant only resizes, keeping the source codec
    #[inline]
    #[must_use]
    pub fn is_width_only(&self) -> bool {
        self.options.width.is_some() && self.options.forced_codec().is_none()
    }
}

/// Ordered, read-only set of variants keyed by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantCatalog {
    variants: IndexMap<String, Variant>,
}

impl VariantCatalog {
    /// The catalog every run uses: identity, three widths, two forced codecs
    #[must_use]
    pub fn standard() -> Self {
        let variants = [
            Variant::new("original", TranscodeOptions::identity()),
            Variant::new("small", TranscodeOptions::width(SMALL_WIDTH)),
            Variant::new("medium", TranscodeOptions::width(MEDIUM_WIDTH)),
            Variant::new("large", TranscodeOptions::width(LARGE_WIDTH)),
            Variant::new("webp", TranscodeOptions::width(LARGE_WIDTH).with_codec(Codec::Webp)),
            Variant::new("avif", TranscodeOptions::width(LARGE_WIDTH).with_codec(Codec::Avif)),
        ];

        Self {
            variants: variants
                .into_iter()
                .map(|v| (v.name.clone(), v))
                .collect(),
        }
    }

    /// Build a catalog from variants in order
    ///
    /// # Errors
    /// - `ConfigError::InvalidCatalog` on a duplicate name or a contract violation
    pub fn from_variants(variants: impl IntoIterator<Item = Variant>) -> Result<Self, ConfigError> {
        let mut map = IndexMap::new();
        for variant in variants {
            if map.contains_key(&variant.name) {
                return Err(ConfigError::InvalidCatalog(format!(
                    "duplicate variant name '{}'",
                    variant.name
                )));
            }
            map.insert(variant.name.clone(), variant);
        }

        let catalog = Self { variants: map };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check the catalog contract
    ///
    /// # Errors
    /// - `ConfigError::InvalidCatalog` describing the first violation found
    pub fn validate(&self) -> Result<(), ConfigError> {
        let identities = self.variants.values().filter(|v| v.is_identity()).count();
        if identities != 1 {
            return Err(ConfigError::InvalidCatalog(format!(
                "expected exactly one identity variant, found {identities}"
            )));
        }

        let widths: Vec<u32> = self.width_variants().filter_map(|v| v.options.width).collect();
        if widths.is_empty() {
            return Err(ConfigError::InvalidCatalog(
                "no width-only variants".to_string(),
            ));
        }
        if widths.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::InvalidCatalog(format!(
                "width-only variants must have strictly increasing widths, got {widths:?}"
            )));
        }

        let largest = widths[widths.len() - 1];
        let mut codecs = Vec::new();
        for variant in self.codec_variants() {
            if variant.options.has_conflicting_codecs() {
                return Err(ConfigError::InvalidCatalog(format!(
                    "variant '{}' forces more than one codec",
                    variant.name
                )));
            }
            if variant.options.width != Some(largest) {
                return Err(ConfigError::InvalidCatalog(format!(
                    "variant '{}' must resize to the largest width {largest}",
                    variant.name
                )));
            }
            let codec = variant.options.forced_codec();
            if codecs.contains(&codec) {
                return Err(ConfigError::InvalidCatalog(format!(
                    "variant '{}' repeats a forced codec",
                    variant.name
                )));
            }
            codecs.push(codec);
        }

        Ok(())
    }

    /// Look up variant by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Variant> {
        self.variants.get(name)
    }

    /// Iterate variants in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.variants.values()
    }

    /// Variant names in catalog order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }

    /// The pass-through variant
    #[must_use]
    pub fn identity_variant(&self) -> Option<&Variant> {
        self.iter().find(|v| v.is_identity())
    }

    /// Width-only resizes in catalog order
    pub fn width_variants(&self) -> impl Iterator<Item = &Variant> {
        self.iter().filter(|v| v.is_width_only())
    }

    /// Forced-codec variants in catalog order
    pub fn codec_variants(&self) -> impl Iterator<Item = &Variant> {
        self.iter().filter(|v| v.options.forced_codec().is_some())
    }

    /// Width-only variant with the largest target width
    #[must_use]
    pub fn largest_width_variant(&self) -> Option<&Variant> {
        self.width_variants().max_by_key(|v| v.options.width)
    }

    /// Number of variants
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

impl Default for VariantCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
