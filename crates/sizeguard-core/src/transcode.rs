//! Transcoder contract and the invoker that fans work out to it
//!
//! The transcoder is an external collaborator: it receives the source buffer
//! and a variant's options and returns the encoded bytes plus metadata. The
//! invoker runs every variant of an image concurrently, and every image of a
//! run concurrently, joining once for the whole batch.

use crate::corpus::Image;
use crate::error::TranscodeError;
use crate::fixture::{ExtensionTable, FixtureKey};
use crate::variant::VariantCatalog;
use async_trait::async_trait;
use futures::future::try_join_all;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Modern output codecs a variant can force
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// WebP
    Webp,
    /// AVIF
    Avif,
}

impl Codec {
    /// Lowercase codec name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Codec::Webp => "webp",
            Codec::Avif => "avif",
        }
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options recognized by the transcoder
///
/// All fields absent means "return the source as-is".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TranscodeOptions {
    /// Target width in pixels
    pub width: Option<u32>,
    /// Force WebP output
    pub force_webp: bool,
    /// Force AVIF output
    pub force_avif: bool,
}

impl TranscodeOptions {
    /// No transform
    #[inline]
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            width: None,
            force_webp: false,
            force_avif: false,
        }
    }

    /// Resize to width, keep the source codec
    #[inline]
    #[must_use]
    pub const fn width(width: u32) -> Self {
        Self {
            width: Some(width),
            force_webp: false,
            force_avif: false,
        }
    }

    /// With forced output codec
    #[inline]
    #[must_use]
    pub const fn with_codec(mut self, codec: Codec) -> Self {
        match codec {
            Codec::Webp => self.force_webp = true,
            Codec::Avif => self.force_avif = true,
        }
        self
    }

    /// Check if these options leave the source untouched
    #[inline]
    #[must_use]
    pub const fn is_identity(&self) -> bool {
        self.width.is_none() && !self.force_webp && !self.force_avif
    }

    /// Codec forced by these options, WebP first
    #[inline]
    #[must_use]
    pub const fn forced_codec(&self) -> Option<Codec> {
        if self.force_webp {
            Some(Codec::Webp)
        } else if self.force_avif {
            Some(Codec::Avif)
        } else {
            None
        }
    }

    /// Both codecs forced at once
    #[inline]
    #[must_use]
    pub const fn has_conflicting_codecs(&self) -> bool {
        self.force_webp && self.force_avif
    }
}

/// Metadata reported alongside transcoded bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscodeInfo {
    /// Resolved output format identifier, as reported by the transcoder
    pub format: String,
    /// Reported output size in bytes
    pub size: u64,
}

/// Output of one (image, variant) transcode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeResult {
    /// Encoded output bytes
    pub data: Vec<u8>,
    /// Reported metadata
    pub info: TranscodeInfo,
}

impl TranscodeResult {
    /// Create result whose reported size is the byte length of `data`
    #[inline]
    #[must_use]
    pub fn new(data: Vec<u8>, format: impl Into<String>) -> Self {
        let size = data.len() as u64;
        Self {
            data,
            info: TranscodeInfo {
                format: format.into(),
                size,
            },
        }
    }

    /// Output size in bytes
    #[inline]
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Cross-check reported size against the produced bytes
    ///
    /// # Errors
    /// - `TranscodeError::SizeMismatch` if they disagree
    pub fn validate(&self) -> Result<(), TranscodeError> {
        let actual = self.size();
        if self.info.size == actual {
            Ok(())
        } else {
            Err(TranscodeError::SizeMismatch {
                reported: self.info.size,
                actual,
            })
        }
    }
}

/// The transcoding collaborator
///
/// Implementations must reject invalid input rather than silently degrade.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Transcode `source` according to `options`
    async fn transcode(
        &self,
        source: &[u8],
        options: &TranscodeOptions,
    ) -> Result<TranscodeResult, TranscodeError>;
}

/// All variant results for one image
#[derive(Debug, Clone)]
pub struct ImageResults {
    /// Corpus-relative image name
    pub image_name: String,
    /// Size of the source buffer
    pub source_size: u64,
    /// Results keyed by variant name, in catalog order
    pub results: IndexMap<String, TranscodeResult>,
}

impl ImageResults {
    /// Result for variant
    #[inline]
    #[must_use]
    pub fn get(&self, variant: &str) -> Option<&TranscodeResult> {
        self.results.get(variant)
    }

    /// Fixture keys paired with results, in catalog order
    pub fn fixture_entries<'a>(
        &'a self,
        extensions: &'a ExtensionTable,
    ) -> impl Iterator<Item = (FixtureKey, &'a TranscodeResult)> + 'a {
        self.results.iter().map(move |(variant, result)| {
            let key = FixtureKey::new(&self.image_name, variant, &result.info.format, extensions);
            (key, result)
        })
    }
}

/// Fans (image, variant) pairs out to a transcoder
#[derive(Clone, Copy)]
pub struct TranscodeInvoker<'a> {
    transcoder: &'a dyn Transcoder,
    catalog: &'a VariantCatalog,
}

impl std::fmt::Debug for TranscodeInvoker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscodeInvoker")
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl<'a> TranscodeInvoker<'a> {
    /// Create invoker over a transcoder and catalog
    #[inline]
    #[must_use]
    pub fn new(transcoder: &'a dyn Transcoder, catalog: &'a VariantCatalog) -> Self {
        Self {
            transcoder,
            catalog,
        }
    }

    /// Transcode one image through every variant concurrently
    ///
    /// # Errors
    /// - `TranscodeError::Variant` wrapping the first rejected pair; no
    ///   partial results are returned
    pub async fn transcode_image(&self, image: &Image) -> Result<ImageResults, TranscodeError> {
        let calls = self.catalog.iter().map(|variant| async move {
            tracing::debug!(image = %image.name, variant = %variant.name, "transcoding");
            let result = self
                .transcoder
                .transcode(&image.data, &variant.options)
                .await
                .and_then(|result| result.validate().map(|()| result))
                .map_err(|e| TranscodeError::for_variant(&image.name, &variant.name, e))?;
            Ok::<_, TranscodeError>((variant.name.clone(), result))
        });

        let results = try_join_all(calls).await?.into_iter().collect();

        Ok(ImageResults {
            image_name: image.name.clone(),
            source_size: image.size(),
            results,
        })
    }

    /// Transcode every image concurrently, joining once for the whole batch
    ///
    /// Results are returned in the order of `images`.
    ///
    /// # Errors
    /// - First `TranscodeError` from any image aborts the batch
    pub async fn transcode_corpus(
        &self,
        images: &[Image],
    ) -> Result<Vec<ImageResults>, TranscodeError> {
        try_join_all(images.iter().map(|image| self.transcode_image(image))).await
    }
}
