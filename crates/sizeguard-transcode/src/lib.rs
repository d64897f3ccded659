//! In-process image transcoder
//!
//! [`ImageTranscoder`] implements [`Transcoder`] on top of the `image` crate:
//!
//! | Request | Behavior |
//! |---------|----------|
//! | identity | source bytes returned untouched, format detected |
//! | width | Lanczos3 downscale preserving aspect ratio, never enlarged |
//! | forced WebP | lossless WebP |
//! | forced AVIF | AVIF, reported as `heif` |
//!
//! Decoding and encoding are CPU bound and run on the blocking pool so
//! concurrently submitted variants make progress in parallel.

#![warn(unreachable_pub)]

use async_trait::async_trait;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use sizeguard_core::{Codec, TranscodeError, TranscodeOptions, TranscodeResult, Transcoder};
use std::io::Cursor;

/// Default JPEG quality
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Default AVIF quality
pub const DEFAULT_AVIF_QUALITY: u8 = 70;

/// Default AVIF encoder speed (1 slowest, 10 fastest)
pub const DEFAULT_AVIF_SPEED: u8 = 8;

/// Transcoder backed by the `image` crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageTranscoder {
    jpeg_quality: u8,
    avif_quality: u8,
    avif_speed: u8,
}

impl ImageTranscoder {
    /// Create transcoder with default encoder settings
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            avif_quality: DEFAULT_AVIF_QUALITY,
            avif_speed: DEFAULT_AVIF_SPEED,
        }
    }

    /// With JPEG quality (1-100)
    #[inline]
    #[must_use]
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// With AVIF quality (1-100)
    #[inline]
    #[must_use]
    pub fn with_avif_quality(mut self, quality: u8) -> Self {
        self.avif_quality = quality.clamp(1, 100);
        self
    }

    /// With AVIF encoder speed (1-10)
    #[inline]
    #[must_use]
    pub fn with_avif_speed(mut self, speed: u8) -> Self {
        self.avif_speed = speed.clamp(1, 10);
        self
    }

    /// Synchronous transcode
    ///
    /// # Errors
    /// - `TranscodeError::InvalidOptions` for conflicting codecs or a zero width
    /// - `TranscodeError::Decode` if the source is not a supported image
    /// - `TranscodeError::Encode` if the output cannot be encoded
    pub fn transcode_blocking(
        &self,
        source: &[u8],
        options: &TranscodeOptions,
    ) -> Result<TranscodeResult, TranscodeError> {
        if options.has_conflicting_codecs() {
            return Err(TranscodeError::InvalidOptions(
                "webp and avif cannot both be forced".to_string(),
            ));
        }
        if options.width == Some(0) {
            return Err(TranscodeError::InvalidOptions("width must be positive".to_string()));
        }

        let source_format = detect_format(source)?;
        if options.is_identity() {
            return Ok(TranscodeResult::new(source.to_vec(), format_name(source_format)));
        }

        let decoded = image::load_from_memory_with_format(source, source_format)
            .map_err(|e| TranscodeError::Decode(e.to_string()))?;
        let resized = match options.width {
            Some(width) => downscale(decoded, width),
            None => decoded,
        };

        let (data, format) = match options.forced_codec() {
            Some(Codec::Webp) => (self.encode_webp(&resized)?, "webp"),
            Some(Codec::Avif) => (self.encode_avif(&resized)?, "heif"),
            None => (
                self.encode_as(&resized, source_format)?,
                format_name(source_format),
            ),
        };

        tracing::trace!(
            format,
            width = resized.width(),
            height = resized.height(),
            bytes = data.len(),
            "encoded"
        );
        Ok(TranscodeResult::new(data, format))
    }

    fn encode_as(&self, img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, TranscodeError> {
        let name = format_name(format);
        let mut buf = Vec::new();
        match format {
            ImageFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buf, self.jpeg_quality);
                DynamicImage::ImageRgb8(img.to_rgb8())
                    .write_with_encoder(encoder)
                    .map_err(|e| encode_error(name, &e))?;
            }
            ImageFormat::WebP => return self.encode_webp(img),
            ImageFormat::Gif => {
                DynamicImage::ImageRgba8(img.to_rgba8())
                    .write_to(&mut Cursor::new(&mut buf), ImageFormat::Gif)
                    .map_err(|e| encode_error(name, &e))?;
            }
            _ => {
                img.write_to(&mut Cursor::new(&mut buf), format)
                    .map_err(|e| encode_error(name, &e))?;
            }
        }
        Ok(buf)
    }

    #[allow(clippy::unused_self)]
    fn encode_webp(&self, img: &DynamicImage) -> Result<Vec<u8>, TranscodeError> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img.to_rgba8())
            .write_with_encoder(WebPEncoder::new_lossless(&mut buf))
            .map_err(|e| encode_error("webp", &e))?;
        Ok(buf)
    }

    fn encode_avif(&self, img: &DynamicImage) -> Result<Vec<u8>, TranscodeError> {
        let mut buf = Vec::new();
        let encoder = AvifEncoder::new_with_speed_quality(&mut buf, self.avif_speed, self.avif_quality);
        DynamicImage::ImageRgba8(img.to_rgba8())
            .write_with_encoder(encoder)
            .map_err(|e| encode_error("heif", &e))?;
        Ok(buf)
    }
}

impl Default for ImageTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transcoder for ImageTranscoder {
    async fn transcode(
        &self,
        source: &[u8],
        options: &TranscodeOptions,
    ) -> Result<TranscodeResult, TranscodeError> {
        let this = *self;
        let source = source.to_vec();
        let options = *options;
        tokio::task::spawn_blocking(move || this.transcode_blocking(&source, &options))
            .await
            .map_err(|e| TranscodeError::Worker(e.to_string()))?
    }
}

/// Detect a supported source format
fn detect_format(source: &[u8]) -> Result<ImageFormat, TranscodeError> {
    let format =
        image::guess_format(source).map_err(|e| TranscodeError::Decode(e.to_string()))?;
    match format {
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Gif | ImageFormat::WebP => Ok(format),
        other => Err(TranscodeError::Decode(format!(
            "unsupported source format {other:?}"
        ))),
    }
}

/// Format name as reported in transcode info
fn format_name(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::Gif => "gif",
        ImageFormat::WebP => "webp",
        _ => "unknown",
    }
}

/// Scale to `width` keeping aspect ratio; images already narrower are kept
fn downscale(img: DynamicImage, width: u32) -> DynamicImage {
    if img.width() <= width {
        return img;
    }
    let height = (u64::from(img.height()) * u64::from(width) + u64::from(img.width()) / 2)
        / u64::from(img.width());
    let height = u32::try_from(height.max(1)).unwrap_or(u32::MAX);
    img.resize_exact(width, height, FilterType::Lanczos3)
}

fn encode_error(format: &str, err: &image::ImageError) -> TranscodeError {
    TranscodeError::Encode {
        format: format.to_string(),
        message: err.to_string(),
    }
}
