//! Content-sniffed image decoding to RGBA.

use image::{ImageError, ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;

use crate::config::LimitsConfig;
use crate::error::{ItemError, ItemResult};

use super::registry::{format_name, FormatRegistry};

/// Image decoder with a format registry and size limits.
pub struct ImageDecoder {
    registry: Arc<FormatRegistry>,
    limits: LimitsConfig,
}

/// Result of decoding an image.
///
/// Pixels are always RGBA8; sources without alpha come out fully opaque.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// The decoded pixels
    pub image: RgbaImage,
    /// Format sniffed from the content
    pub format: ImageFormat,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

impl ImageDecoder {
    /// Create a new decoder with the given registry and limits.
    pub fn new(registry: Arc<FormatRegistry>, limits: LimitsConfig) -> Self {
        Self { registry, limits }
    }

    /// Decode an in-memory blob.
    ///
    /// `name` is used for diagnostics only; the format always comes from the
    /// content, so a PNG named `photo.jpg` still decodes as PNG.
    pub fn decode(&self, bytes: &[u8], name: &str) -> ItemResult<DecodedImage> {
        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if bytes.len() as u64 > max_bytes {
            return Err(ItemError::TooLarge {
                name: name.to_string(),
                detail: format!(
                    "{}MB > {}MB",
                    bytes.len() as u64 / (1024 * 1024),
                    self.limits.max_file_size_mb
                ),
            });
        }

        let format = image::guess_format(bytes).map_err(|_| ItemError::UnsupportedFormat {
            name: name.to_string(),
            format: declared_extension(name),
        })?;
        if !self.registry.supports(format) {
            return Err(ItemError::UnsupportedFormat {
                name: name.to_string(),
                format: format_name(format).to_string(),
            });
        }

        let mut limits = image::Limits::default();
        limits.max_image_width = Some(self.limits.max_image_dimension);
        limits.max_image_height = Some(self.limits.max_image_dimension);

        let mut reader = ImageReader::with_format(Cursor::new(bytes), format);
        reader.limits(limits);

        let image = reader.decode().map_err(|e| match e {
            ImageError::Limits(_) => ItemError::TooLarge {
                name: name.to_string(),
                detail: format!(
                    "exceeds {} px on an axis",
                    self.limits.max_image_dimension
                ),
            },
            other => ItemError::Decode {
                name: name.to_string(),
                message: other.to_string(),
            },
        })?;

        tracing::trace!(
            "Decoded {} as {} ({}x{})",
            name,
            format_name(format),
            image.width(),
            image.height()
        );

        Ok(DecodedImage {
            image: image.into_rgba8(),
            format,
        })
    }
}

/// Extension of a declared file name, for error messages.
fn declared_extension(name: &str) -> String {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "unknown".to_string())
}
