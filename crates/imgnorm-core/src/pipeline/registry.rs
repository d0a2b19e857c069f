//! Registry of decodable input formats.
//!
//! Built once when a [`crate::Normalizer`] is created: the formats this build
//! of `image` can read, narrowed to the extensions listed in
//! `processing.supported_formats`. Anything outside the registry decodes to
//! `UnsupportedFormat`.

use image::ImageFormat;
use std::sync::OnceLock;

use crate::config::ProcessingSection;

/// Formats the linked `image` build can decode, probed once per process.
fn readable_formats() -> &'static [ImageFormat] {
    static READABLE: OnceLock<Vec<ImageFormat>> = OnceLock::new();
    READABLE.get_or_init(|| {
        ImageFormat::all()
            .filter(|format| format.reading_enabled())
            .collect()
    })
}

/// Set of input formats the decoder accepts.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    formats: Vec<ImageFormat>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FormatRegistry {
    /// Every format the linked decoders can read.
    pub fn builtin() -> Self {
        Self {
            formats: readable_formats().to_vec(),
        }
    }

    /// Readable formats restricted to the given extensions.
    ///
    /// Unknown extensions and formats without a compiled-in decoder are
    /// ignored rather than treated as errors.
    pub fn from_extensions<S: AsRef<str>>(extensions: &[S]) -> Self {
        let mut formats: Vec<ImageFormat> = Vec::new();
        for ext in extensions {
            let Some(format) = ImageFormat::from_extension(ext.as_ref().trim()) else {
                tracing::debug!("Ignoring unknown format extension {:?}", ext.as_ref());
                continue;
            };
            if !readable_formats().contains(&format) {
                tracing::debug!("No decoder compiled in for {:?}, skipping", format);
                continue;
            }
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        Self { formats }
    }

    /// Build the registry from the `[processing]` config section.
    pub fn from_config(config: &ProcessingSection) -> Self {
        let registry = Self::from_extensions(&config.supported_formats);
        tracing::debug!(
            "Format registry: {}",
            registry
                .formats
                .iter()
                .map(|f| format_name(*f))
                .collect::<Vec<_>>()
                .join(", ")
        );
        registry
    }

    /// Whether content sniffed as `format` may be decoded.
    pub fn supports(&self, format: ImageFormat) -> bool {
        self.formats.contains(&format)
    }

    /// Whether a file extension maps to a registered format.
    pub fn supports_extension(&self, ext: &str) -> bool {
        ImageFormat::from_extension(ext).is_some_and(|format| self.supports(format))
    }

    /// Registered formats, in registration order.
    pub fn formats(&self) -> &[ImageFormat] {
        &self.formats
    }
}

/// Lowercase name of an image format for logs and error messages.
pub fn format_name(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::WebP => "webp",
        ImageFormat::Gif => "gif",
        ImageFormat::Tiff => "tiff",
        ImageFormat::Bmp => "bmp",
        ImageFormat::Ico => "ico",
        ImageFormat::Pnm => "pnm",
        ImageFormat::Avif => "avif",
        ImageFormat::Qoi => "qoi",
        _ => "unknown",
    }
}
