//! Output encoding: lossy WebP, lossless PNG and flattened JPEG.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ItemError, ItemResult};

/// Target encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    #[serde(alias = "WebP")]
    WebP,
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::WebP => "webp",
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            OutputFormat::WebP => "image/webp",
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webp" => Ok(OutputFormat::WebP),
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            other => Err(format!("unsupported output format: {other}")),
        }
    }
}

/// Serializes final bitmaps.
pub struct Encoder;

impl Encoder {
    /// Encode `image` to `format`.
    ///
    /// `quality` only applies to lossy formats. `flatten_onto` is the opaque
    /// background used when the format has no alpha channel.
    pub fn encode(
        image: &RgbaImage,
        format: OutputFormat,
        quality: u8,
        flatten_onto: [u8; 3],
        name: &str,
    ) -> ItemResult<Vec<u8>> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ItemError::Encode {
                name: name.to_string(),
                message: format!("cannot encode an empty {width}x{height} image"),
            });
        }

        let encode_err = |message: String| ItemError::Encode {
            name: name.to_string(),
            message,
        };

        match format {
            OutputFormat::WebP => {
                let encoder = webp::Encoder::from_rgba(image.as_raw(), width, height);
                let memory = encoder
                    .encode_simple(false, quality.min(100) as f32)
                    .map_err(|e| encode_err(format!("WebP encoding failed: {e:?}")))?;
                Ok(memory.to_vec())
            }
            OutputFormat::Png => {
                let mut buf = Vec::new();
                PngEncoder::new(&mut buf)
                    .write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)
                    .map_err(|e| encode_err(e.to_string()))?;
                Ok(buf)
            }
            OutputFormat::Jpeg => {
                let flat = flatten(image, flatten_onto);
                let mut buf = Vec::new();
                JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
                    .write_image(flat.as_raw(), width, height, ExtendedColorType::Rgb8)
                    .map_err(|e| encode_err(e.to_string()))?;
                Ok(buf)
            }
        }
    }
}

/// Alpha-blend every pixel onto an opaque `background`.
pub fn flatten(image: &RgbaImage, background: [u8; 3]) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut out = RgbImage::new(width, height);
    for (src, dst) in image.pixels().zip(out.pixels_mut()) {
        let [r, g, b, a] = src.0;
        let a = a as u32;
        let mix = |fg: u8, bg: u8| ((fg as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8;
        *dst = Rgb([
            mix(r, background[0]),
            mix(g, background[1]),
            mix(b, background[2]),
        ]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};

    const WHITE: [u8; 3] = [255, 255, 255];

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7) as u8, (y * 5) as u8, ((x + y) * 3) as u8, (x * 11 + y) as u8])
        })
    }

    #[test]
    fn test_png_roundtrip_is_pixel_exact() {
        let image = gradient(23, 17);
        let bytes = Encoder::encode(&image, OutputFormat::Png, 0, WHITE, "g.png").unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
            .unwrap()
            .into_rgba8();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_webp_output_is_riff() {
        let image = gradient(32, 32);
        let bytes = Encoder::encode(&image, OutputFormat::WebP, 80, WHITE, "g.png").unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 32));
    }

    #[test]
    fn test_webp_quality_changes_size() {
        let image = RgbaImage::from_fn(128, 128, |x, y| {
            Rgba([(x * y % 251) as u8, (x * 3 + y) as u8, (y * 7) as u8, 255])
        });
        let low = Encoder::encode(&image, OutputFormat::WebP, 10, WHITE, "a").unwrap();
        let high = Encoder::encode(&image, OutputFormat::WebP, 95, WHITE, "a").unwrap();
        assert!(low.len() < high.len(), "{} >= {}", low.len(), high.len());
    }

    #[test]
    fn test_jpeg_flattens_transparency_to_white() {
        let image = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 0]));
        let bytes = Encoder::encode(&image, OutputFormat::Jpeg, 95, WHITE, "t.png").unwrap();
        assert_eq!(&bytes[0..3], &[0xFF, 0xD8, 0xFF]);
        let decoded = image::load_from_memory(&bytes).unwrap().into_rgb8();
        assert!(decoded.pixels().all(|p| p.0.iter().all(|c| *c >= 250)));
    }

    #[test]
    fn test_flatten_blends_partial_alpha() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128]));
        let flat = flatten(&image, WHITE);
        assert_eq!(flat.get_pixel(0, 0).0, [127, 127, 127]);

        let opaque = RgbaImage::from_pixel(1, 1, Rgba([9, 8, 7, 255]));
        assert_eq!(flatten(&opaque, WHITE).get_pixel(0, 0).0, [9, 8, 7]);
    }

    #[test]
    fn test_empty_image_is_encode_error() {
        let image = RgbaImage::new(0, 5);
        for format in [OutputFormat::WebP, OutputFormat::Png, OutputFormat::Jpeg] {
            let err = Encoder::encode(&image, format, 90, WHITE, "empty").unwrap_err();
            assert!(matches!(err, ItemError::Encode { .. }));
        }
    }

    #[test]
    fn test_output_format_parse_and_metadata() {
        assert_eq!("JPG".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg));
        assert_eq!("webp".parse::<OutputFormat>(), Ok(OutputFormat::WebP));
        assert!("gif".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::WebP.mime(), "image/webp");
    }
}
