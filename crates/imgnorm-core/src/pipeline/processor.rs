//! Per-item orchestration: decode, trim, composite, encode.

use std::time::Instant;

use crate::config::ProcessingConfig;
use crate::error::ItemResult;
use crate::types::InputItem;

use super::compose::Compositor;
use super::decode::ImageDecoder;
use super::encode::Encoder;
use super::trim::Trimmer;

/// Encoded bytes for one item, before naming.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Runs the full transform chain for a single input item.
///
/// Synchronous and CPU bound; the batch coordinator runs it on the blocking
/// pool.
pub struct ItemProcessor {
    decoder: ImageDecoder,
}

impl ItemProcessor {
    pub fn new(decoder: ImageDecoder) -> Self {
        Self { decoder }
    }

    /// Process one item through the chain described by `config`.
    ///
    /// Steps run in a fixed order: trim, square-pad, letterbox, logo, encode.
    /// Disabled steps are skipped.
    pub fn process(&self, item: &InputItem, config: &ProcessingConfig) -> ItemResult<EncodedImage> {
        let start = Instant::now();
        tracing::debug!("Processing: {:?}", item.name);

        let decode_start = Instant::now();
        let decoded = self.decoder.decode(&item.bytes, &item.name)?;
        tracing::trace!("  Decode: {:?}", decode_start.elapsed());

        let (source_w, source_h) = (decoded.width(), decoded.height());
        let mut image = decoded.image;

        if config.trim {
            let trim_start = Instant::now();
            image = Trimmer::trim(image);
            tracing::trace!("  Trim: {:?}", trim_start.elapsed());
        }

        if config.square_pad {
            let pad_start = Instant::now();
            image = Compositor::square_pad(&image, config.padding_ratio);
            tracing::trace!("  Square pad: {:?}", pad_start.elapsed());
        }

        if let Some(canvas) = config.fixed_canvas {
            let canvas_start = Instant::now();
            image = Compositor::letterbox(&image, canvas, config.canvas_background);
            tracing::trace!("  Letterbox: {:?}", canvas_start.elapsed());
        }

        if let Some(logo) = config.active_logo() {
            let logo_start = Instant::now();
            Compositor::overlay_logo(&mut image, logo.image(), &config.logo);
            tracing::trace!("  Logo: {:?}", logo_start.elapsed());
        }

        let encode_start = Instant::now();
        let bytes = Encoder::encode(
            &image,
            config.output_format,
            config.quality,
            config.flatten_background,
            &item.name,
        )?;
        tracing::trace!("  Encode: {:?}", encode_start.elapsed());

        tracing::debug!(
            "Processed {:?} in {:?} ({}x{} -> {}x{}, {} bytes)",
            item.name,
            start.elapsed(),
            source_w,
            source_h,
            image.width(),
            image.height(),
            bytes.len()
        );

        Ok(EncodedImage {
            bytes,
            width: image.width(),
            height: image.height(),
        })
    }
}
