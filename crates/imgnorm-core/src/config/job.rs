//! The per-batch transform chain.
//!
//! A [`ProcessingConfig`] is built once per batch and shared read-only by
//! every worker behind an `Arc`. The `[job]` section of the config file holds
//! the default one.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::pipeline::hash::Hasher;
use crate::pipeline::{Anchor, NamingMode, OutputFormat};

/// Requested transform chain for one batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Target encoding
    pub output_format: OutputFormat,

    /// Lossy quality 0-100 (WebP and JPEG only)
    pub quality: u8,

    /// Crop transparent margins before anything else
    pub trim: bool,

    /// Pad to a square with transparent margins
    pub square_pad: bool,

    /// Margin added on each side, as a fraction of the longest edge (0.0-0.5)
    pub padding_ratio: f32,

    /// Letterbox onto a fixed canvas
    pub fixed_canvas: Option<Canvas>,

    /// Opaque letterbox background
    pub canvas_background: [u8; 3],

    /// Background transparency is flattened onto for formats without alpha
    pub flatten_background: [u8; 3],

    /// Logo overlay settings
    pub logo: LogoSettings,

    /// Decoded logo, supplied per batch rather than from the config file
    #[serde(skip)]
    pub logo_image: Option<Arc<Logo>>,

    /// Output file naming
    pub naming: NamingMode,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::WebP,
            quality: 90,
            trim: true,
            square_pad: false,
            padding_ratio: 0.0,
            fixed_canvas: None,
            canvas_background: [248, 250, 252],
            flatten_background: [255, 255, 255],
            logo: LogoSettings::default(),
            logo_image: None,
            naming: NamingMode::KeepOriginal,
        }
    }
}

impl ProcessingConfig {
    /// Attach a decoded logo and switch the overlay on.
    pub fn with_logo(mut self, logo: Arc<Logo>) -> Self {
        self.logo.enabled = true;
        self.logo_image = Some(logo);
        self
    }

    /// The logo to overlay, if the overlay is enabled and a logo is present.
    pub fn active_logo(&self) -> Option<&Logo> {
        if self.logo.enabled {
            self.logo_image.as_deref()
        } else {
            None
        }
    }
}

/// Target canvas for letterboxing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parse a `WIDTHxHEIGHT` string such as `250x250`.
    pub fn parse(s: &str) -> Option<Self> {
        let (w, h) = s.trim().split_once(['x', 'X'])?;
        let width = w.trim().parse().ok()?;
        let height = h.trim().parse().ok()?;
        Some(Self::new(width, height))
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Logo overlay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoSettings {
    /// Whether the overlay step runs
    pub enabled: bool,

    /// Logo width as a fraction of the target width (0.0-1.0]
    pub size_ratio: f32,

    /// Where the logo is placed
    pub anchor: Anchor,

    /// Distance from the anchored edges in pixels
    pub padding_px: u32,
}

impl Default for LogoSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            size_ratio: 0.15,
            anchor: Anchor::BottomRight,
            padding_px: 20,
        }
    }
}

/// A decoded logo shared by every task in a batch.
pub struct Logo {
    image: RgbaImage,
    content_hash: String,
}

impl Logo {
    /// Wrap a decoded RGBA logo, fingerprinting its pixels.
    pub fn new(image: RgbaImage) -> Self {
        let mut data = Vec::with_capacity(8 + image.as_raw().len());
        data.extend_from_slice(&image.width().to_le_bytes());
        data.extend_from_slice(&image.height().to_le_bytes());
        data.extend_from_slice(image.as_raw());
        let content_hash = Hasher::content_hash(&data);
        Self {
            image,
            content_hash,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// BLAKE3 hash of dimensions and pixels.
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }
}

impl fmt::Debug for Logo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logo")
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .field("content_hash", &self.content_hash)
            .finish()
    }
}
