//! Named starting configurations for the common jobs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::{Canvas, LogoSettings, ProcessingConfig};
use crate::pipeline::{Anchor, NamingMode, OutputFormat};

/// A ready-made transform chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Crop transparent margins and convert to WebP
    Trim,
    /// 250x250 letterboxed PNG thumbnails
    Thumbnail,
    /// Bottom-right logo watermark
    Logo,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Trim, Preset::Thumbnail, Preset::Logo];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Trim => "trim",
            Preset::Thumbnail => "thumbnail",
            Preset::Logo => "logo",
        }
    }

    /// The preset's transform chain.
    ///
    /// The logo preset enables the overlay but carries no image; attach one
    /// with [`ProcessingConfig::with_logo`] before running.
    pub fn config(self) -> ProcessingConfig {
        match self {
            Preset::Trim => ProcessingConfig {
                output_format: OutputFormat::WebP,
                quality: 90,
                trim: true,
                naming: NamingMode::KeepOriginal,
                ..Default::default()
            },
            Preset::Thumbnail => ProcessingConfig {
                output_format: OutputFormat::Png,
                trim: false,
                fixed_canvas: Some(Canvas::new(250, 250)),
                canvas_background: [248, 250, 252],
                naming: NamingMode::Suffixed {
                    suffix: "_250x250".to_string(),
                },
                ..Default::default()
            },
            Preset::Logo => ProcessingConfig {
                output_format: OutputFormat::WebP,
                quality: 80,
                trim: false,
                logo: LogoSettings {
                    enabled: true,
                    size_ratio: 0.15,
                    anchor: Anchor::BottomRight,
                    padding_px: 20,
                },
                naming: NamingMode::Suffixed {
                    suffix: "_logo".to_string(),
                },
                ..Default::default()
            },
        }
    }

    /// Archive file name for a batch encoded as `format`.
    pub fn archive_name(self, format: OutputFormat) -> String {
        match self {
            Preset::Trim => format!("cropped_images_{}.zip", format.extension()),
            Preset::Thumbnail => format!("bilder_250x250_{}.zip", format.extension()),
            Preset::Logo => format!("logoed_images.{}.zip", format.extension()),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown preset: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Namer;

    #[test]
    fn test_trim_preset() {
        let config = Preset::Trim.config();
        assert!(config.trim);
        assert_eq!(config.output_format, OutputFormat::WebP);
        assert_eq!(config.quality, 90);
        assert_eq!(
            Preset::Trim.archive_name(config.output_format),
            "cropped_images_webp.zip"
        );
        assert_eq!(
            Namer::name(0, "shoe.png", &config.naming, config.output_format),
            "cropped_shoe.webp"
        );
    }

    #[test]
    fn test_thumbnail_preset() {
        let config = Preset::Thumbnail.config();
        assert!(!config.trim);
        assert_eq!(config.fixed_canvas, Some(Canvas::new(250, 250)));
        assert_eq!(
            Namer::name(0, "shoe.jpg", &config.naming, config.output_format),
            "shoe_250x250.png"
        );
        assert_eq!(
            Preset::Thumbnail.archive_name(OutputFormat::Jpeg),
            "bilder_250x250_jpg.zip"
        );
    }

    #[test]
    fn test_logo_preset_requires_logo() {
        let config = Preset::Logo.config();
        assert!(config.logo.enabled);
        assert_eq!(config.logo.anchor, Anchor::BottomRight);
        assert!(config.active_logo().is_none());
        assert!(config.validate().is_err());
        assert_eq!(
            Preset::Logo.archive_name(config.output_format),
            "logoed_images.webp.zip"
        );
        assert_eq!(
            Namer::name(0, "shoe.png", &config.naming, config.output_format),
            "shoe_logo.webp"
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!("Thumbnail".parse::<Preset>(), Ok(Preset::Thumbnail));
        assert!("unknown".parse::<Preset>().is_err());
    }
}
