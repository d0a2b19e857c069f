//! CLI enum types for the process command: preset, image format, anchor,
//! report format.

use clap::ValueEnum;
use imgnorm_core::{Anchor, OutputFormat, Preset, ReportFormat};

/// Named starting configurations.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PresetArg {
    /// Trim transparent margins, WebP q90
    Trim,
    /// 250x250 letterboxed PNG
    Thumbnail,
    /// Bottom-right logo watermark, WebP q80 (requires --logo)
    Logo,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Trim => Preset::Trim,
            PresetArg::Thumbnail => Preset::Thumbnail,
            PresetArg::Logo => Preset::Logo,
        }
    }
}

/// Output image encodings.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ImageFormatArg {
    Webp,
    Png,
    #[value(alias = "jpg")]
    Jpeg,
}

impl From<ImageFormatArg> for OutputFormat {
    fn from(arg: ImageFormatArg) -> Self {
        match arg {
            ImageFormatArg::Webp => OutputFormat::WebP,
            ImageFormatArg::Png => OutputFormat::Png,
            ImageFormatArg::Jpeg => OutputFormat::Jpeg,
        }
    }
}

/// Logo placement.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum AnchorArg {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl From<AnchorArg> for Anchor {
    fn from(arg: AnchorArg) -> Self {
        match arg {
            AnchorArg::TopLeft => Anchor::TopLeft,
            AnchorArg::TopRight => Anchor::TopRight,
            AnchorArg::BottomLeft => Anchor::BottomLeft,
            AnchorArg::BottomRight => Anchor::BottomRight,
            AnchorArg::Center => Anchor::Center,
        }
    }
}

/// Report formats.
#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum ReportFormatArg {
    /// Single JSON document
    #[default]
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<ReportFormatArg> for ReportFormat {
    fn from(arg: ReportFormatArg) -> Self {
        match arg {
            ReportFormatArg::Json => ReportFormat::Json,
            ReportFormatArg::Jsonl => ReportFormat::JsonLines,
        }
    }
}

impl std::fmt::Display for ReportFormatArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormatArg::Json => write!(f, "json"),
            ReportFormatArg::Jsonl => write!(f, "jsonl"),
        }
    }
}
