//! The `imgnorm process` command for normalizing images.

mod batch;
mod inputs;
mod setup;
pub mod types;

pub use types::{AnchorArg, ImageFormatArg, PresetArg, ReportFormatArg};

use clap::Args;
use imgnorm_core::{Normalizer, ProcessingConfig};
use std::path::PathBuf;
use std::sync::Arc;

use batch::process_batch;
use inputs::{cap_files, discover, read_inputs};
use setup::setup_processor;

/// Arguments for the `process` command.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Image files or directories to process
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output directory (defaults to general.output_dir from the config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Start from a named preset instead of the [job] config section
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Output image format
    #[arg(short, long, value_enum)]
    pub format: Option<ImageFormatArg>,

    /// Lossy quality for WebP and JPEG
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub quality: Option<u8>,

    /// Keep transparent margins
    #[arg(long)]
    pub no_trim: bool,

    /// Pad to a square with transparent margins
    #[arg(long)]
    pub square_pad: bool,

    /// Square-pad margin per side, in percent of the longest edge (implies --square-pad)
    #[arg(long, value_name = "PCT")]
    pub padding: Option<f32>,

    /// Letterbox onto a fixed canvas, e.g. 250x250
    #[arg(long, value_name = "WxH", value_parser = parse_canvas)]
    pub canvas: Option<imgnorm_core::Canvas>,

    /// Logo image to overlay
    #[arg(long, value_name = "FILE")]
    pub logo: Option<PathBuf>,

    /// Logo width in percent of the image width
    #[arg(long, value_name = "PCT")]
    pub logo_size: Option<f32>,

    /// Logo placement
    #[arg(long, value_enum)]
    pub anchor: Option<AnchorArg>,

    /// Gap between the logo and the image edge, in pixels
    #[arg(long, value_name = "PX")]
    pub logo_padding: Option<u32>,

    /// Name outputs "<PREFIX>, 1.<ext>", "<PREFIX>, 2.<ext>", ...
    #[arg(long)]
    pub prefix: Option<String>,

    /// Number of parallel workers (overrides processing.parallel_workers)
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Write a batch report to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "json")]
    pub report_format: ReportFormatArg,

    /// Do not write a zip archive
    #[arg(long)]
    pub no_archive: bool,
}

/// Manual Default impl for constructing ProcessArgs outside of clap.
///
/// Values match the clap defaults above.
impl Default for ProcessArgs {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output: None,
            preset: None,
            format: None,
            quality: None,
            no_trim: false,
            square_pad: false,
            padding: None,
            canvas: None,
            logo: None,
            logo_size: None,
            anchor: None,
            logo_padding: None,
            prefix: None,
            parallel: None,
            report: None,
            report_format: ReportFormatArg::Json,
            no_archive: false,
        }
    }
}

fn parse_canvas(s: &str) -> Result<imgnorm_core::Canvas, String> {
    imgnorm_core::Canvas::parse(s).ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))
}

/// Everything assembled by setup_processor().
pub(crate) struct ProcessContext {
    pub normalizer: Normalizer,
    pub job: Arc<ProcessingConfig>,
    pub archive_name: String,
    pub output_dir: PathBuf,
}

/// Execute the process command.
pub async fn execute(args: ProcessArgs) -> anyhow::Result<()> {
    let ctx = setup_processor(&args)?;

    let mut files = discover(&args.inputs, ctx.normalizer.registry())?;
    if files.is_empty() {
        tracing::warn!("No supported image files found in {:?}", args.inputs);
        return Ok(());
    }
    tracing::info!("Found {} image(s) to process", files.len());

    cap_files(&mut files, ctx.normalizer.config().processing.max_items);
    let items = read_inputs(&files)?;
    process_batch(ctx, &args, items).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_args_default_flags_are_off() {
        let args = ProcessArgs::default();
        assert!(!args.no_trim);
        assert!(!args.square_pad);
        assert!(!args.no_archive);
    }

    #[test]
    fn process_args_default_option_fields_are_none() {
        let args = ProcessArgs::default();
        assert!(args.output.is_none());
        assert!(args.preset.is_none());
        assert!(args.format.is_none());
        assert!(args.logo.is_none());
        assert!(args.prefix.is_none());
        assert!(args.report.is_none());
    }

    #[test]
    fn process_args_default_report_format_is_json() {
        let args = ProcessArgs::default();
        assert!(matches!(args.report_format, ReportFormatArg::Json));
    }

    #[test]
    fn parse_canvas_accepts_w_x_h() {
        assert_eq!(
            parse_canvas("250x250").unwrap(),
            imgnorm_core::Canvas::new(250, 250)
        );
        assert!(parse_canvas("250").is_err());
    }
}
