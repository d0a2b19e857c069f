//! Processor setup: config overrides, preset and flag merging, logo loading.

use anyhow::Context;
use imgnorm_core::{
    Config, NamingMode, Normalizer, OutputFormat, Preset, ProcessingConfig, DEFAULT_ARCHIVE_NAME,
};
use std::path::PathBuf;
use std::sync::Arc;

use super::{ProcessArgs, ProcessContext};

/// Validate input, load config, and assemble everything needed for processing.
pub fn setup_processor(args: &ProcessArgs) -> anyhow::Result<ProcessContext> {
    for input in &args.inputs {
        if !input.exists() {
            anyhow::bail!(
                "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
                input
            );
        }
    }

    let mut config = Config::load()?;
    if let Some(parallel) = args.parallel {
        config.processing.parallel_workers = parallel;
    }

    let normalizer = Normalizer::new(config)?;

    let mut job = build_job(args, &normalizer.config().job);
    if let Some(path) = &args.logo {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read logo {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let logo = normalizer.load_logo(&bytes, &name)?;
        job = job.with_logo(logo);
    }

    // Fail on bad flags before any input is read.
    job.validate()?;

    let archive_name = archive_name(args, job.output_format);
    let output_dir = resolve_output_dir(args, normalizer.config());

    tracing::debug!(
        "Job: {} q{} trim={} square_pad={} canvas={:?} logo={} -> {:?}",
        job.output_format,
        job.quality,
        job.trim,
        job.square_pad,
        job.fixed_canvas.map(|c| c.to_string()),
        job.active_logo().is_some(),
        output_dir
    );

    Ok(ProcessContext {
        normalizer,
        job: Arc::new(job),
        archive_name,
        output_dir,
    })
}

/// Merge the preset (or the `[job]` config section) with command-line flags.
///
/// Flags always win over the starting configuration.
pub fn build_job(args: &ProcessArgs, config_job: &ProcessingConfig) -> ProcessingConfig {
    let mut job = match args.preset {
        Some(preset) => Preset::from(preset).config(),
        None => config_job.clone(),
    };

    if let Some(format) = args.format {
        job.output_format = format.into();
    }
    if let Some(quality) = args.quality {
        job.quality = quality;
    }
    if args.no_trim {
        job.trim = false;
    }
    if args.square_pad {
        job.square_pad = true;
    }
    if let Some(pct) = args.padding {
        job.square_pad = true;
        job.padding_ratio = pct / 100.0;
    }
    if let Some(canvas) = args.canvas {
        job.fixed_canvas = Some(canvas);
    }
    if let Some(pct) = args.logo_size {
        job.logo.size_ratio = pct / 100.0;
    }
    if let Some(anchor) = args.anchor {
        job.logo.anchor = anchor.into();
    }
    if let Some(padding) = args.logo_padding {
        job.logo.padding_px = padding;
    }
    if let Some(prefix) = &args.prefix {
        job.naming = NamingMode::Sequential {
            prefix: prefix.clone(),
        };
    }

    job
}

/// Archive file name: the preset's, or the generic default.
pub fn archive_name(args: &ProcessArgs, format: OutputFormat) -> String {
    match args.preset {
        Some(preset) => Preset::from(preset).archive_name(format),
        None => DEFAULT_ARCHIVE_NAME.to_string(),
    }
}

fn resolve_output_dir(args: &ProcessArgs, config: &Config) -> PathBuf {
    match &args.output {
        Some(dir) => {
            let expanded = shellexpand::tilde(&dir.to_string_lossy()).into_owned();
            PathBuf::from(expanded)
        }
        None => config.output_dir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::process::{AnchorArg, ImageFormatArg, PresetArg};
    use imgnorm_core::{Anchor, Canvas};

    #[test]
    fn test_no_flags_uses_config_job() {
        let args = ProcessArgs::default();
        let mut config_job = ProcessingConfig::default();
        config_job.quality = 42;
        let job = build_job(&args, &config_job);
        assert_eq!(job.quality, 42);
        assert!(job.trim);
    }

    #[test]
    fn test_preset_replaces_config_job() {
        let args = ProcessArgs {
            preset: Some(PresetArg::Thumbnail),
            ..Default::default()
        };
        let job = build_job(&args, &ProcessingConfig::default());
        assert!(!job.trim);
        assert_eq!(job.fixed_canvas, Some(Canvas::new(250, 250)));
        assert_eq!(job.output_format, OutputFormat::Png);
    }

    #[test]
    fn test_flags_override_preset() {
        let args = ProcessArgs {
            preset: Some(PresetArg::Logo),
            format: Some(ImageFormatArg::Jpeg),
            quality: Some(70),
            padding: Some(10.0),
            logo_size: Some(25.0),
            anchor: Some(AnchorArg::TopLeft),
            logo_padding: Some(5),
            prefix: Some("AE2010R".to_string()),
            ..Default::default()
        };
        let job = build_job(&args, &ProcessingConfig::default());
        assert_eq!(job.output_format, OutputFormat::Jpeg);
        assert_eq!(job.quality, 70);
        assert!(job.square_pad);
        assert!((job.padding_ratio - 0.1).abs() < 1e-6);
        assert!((job.logo.size_ratio - 0.25).abs() < 1e-6);
        assert_eq!(job.logo.anchor, Anchor::TopLeft);
        assert_eq!(job.logo.padding_px, 5);
        assert_eq!(
            job.naming,
            NamingMode::Sequential {
                prefix: "AE2010R".to_string()
            }
        );
    }

    #[test]
    fn test_out_of_range_padding_fails_validation() {
        let args = ProcessArgs {
            padding: Some(80.0),
            ..Default::default()
        };
        let job = build_job(&args, &ProcessingConfig::default());
        assert!(job.validate().is_err());
    }

    #[test]
    fn test_archive_name() {
        let args = ProcessArgs::default();
        assert_eq!(archive_name(&args, OutputFormat::WebP), "images.zip");

        let args = ProcessArgs {
            preset: Some(PresetArg::Thumbnail),
            ..Default::default()
        };
        assert_eq!(
            archive_name(&args, OutputFormat::Png),
            "bilder_250x250_png.zip"
        );
    }
}
