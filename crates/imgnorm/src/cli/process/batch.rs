//! Batch run: progress bar, Ctrl-C cancellation, and writing outputs, the
//! archive and the report to disk.

use anyhow::Context;
use imgnorm_core::{
    BatchReport, BatchResult, CancelToken, InputItem, Progress, ReportWriter,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use super::{ProcessArgs, ProcessContext};

/// Run the batch and persist everything it produced.
pub async fn process_batch(
    ctx: ProcessContext,
    args: &ProcessArgs,
    items: Vec<InputItem>,
) -> anyhow::Result<()> {
    let total_bytes: u64 = items.iter().map(|i| i.bytes.len() as u64).sum();

    let progress = create_progress_bar(items.len() as u64);

    let cancel = CancelToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, finishing in-flight images");
                cancel.cancel();
            }
        })
    };

    let start_time = std::time::Instant::now();
    let result = ctx
        .normalizer
        .process_with(
            items,
            ctx.job.clone(),
            |p: Progress| {
                progress.set_position(p.completed as u64);
                let elapsed = start_time.elapsed().as_secs_f64();
                if elapsed > 0.0 {
                    progress.set_message(format!("{:.1} img/sec", p.completed as f64 / elapsed));
                }
            },
            &cancel,
        )
        .await;
    ctrl_c.abort();
    progress.finish_and_clear();
    let result = result?;

    std::fs::create_dir_all(&ctx.output_dir)
        .with_context(|| format!("Failed to create {}", ctx.output_dir.display()))?;
    let written = write_outputs(&result, &ctx.output_dir)?;
    tracing::info!("Wrote {} image(s) to {:?}", written.len(), ctx.output_dir);

    let mut archive_name = None;
    if !args.no_archive {
        if let Some(archive) = ctx.normalizer.package(&result, &ctx.archive_name)? {
            let path = ctx.output_dir.join(&archive.name);
            std::fs::write(&path, &archive.bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Archive written to {:?}", path);
            archive_name = Some(archive.name);
        }
    }

    if let Some(report_path) = &args.report {
        write_report(&result, archive_name.as_deref(), report_path, args)?;
        tracing::info!("Report written to {:?}", report_path);
    }

    print_failures(&result);
    print_summary(&result, total_bytes);

    Ok(())
}

/// Write every output under its assigned name.
fn write_outputs(result: &BatchResult, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(result.succeeded.len());
    for output in &result.succeeded {
        let path = dir.join(&output.name);
        std::fs::write(&path, &output.bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

fn write_report(
    result: &BatchResult,
    archive: Option<&str>,
    path: &Path,
    args: &ProcessArgs,
) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = ReportWriter::new(BufWriter::new(file), args.report_format.into(), true);
    writer.write(&BatchReport::new(result, archive))?;
    writer.flush()?;
    Ok(())
}

/// Create a progress bar for batch processing.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

fn print_failures(result: &BatchResult) {
    if result.failed.is_empty() {
        return;
    }
    eprintln!();
    eprintln!("  Failed:");
    for failure in &result.failed {
        eprintln!("    {} ({}): {}", failure.name, failure.reason.kind(), failure.reason);
    }
}

/// Print a formatted summary table after batch processing.
fn print_summary(result: &BatchResult, total_bytes: u64) {
    let stats = &result.stats;
    let secs = stats.elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        stats.succeeded as f64 / secs
    } else {
        0.0
    };
    let throughput = if secs > 0.0 {
        total_bytes as f64 / 1_000_000.0 / secs
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", stats.succeeded);
    if stats.failed > 0 {
        eprintln!("    Failed:       {:>8}", stats.failed);
    }
    if stats.dropped > 0 {
        eprintln!("    Dropped:      {:>8}", stats.dropped);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", stats.total + stats.dropped);
    eprintln!("    Duration:     {:>7.1}s", secs);
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("    Throughput:   {:>7.1} MB/sec", throughput);
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::process::ReportFormatArg;
    use imgnorm_core::{BatchStats, FailedItem, ItemError, OutputFormat, OutputItem};

    fn sample_result() -> BatchResult {
        BatchResult {
            succeeded: vec![
                OutputItem {
                    name: "cropped_a.png".to_string(),
                    source_name: "a.png".to_string(),
                    format: OutputFormat::Png,
                    bytes: b"aaa".to_vec(),
                },
                OutputItem {
                    name: "cropped_b.png".to_string(),
                    source_name: "b.png".to_string(),
                    format: OutputFormat::Png,
                    bytes: b"bb".to_vec(),
                },
            ],
            failed: vec![FailedItem {
                index: 2,
                name: "c.png".to_string(),
                reason: ItemError::Decode {
                    name: "c.png".to_string(),
                    message: "eof".to_string(),
                },
            }],
            stats: BatchStats {
                total: 3,
                succeeded: 2,
                failed: 1,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_write_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_outputs(&sample_result(), dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(
            std::fs::read(dir.path().join("cropped_a.png")).unwrap(),
            b"aaa"
        );
        assert_eq!(std::fs::read(dir.path().join("cropped_b.png")).unwrap(), b"bb");
    }

    #[test]
    fn test_write_report_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.jsonl");
        let args = ProcessArgs {
            report_format: ReportFormatArg::Jsonl,
            ..Default::default()
        };
        write_report(&sample_result(), Some("images.zip"), &path, &args).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2]["name"], "c.png");
        assert_eq!(lines[3]["archive"], "images.zip");
    }

    #[test]
    fn test_write_report_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_report(&sample_result(), None, &path, &ProcessArgs::default()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["outputs"].as_array().unwrap().len(), 2);
        assert_eq!(value["failures"][0]["kind"], "decode");
    }
}
