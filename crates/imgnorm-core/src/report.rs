//! Batch reports in JSON or JSON Lines.
//!
//! JSON writes one document with every output and failure. JSON Lines writes
//! one tagged record per line: outputs, then failures, then a summary.

use serde::Serialize;
use std::io::{self, Write};

use crate::types::{BatchResult, BatchStats};

/// Report serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Single JSON document
    #[default]
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

/// One produced file.
#[derive(Debug, Clone, Serialize)]
pub struct OutputRecord {
    pub name: String,
    pub source: String,
    pub mime: &'static str,
    pub size_bytes: usize,
}

/// One input that produced nothing.
#[derive(Debug, Clone, Serialize)]
pub struct FailureRecord {
    pub index: usize,
    pub name: String,
    pub kind: &'static str,
    pub message: String,
}

/// Serializable summary of a finished batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub version: &'static str,
    pub stats: BatchStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<String>,
    pub outputs: Vec<OutputRecord>,
    pub failures: Vec<FailureRecord>,
}

impl BatchReport {
    pub fn new(result: &BatchResult, archive: Option<&str>) -> Self {
        Self {
            version: crate::VERSION,
            stats: result.stats.clone(),
            archive: archive.map(str::to_string),
            outputs: result
                .succeeded
                .iter()
                .map(|o| OutputRecord {
                    name: o.name.clone(),
                    source: o.source_name.clone(),
                    mime: o.mime(),
                    size_bytes: o.bytes.len(),
                })
                .collect(),
            failures: result
                .failed
                .iter()
                .map(|f| FailureRecord {
                    index: f.index,
                    name: f.name.clone(),
                    kind: f.reason.kind(),
                    message: f.reason.to_string(),
                })
                .collect(),
        }
    }
}

/// A single JSON Lines record.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ReportLine<'a> {
    Output(&'a OutputRecord),
    Failure(&'a FailureRecord),
    Summary {
        version: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        archive: Option<&'a str>,
        #[serde(flatten)]
        stats: &'a BatchStats,
    },
}

/// Writes batch reports to any `Write` sink.
pub struct ReportWriter<W: Write> {
    writer: W,
    format: ReportFormat,
    pretty: bool,
}

impl<W: Write> ReportWriter<W> {
    /// `pretty` only affects the JSON format.
    pub fn new(writer: W, format: ReportFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
        }
    }

    pub fn write(&mut self, report: &BatchReport) -> io::Result<()> {
        match self.format {
            ReportFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, report)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, report).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
            }
            ReportFormat::JsonLines => {
                for output in &report.outputs {
                    self.write_line(&ReportLine::Output(output))?;
                }
                for failure in &report.failures {
                    self.write_line(&ReportLine::Failure(failure))?;
                }
                self.write_line(&ReportLine::Summary {
                    version: report.version,
                    archive: report.archive.as_deref(),
                    stats: &report.stats,
                })?;
            }
        }
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn write_line(&mut self, line: &ReportLine<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, line).map_err(io::Error::other)?;
        writeln!(self.writer)
    }
}
