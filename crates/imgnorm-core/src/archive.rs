//! Zip packaging of batch outputs.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::types::OutputItem;

/// Archive name used when no preset supplies one.
pub const DEFAULT_ARCHIVE_NAME: &str = "images.zip";

/// A finished in-memory zip archive.
#[derive(Debug, Clone)]
pub struct Archive {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Archive {
    pub fn mime(&self) -> &'static str {
        "application/zip"
    }
}

/// Packages outputs into a single zip.
pub struct ArchiveBuilder;

impl ArchiveBuilder {
    /// Build an archive of `outputs`, in order, when there is more than one.
    ///
    /// Zero or one output yields `None`; the individual files are always
    /// available on the batch result regardless.
    pub fn build(outputs: &[OutputItem], name: &str) -> Result<Option<Archive>> {
        if outputs.len() < 2 {
            return Ok(None);
        }

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for output in outputs {
            zip.start_file(output.name.as_str(), options)?;
            zip.write_all(&output.bytes)?;
        }

        let bytes = zip.finish()?.into_inner();
        tracing::debug!(
            "Packaged {} outputs into {} ({} bytes)",
            outputs.len(),
            name,
            bytes.len()
        );

        Ok(Some(Archive {
            name: name.to_string(),
            bytes,
        }))
    }
}
