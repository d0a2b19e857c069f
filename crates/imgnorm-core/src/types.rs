//! Core data types flowing in and out of a batch.

use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ItemError;
use crate::pipeline::OutputFormat;

/// One uploaded blob.
///
/// Bytes are reference counted so handing an item to a worker never copies
/// the payload.
#[derive(Debug, Clone)]
pub struct InputItem {
    /// Declared file name (diagnostics and naming only)
    pub name: String,
    /// Raw encoded bytes
    pub bytes: Arc<[u8]>,
}

impl InputItem {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// One encoded result, ready to download or archive.
#[derive(Debug, Clone, Serialize)]
pub struct OutputItem {
    /// Assigned output name, unique within its batch
    pub name: String,

    /// Name of the input this was produced from
    pub source_name: String,

    /// Encoding of `bytes`
    pub format: OutputFormat,

    /// Encoded file contents
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl OutputItem {
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }
}

/// An input that produced no output.
#[derive(Debug, Clone)]
pub struct FailedItem {
    /// Position in the (truncated) input list
    pub index: usize,
    /// Declared input name
    pub name: String,
    /// Why it failed
    pub reason: ItemError,
}

/// Counters for one batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchStats {
    /// Items accepted into the batch (after the cap)
    pub total: usize,

    /// Items that produced an output
    pub succeeded: usize,

    /// Items that failed or were cancelled
    pub failed: usize,

    /// Items dropped by the max-item cap
    pub dropped: usize,

    /// Wall-clock processing time
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Outcome of one batch.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Outputs in original input order
    pub succeeded: Vec<OutputItem>,

    /// Failures in original input order
    pub failed: Vec<FailedItem>,

    pub stats: BatchStats,
}

impl BatchResult {
    /// Names of every input that produced no output.
    pub fn failed_names(&self) -> BTreeSet<String> {
        self.failed.iter().map(|f| f.name.clone()).collect()
    }

    /// Whether any item was skipped by cancellation.
    pub fn was_cancelled(&self) -> bool {
        self.failed
            .iter()
            .any(|f| matches!(f.reason, ItemError::Cancelled(_)))
    }
}

/// Completion counter emitted after every finished item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Completed fraction in `[0, 1]`; an empty batch counts as done.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}
