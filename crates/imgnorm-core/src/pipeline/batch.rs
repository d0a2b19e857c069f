//! Bounded fan-out of item chains with ordered, failure-tolerant collection.
//!
//! Every item gets its own task, gated by a semaphore so at most `workers`
//! chains run at once on the blocking pool. Outcomes flow back over a channel
//! to the coordinator, which is the only place progress is reported from.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, Semaphore};

use crate::config::ProcessingConfig;
use crate::error::{ItemError, ItemResult};
use crate::types::{BatchResult, BatchStats, FailedItem, InputItem, OutputItem, Progress};

use super::naming::Namer;
use super::processor::{EncodedImage, ItemProcessor};

/// Cooperative cancellation flag shared between a caller and a running batch.
///
/// Items whose chain has not started when the flag is raised are recorded as
/// [`ItemError::Cancelled`]; chains already running finish normally.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Dispatches a batch across a fixed number of workers.
pub struct BatchCoordinator {
    processor: Arc<ItemProcessor>,
    workers: usize,
    max_items: usize,
}

impl BatchCoordinator {
    /// `workers` and `max_items` are clamped to at least 1.
    pub fn new(processor: Arc<ItemProcessor>, workers: usize, max_items: usize) -> Self {
        Self {
            processor,
            workers: workers.max(1),
            max_items: max_items.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Run every item through the chain in `config`.
    ///
    /// Items past `max_items` are dropped. `progress` is called once per
    /// finished item with a strictly increasing `completed` count. Outputs and
    /// failures come back sorted by input index regardless of completion
    /// order, and `succeeded + failed` always equals the accepted item count.
    pub async fn run<F>(
        &self,
        mut items: Vec<InputItem>,
        config: Arc<ProcessingConfig>,
        mut progress: F,
        cancel: &CancelToken,
    ) -> BatchResult
    where
        F: FnMut(Progress),
    {
        let start = Instant::now();

        let dropped = items.len().saturating_sub(self.max_items);
        if dropped > 0 {
            tracing::debug!(
                "Dropping {} items over the {} item limit",
                dropped,
                self.max_items
            );
            items.truncate(self.max_items);
        }

        let total = items.len();
        tracing::debug!("Dispatching {} items across {} workers", total, self.workers);

        let names: Vec<String> = items.iter().map(|item| item.name.clone()).collect();
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let (tx, mut rx) = mpsc::channel::<(usize, ItemResult<EncodedImage>)>(self.workers);

        for (index, item) in items.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let processor = self.processor.clone();
            let config = config.clone();
            let cancel = cancel.clone();
            let tx = tx.clone();

            tokio::spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) if cancel.is_cancelled() => {
                        Err(ItemError::Cancelled(item.name.clone()))
                    }
                    Ok(_permit) => run_chain(processor, item, config).await,
                    Err(_) => Err(ItemError::Internal {
                        name: item.name.clone(),
                        message: "worker pool closed".to_string(),
                    }),
                };
                // Receiver only goes away if the coordinator itself was dropped.
                let _ = tx.send((index, outcome)).await;
            });
        }
        drop(tx);

        let mut encoded: Vec<(usize, EncodedImage)> = Vec::with_capacity(total);
        let mut failed: Vec<FailedItem> = Vec::new();
        let mut seen: HashSet<usize> = HashSet::with_capacity(total);

        while let Some((index, outcome)) = rx.recv().await {
            seen.insert(index);
            match outcome {
                Ok(image) => encoded.push((index, image)),
                Err(reason) => {
                    if !matches!(reason, ItemError::Cancelled(_)) {
                        tracing::warn!("Failed: {}", reason);
                    }
                    failed.push(FailedItem {
                        index,
                        name: names[index].clone(),
                        reason,
                    });
                }
            }
            progress(Progress {
                completed: seen.len(),
                total,
            });
        }

        // A task that died before reporting still owes an entry.
        for (index, name) in names.iter().enumerate() {
            if seen.insert(index) {
                failed.push(FailedItem {
                    index,
                    name: name.clone(),
                    reason: ItemError::Internal {
                        name: name.clone(),
                        message: "worker exited without a result".to_string(),
                    },
                });
                progress(Progress {
                    completed: seen.len(),
                    total,
                });
            }
        }

        encoded.sort_by_key(|(index, _)| *index);
        failed.sort_by_key(|f| f.index);

        let succeeded = assign_names(encoded, &names, &config);

        let stats = BatchStats {
            total,
            succeeded: succeeded.len(),
            failed: failed.len(),
            dropped,
            elapsed: start.elapsed(),
        };

        tracing::info!(
            "Batch complete: {} succeeded, {} failed, {} dropped in {:?}",
            stats.succeeded,
            stats.failed,
            stats.dropped,
            stats.elapsed
        );

        BatchResult {
            succeeded,
            failed,
            stats,
        }
    }
}

/// Run one chain on the blocking pool, mapping a panic to a per-item failure.
async fn run_chain(
    processor: Arc<ItemProcessor>,
    item: InputItem,
    config: Arc<ProcessingConfig>,
) -> ItemResult<EncodedImage> {
    let name = item.name.clone();
    match tokio::task::spawn_blocking(move || processor.process(&item, &config)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Worker for {:?} panicked: {}", name, e);
            Err(ItemError::Internal {
                name,
                message: if e.is_panic() {
                    "worker panicked".to_string()
                } else {
                    e.to_string()
                },
            })
        }
    }
}

/// Name the sorted outputs densely (1..=n over successes) and make names
/// unique.
fn assign_names(
    encoded: Vec<(usize, EncodedImage)>,
    names: &[String],
    config: &ProcessingConfig,
) -> Vec<OutputItem> {
    let assigned: Vec<String> = encoded
        .iter()
        .enumerate()
        .map(|(position, (index, _))| {
            Namer::name(position, &names[*index], &config.naming, config.output_format)
        })
        .collect();

    Namer::disambiguate(assigned)
        .into_iter()
        .zip(encoded)
        .map(|(name, (index, image))| OutputItem {
            name,
            source_name: names[index].clone(),
            format: config.output_format,
            bytes: image.bytes,
        })
        .collect()
}
