// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch processor — decode, enhance, encode, and name every picked file.
//
// Items run on a bounded pool: a semaphore caps how many are in flight and
// the CPU-heavy work of each item runs on the blocking thread pool. Finished
// items are held in a reorder buffer so callers see completions strictly in
// input order, whatever order the workers finish in.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use lumen_core::error::{LumenError, Result};
use lumen_core::types::{
    BatchSummary, EnhancementConfig, OutputConfig, ProcessedResult, SessionId, SourceFile,
};
use lumen_image::{Enhancer, codec};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::naming;
use crate::progress::{BatchProgress, ItemStage, ProgressSink};
use crate::session::GenerationGuard;

/// Pool settings for the batch processor.
#[derive(Debug, Clone)]
pub struct BatchProcessorConfig {
    /// Maximum number of items processed at the same time (at least 1).
    pub max_concurrency: usize,
}

impl Default for BatchProcessorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        }
    }
}

/// An input file that could not be turned into a result.
#[derive(Debug)]
pub struct ItemFailure {
    /// Index of the file in the batch input list.
    pub index: usize,
    pub file_name: String,
    pub error: LumenError,
}

/// Everything a finished batch produced.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Successful results, ordered by `source_index`.
    pub results: Vec<ProcessedResult>,
    /// Skipped items, ordered by `index`.
    pub failures: Vec<ItemFailure>,
    pub generation: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchOutcome {
    pub fn total(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    pub fn summary(&self, session_id: SessionId) -> BatchSummary {
        BatchSummary {
            session_id,
            generation: self.generation,
            total: self.total(),
            succeeded: self.results.len(),
            failed: self.failures.len(),
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }
}

/// Runs batches of files through the enhancer.
#[derive(Debug, Clone, Default)]
pub struct BatchProcessor {
    config: BatchProcessorConfig,
}

impl BatchProcessor {
    pub fn new(config: BatchProcessorConfig) -> Self {
        Self {
            config: BatchProcessorConfig {
                max_concurrency: config.max_concurrency.max(1),
            },
        }
    }

    /// One item at a time, strictly in order.
    pub fn sequential() -> Self {
        Self::new(BatchProcessorConfig { max_concurrency: 1 })
    }

    pub fn config(&self) -> &BatchProcessorConfig {
        &self.config
    }

    /// Process `files` with no cancellation: the run always completes.
    pub async fn process_batch(
        &self,
        files: &[SourceFile],
        enhancement: &EnhancementConfig,
        output: &OutputConfig,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<BatchOutcome> {
        self.process_batch_guarded(files, enhancement, output, progress, &GenerationGuard::detached())
            .await
    }

    /// Process `files`, abandoning the run once `guard` goes stale.
    ///
    /// Empty input and invalid configuration are rejected before any work
    /// starts. Decode and encode failures are reported per item and never
    /// abort the batch. When the guard goes stale, outstanding work is
    /// aborted, nothing more is reported, and `Superseded` is returned.
    #[instrument(skip_all, fields(files = files.len(), generation = guard.generation()))]
    pub async fn process_batch_guarded(
        &self,
        files: &[SourceFile],
        enhancement: &EnhancementConfig,
        output: &OutputConfig,
        progress: Arc<dyn ProgressSink>,
        guard: &GenerationGuard,
    ) -> Result<BatchOutcome> {
        if files.is_empty() {
            return Err(LumenError::EmptyInput);
        }
        let enhancer = Arc::new(Enhancer::new(*enhancement)?);
        output.validate()?;
        let output = Arc::new(output.clone());

        let total = files.len();
        let started_at = Utc::now();
        info!(
            total,
            max_concurrency = self.config.max_concurrency,
            format = %output.format,
            quality = output.quality,
            "Batch started"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(usize, Result<ProcessedResult>)>();
        // Dropping the set (early return, or the caller dropping this future)
        // aborts every task that has not started its blocking work yet.
        let mut tasks = JoinSet::new();

        for (index, file) in files.iter().cloned().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let enhancer = Arc::clone(&enhancer);
            let output = Arc::clone(&output);
            let progress = Arc::clone(&progress);
            let guard = guard.clone();
            let done_tx = done_tx.clone();

            tasks.spawn(async move {
                let permit = semaphore.acquire_owned().await.ok();
                if !guard.is_current() {
                    let _ = done_tx.send((index, Err(LumenError::Superseded {
                        generation: guard.generation(),
                    })));
                    return;
                }
                let item_guard = guard.clone();
                let outcome = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    process_item(index, &file, &enhancer, &output, progress.as_ref(), &item_guard)
                })
                .await
                .unwrap_or_else(|err| Err(LumenError::Worker(err.to_string())));
                let _ = done_tx.send((index, outcome));
            });
        }
        drop(done_tx);

        let mut pending: BTreeMap<usize, Result<ProcessedResult>> = BTreeMap::new();
        let mut next = 0;
        let mut results = Vec::with_capacity(total);
        let mut failures = Vec::new();

        while next < total {
            let received = done_rx.recv().await;
            if !guard.is_current() {
                return Err(abandon(&mut tasks, guard));
            }
            match received {
                Some((index, outcome)) => {
                    pending.insert(index, outcome);
                }
                // Every sender is gone: the remaining tasks died without reporting.
                None => {
                    for index in next..total {
                        pending.entry(index).or_insert_with(|| {
                            Err(LumenError::Worker("task ended without a result".into()))
                        });
                    }
                }
            }

            // A sink may load new files from inside a callback, so the guard
            // is checked before every notification, not just once per receive.
            while let Some(outcome) = pending.remove(&next) {
                if !guard.is_current() {
                    return Err(abandon(&mut tasks, guard));
                }
                match outcome {
                    Ok(result) => {
                        debug!(index = next, name = %result.name, "Item complete");
                        progress.on_item_complete(next, &result);
                        results.push(result);
                    }
                    Err(error) => {
                        let failure = ItemFailure {
                            index: next,
                            file_name: files[next].name.clone(),
                            error,
                        };
                        warn!(
                            index = next,
                            file = %failure.file_name,
                            error = %failure.error,
                            "Item skipped"
                        );
                        progress.on_item_failed(next, &failure);
                        failures.push(failure);
                    }
                }
                next += 1;
                if !guard.is_current() {
                    return Err(abandon(&mut tasks, guard));
                }
                progress.on_batch_progress(BatchProgress {
                    completed: next,
                    total,
                });
            }
        }

        let finished_at = Utc::now();
        info!(
            succeeded = results.len(),
            failed = failures.len(),
            elapsed_ms = (finished_at - started_at).num_milliseconds(),
            "Batch finished"
        );

        Ok(BatchOutcome {
            results,
            failures,
            generation: guard.generation(),
            started_at,
            finished_at,
        })
    }
}

/// Abort outstanding work of a stale run and build the error it returns.
fn abandon(tasks: &mut JoinSet<()>, guard: &GenerationGuard) -> LumenError {
    tasks.abort_all();
    warn!(generation = guard.generation(), "Batch superseded; discarding in-flight work");
    LumenError::Superseded {
        generation: guard.generation(),
    }
}

/// Decode, enhance, encode, and name one file. Runs on a blocking thread.
///
/// Blocking work cannot be aborted, so the item stops itself between stages
/// once `guard` goes stale and reports no further stages.
fn process_item(
    index: usize,
    file: &SourceFile,
    enhancer: &Enhancer,
    output: &OutputConfig,
    progress: &dyn ProgressSink,
    guard: &GenerationGuard,
) -> Result<ProcessedResult> {
    let report = |stage: ItemStage| -> Result<()> {
        if !guard.is_current() {
            return Err(LumenError::Superseded {
                generation: guard.generation(),
            });
        }
        progress.on_item_progress(index, stage);
        Ok(())
    };

    let decoded = codec::decode(&file.bytes)?;
    report(ItemStage::Decoded)?;

    let resized = enhancer.resize(decoded);
    report(ItemStage::Resized)?;

    let adjusted = enhancer.adjust_colors(resized);
    report(ItemStage::ColorAdjusted)?;

    let encoded = codec::encode(&adjusted, output.format, output.quality)?;
    report(ItemStage::Encoded)?;

    Ok(ProcessedResult {
        name: naming::output_name(&file.name, output.prefix(), output.format),
        encoded,
        source_index: index,
    })
}
