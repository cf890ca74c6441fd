// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lumen-batch — Batch processing for the Lumen enhancer.
//
// Runs picked files through the enhancer on a bounded worker pool, reports
// progress in input order, names the outputs, and exports them singly or as a
// zip archive. `BatchSession` ties a selection to its results and cancels
// stale runs when the selection changes.

pub mod export;
pub mod naming;
pub mod processor;
pub mod progress;
pub mod session;

#[cfg(test)]
mod test_support;

pub use export::{ExportedFile, export_one, export_zip};
pub use naming::{archive_file_name, output_name};
pub use processor::{BatchOutcome, BatchProcessor, BatchProcessorConfig, ItemFailure};
pub use progress::{BatchProgress, ItemStage, NoopProgress, ProgressEvent, ProgressSink};
pub use session::{BatchSession, GenerationGuard};
