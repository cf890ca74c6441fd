// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Progress reporting interface between the batch processor and whatever UI
// is watching it.
//
// The processor never touches a rendering surface. It calls a `ProgressSink`;
// a UI either implements the trait directly or takes the channel-backed
// implementation and drains `ProgressEvent`s on its own task.

use lumen_core::types::ProcessedResult;
use tokio::sync::mpsc::UnboundedSender;

use crate::processor::ItemFailure;

/// Pipeline stage an item has just finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemStage {
    Decoded,
    Resized,
    ColorAdjusted,
    Encoded,
}

impl ItemStage {
    /// Fill level of the per-item progress bar after this stage.
    pub fn percent(&self) -> u8 {
        match self {
            Self::Decoded => 20,
            Self::Resized => 55,
            Self::ColorAdjusted => 80,
            Self::Encoded => 100,
        }
    }
}

/// Overall batch progress; `completed` counts successes and failures alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
}

impl BatchProgress {
    /// Completed fraction in [0, 1].
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }

    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

/// Receives notifications from a running batch.
///
/// Completion, failure, and batch-progress calls arrive in input order.
/// Stage calls are advisory and may interleave between items when more than
/// one worker is running. Calls come from worker threads, hence `Send + Sync`.
pub trait ProgressSink: Send + Sync {
    fn on_item_progress(&self, _index: usize, _stage: ItemStage) {}

    fn on_item_complete(&self, _index: usize, _result: &ProcessedResult) {}

    fn on_item_failed(&self, _index: usize, _failure: &ItemFailure) {}

    fn on_batch_progress(&self, _progress: BatchProgress) {}
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {}

/// Owned form of a notification, for channel-based consumers.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Stage { index: usize, stage: ItemStage },
    Completed { index: usize, result: ProcessedResult },
    Failed { index: usize, file_name: String, message: String },
    Batch(BatchProgress),
}

// A dropped receiver just means nobody is watching any more.
impl ProgressSink for UnboundedSender<ProgressEvent> {
    fn on_item_progress(&self, index: usize, stage: ItemStage) {
        let _ = self.send(ProgressEvent::Stage { index, stage });
    }

    fn on_item_complete(&self, index: usize, result: &ProcessedResult) {
        let _ = self.send(ProgressEvent::Completed {
            index,
            result: result.clone(),
        });
    }

    fn on_item_failed(&self, index: usize, failure: &ItemFailure) {
        let _ = self.send(ProgressEvent::Failed {
            index,
            file_name: failure.file_name.clone(),
            message: failure.error.to_string(),
        });
    }

    fn on_batch_progress(&self, progress: BatchProgress) {
        let _ = self.send(ProgressEvent::Batch(progress));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_percentages_increase() {
        let stages = [
            ItemStage::Decoded,
            ItemStage::Resized,
            ItemStage::ColorAdjusted,
            ItemStage::Encoded,
        ];
        let percents: Vec<u8> = stages.iter().map(ItemStage::percent).collect();
        assert_eq!(percents, vec![20, 55, 80, 100]);
    }

    #[test]
    fn fraction_reaches_one_only_when_done() {
        let partial = BatchProgress { completed: 3, total: 4 };
        assert!((partial.fraction() - 0.75).abs() < f64::EPSILON);
        assert!(!partial.is_done());

        let done = BatchProgress { completed: 4, total: 4 };
        assert!((done.fraction() - 1.0).abs() < f64::EPSILON);
        assert!(done.is_done());
    }

    #[test]
    fn channel_sink_forwards_events() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        tx.on_item_progress(2, ItemStage::Resized);
        tx.on_batch_progress(BatchProgress { completed: 1, total: 2 });

        assert!(matches!(
            rx.try_recv().unwrap(),
            ProgressEvent::Stage { index: 2, stage: ItemStage::Resized }
        ));
        assert!(matches!(
            rx.try_recv().unwrap(),
            ProgressEvent::Batch(BatchProgress { completed: 1, total: 2 })
        ));
    }

    #[test]
    fn channel_sink_tolerates_dropped_receiver() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<ProgressEvent>();
        drop(rx);
        tx.on_item_progress(0, ItemStage::Decoded);
    }
}
