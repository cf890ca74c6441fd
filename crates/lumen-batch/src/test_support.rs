// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared fixtures for the batch tests.

use std::io::Cursor;
use std::sync::Mutex;

use image::{ImageFormat, Rgba, RgbaImage};
use lumen_core::types::{ProcessedResult, SourceFile};

use crate::processor::ItemFailure;
use crate::progress::{BatchProgress, ItemStage, ProgressSink};

/// Route `tracing` output through the test harness; `RUST_LOG` picks the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A `width`x`height` gradient PNG named `name`.
pub fn png_file(name: &str, width: u32, height: u32) -> SourceFile {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png).unwrap();
    SourceFile::new(name, bytes.into_inner())
}

/// Bytes no decoder accepts.
pub fn corrupt_file(name: &str) -> SourceFile {
    SourceFile::new(name, b"definitely not an image".to_vec())
}

/// Records every notification for later assertions.
#[derive(Default)]
pub struct RecordingProgress {
    stages: Mutex<Vec<(usize, ItemStage)>>,
    completed: Mutex<Vec<usize>>,
    failed: Mutex<Vec<usize>>,
    batch: Mutex<Vec<BatchProgress>>,
}

impl RecordingProgress {
    pub fn stages_for(&self, index: usize) -> Vec<ItemStage> {
        self.stages
            .lock()
            .unwrap()
            .iter()
            .filter(|(i, _)| *i == index)
            .map(|(_, stage)| *stage)
            .collect()
    }

    pub fn completed(&self) -> Vec<usize> {
        self.completed.lock().unwrap().clone()
    }

    pub fn failed(&self) -> Vec<usize> {
        self.failed.lock().unwrap().clone()
    }

    /// `completed` counts of every batch progress update, in arrival order.
    pub fn batch_progress(&self) -> Vec<usize> {
        self.batch.lock().unwrap().iter().map(|p| p.completed).collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn on_item_progress(&self, index: usize, stage: ItemStage) {
        self.stages.lock().unwrap().push((index, stage));
    }

    fn on_item_complete(&self, index: usize, _result: &ProcessedResult) {
        self.completed.lock().unwrap().push(index);
    }

    fn on_item_failed(&self, index: usize, _failure: &ItemFailure) {
        self.failed.lock().unwrap().push(index);
    }

    fn on_batch_progress(&self, progress: BatchProgress) {
        self.batch.lock().unwrap().push(progress);
    }
}
