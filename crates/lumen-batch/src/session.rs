// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch session — the picked files, the latest results, and the generation
// counter that lets a new selection cancel a run still in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lumen_core::error::{LumenError, Result};
use lumen_core::types::{
    BatchSummary, EnhancementConfig, OutputConfig, ProcessedResult, SessionId, SourceFile,
};
use tracing::{info, instrument, warn};

use crate::export::{self, ExportedFile};
use crate::processor::{BatchOutcome, BatchProcessor};
use crate::progress::ProgressSink;

/// Snapshot of the generation a batch run was started under.
#[derive(Debug, Clone)]
pub struct GenerationGuard {
    counter: Arc<AtomicU64>,
    generation: u64,
}

impl GenerationGuard {
    /// A guard no one else can advance; it stays current forever.
    pub fn detached() -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(0)),
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `false` once newer input has been loaded.
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::Acquire) == self.generation
    }
}

#[derive(Debug, Default)]
struct SessionState {
    files: Vec<SourceFile>,
    results: Vec<ProcessedResult>,
    last_summary: Option<BatchSummary>,
}

#[derive(Debug)]
struct SessionInner {
    id: SessionId,
    generation: Arc<AtomicU64>,
    state: Mutex<SessionState>,
}

/// Files and results for one user session.
///
/// Clones share the same state, so the UI and a running batch can each hold
/// one. The lock is never held across an `.await`.
#[derive(Debug, Clone)]
pub struct BatchSession {
    inner: Arc<SessionInner>,
}

impl Default for BatchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchSession {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id: SessionId::new(),
                generation: Arc::new(AtomicU64::new(0)),
                state: Mutex::new(SessionState::default()),
            }),
        }
    }

    pub fn id(&self) -> SessionId {
        self.inner.id
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        // The state is plain data; a panic elsewhere cannot leave it torn.
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the selection. Any run still in flight becomes stale.
    ///
    /// Returns the new generation.
    pub fn load_files(&self, files: Vec<SourceFile>) -> u64 {
        let mut state = self.state();
        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        info!(session = %self.inner.id, generation, files = files.len(), "Files loaded");
        state.files = files;
        state.results.clear();
        state.last_summary = None;
        generation
    }

    pub fn files(&self) -> Vec<SourceFile> {
        self.state().files.clone()
    }

    pub fn results(&self) -> Vec<ProcessedResult> {
        self.state().results.clone()
    }

    pub fn last_summary(&self) -> Option<BatchSummary> {
        self.state().last_summary.clone()
    }

    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    /// Guard tied to the current generation.
    pub fn guard(&self) -> GenerationGuard {
        GenerationGuard {
            counter: Arc::clone(&self.inner.generation),
            generation: self.generation(),
        }
    }

    /// Process the loaded files and keep the results.
    ///
    /// Results from a run that was superseded while in flight are dropped
    /// and `Superseded` is returned instead.
    #[instrument(skip_all, fields(session = %self.inner.id))]
    pub async fn process(
        &self,
        processor: &BatchProcessor,
        enhancement: &EnhancementConfig,
        output: &OutputConfig,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<BatchOutcome> {
        // Stored results are only replaced by a finished, still-current run;
        // a rejected call leaves them as they were.
        let (files, guard) = {
            let state = self.state();
            if state.files.is_empty() {
                return Err(LumenError::EmptyInput);
            }
            (state.files.clone(), self.guard())
        };

        let outcome = processor
            .process_batch_guarded(&files, enhancement, output, progress, &guard)
            .await?;

        let mut state = self.state();
        // `load_files` bumps the counter under this lock, so the check cannot race it.
        if !guard.is_current() {
            warn!(generation = guard.generation(), "Discarding results of a superseded batch");
            return Err(LumenError::Superseded {
                generation: guard.generation(),
            });
        }
        state.results = outcome.results.clone();
        state.last_summary = Some(outcome.summary(self.inner.id));
        Ok(outcome)
    }

    /// Download one stored result.
    pub fn export_one(&self, index: usize) -> Result<ExportedFile> {
        let state = self.state();
        if state.results.is_empty() {
            return Err(LumenError::EmptyBatch);
        }
        let result = state.results.get(index).ok_or(LumenError::ResultNotFound {
            index,
            len: state.results.len(),
        })?;
        Ok(export::export_one(result))
    }

    /// Download every stored result as one zip archive.
    pub fn export_zip(&self, zip_name: Option<&str>) -> Result<ExportedFile> {
        export::export_zip(&self.state().results, zip_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopProgress;
    use crate::test_support::{init_tracing, png_file};
    use lumen_core::types::OutputFormat;

    fn png_output() -> OutputConfig {
        OutputConfig {
            format: OutputFormat::Png,
            ..Default::default()
        }
    }

    /// Loads a new selection as soon as the first item completes.
    struct ReloadOnFirstComplete {
        session: BatchSession,
        replacement: Vec<SourceFile>,
    }

    impl ProgressSink for ReloadOnFirstComplete {
        fn on_item_complete(&self, index: usize, _result: &ProcessedResult) {
            if index == 0 {
                self.session.load_files(self.replacement.clone());
            }
        }
    }

    /// Records what a run publishes, and loads a new selection when item 0
    /// completes.
    #[derive(Default)]
    struct ReloadAndRecord {
        session: Mutex<Option<BatchSession>>,
        completed: Mutex<Vec<usize>>,
        batch: Mutex<Vec<usize>>,
    }

    impl ProgressSink for ReloadAndRecord {
        fn on_item_complete(&self, index: usize, _result: &ProcessedResult) {
            self.completed.lock().unwrap().push(index);
            if index == 0 {
                if let Some(session) = self.session.lock().unwrap().as_ref() {
                    session.load_files(vec![png_file("new.png", 4, 4)]);
                }
            }
        }

        fn on_batch_progress(&self, progress: crate::progress::BatchProgress) {
            self.batch.lock().unwrap().push(progress.completed);
        }
    }

    #[test]
    fn load_files_bumps_generation() {
        let session = BatchSession::new();
        assert_eq!(session.generation(), 0);
        assert_eq!(session.load_files(vec![png_file("a.png", 2, 2)]), 1);
        assert_eq!(session.load_files(vec![png_file("b.png", 2, 2)]), 2);
        assert_eq!(session.files()[0].name, "b.png");
    }

    #[test]
    fn guard_goes_stale_on_reload() {
        let session = BatchSession::new();
        session.load_files(vec![png_file("a.png", 2, 2)]);
        let guard = session.guard();
        assert!(guard.is_current());
        session.load_files(vec![png_file("b.png", 2, 2)]);
        assert!(!guard.is_current());
        assert!(GenerationGuard::detached().is_current());
    }

    #[tokio::test]
    async fn process_stores_results() {
        let session = BatchSession::new();
        session.load_files(vec![png_file("a.png", 8, 8), png_file("b.png", 8, 8)]);

        let outcome = session
            .process(
                &BatchProcessor::default(),
                &EnhancementConfig::default(),
                &png_output(),
                Arc::new(NoopProgress),
            )
            .await
            .unwrap();

        assert_eq!(outcome.results.len(), 2);
        let names: Vec<String> = session.results().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["a.png", "b.png"]);

        let summary = session.last_summary().unwrap();
        assert_eq!(summary.session_id, session.id());
        assert_eq!((summary.total, summary.succeeded, summary.failed), (2, 2, 0));
    }

    #[tokio::test]
    async fn process_without_files_is_rejected() {
        let err = BatchSession::new()
            .process(
                &BatchProcessor::default(),
                &EnhancementConfig::default(),
                &png_output(),
                Arc::new(NoopProgress),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LumenError::EmptyInput));
    }

    #[tokio::test]
    async fn new_selection_supersedes_running_batch() {
        init_tracing();
        let session = BatchSession::new();
        session.load_files(vec![
            png_file("old0.png", 16, 16),
            png_file("old1.png", 16, 16),
            png_file("old2.png", 16, 16),
        ]);
        let sink = Arc::new(ReloadOnFirstComplete {
            session: session.clone(),
            replacement: vec![png_file("new.png", 4, 4)],
        });

        let err = session
            .process(
                &BatchProcessor::sequential(),
                &EnhancementConfig::default(),
                &png_output(),
                sink,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, LumenError::Superseded { generation: 1 }));
        assert!(session.results().is_empty());
        assert_eq!(session.generation(), 2);
        assert_eq!(session.files()[0].name, "new.png");
    }

    #[tokio::test]
    async fn nothing_is_published_after_reload_with_buffered_items() {
        // The small items finish long before the large first one, so they sit
        // in the reorder buffer when item 0 triggers the reload.
        let session = BatchSession::new();
        let mut files = vec![png_file("big.png", 3000, 2000)];
        files.extend((0..5).map(|i| png_file(&format!("small{i}.png"), 4, 4)));
        session.load_files(files);
        let sink = Arc::new(ReloadAndRecord {
            session: Mutex::new(Some(session.clone())),
            ..Default::default()
        });
        let processor = BatchProcessor::new(crate::processor::BatchProcessorConfig {
            max_concurrency: 6,
        });

        let err = session
            .process(&processor, &EnhancementConfig::default(), &png_output(), sink.clone())
            .await
            .unwrap_err();

        assert!(matches!(err, LumenError::Superseded { generation: 1 }));
        assert_eq!(*sink.completed.lock().unwrap(), vec![0]);
        assert!(sink.batch.lock().unwrap().is_empty());
        assert!(session.results().is_empty());
        assert_eq!(session.files()[0].name, "new.png");
    }

    #[tokio::test]
    async fn rejected_run_keeps_previous_results() {
        let session = BatchSession::new();
        session.load_files(vec![png_file("a.png", 4, 4)]);
        session
            .process(
                &BatchProcessor::default(),
                &EnhancementConfig::default(),
                &png_output(),
                Arc::new(NoopProgress),
            )
            .await
            .unwrap();
        assert_eq!(session.results().len(), 1);

        let bad = EnhancementConfig {
            contrast: 0.0,
            ..Default::default()
        };
        let err = session
            .process(&BatchProcessor::default(), &bad, &png_output(), Arc::new(NoopProgress))
            .await
            .unwrap_err();

        assert!(matches!(err, LumenError::InvalidConfig(_)));
        assert_eq!(session.results().len(), 1);
        assert!(session.last_summary().is_some());
        assert_eq!(session.export_one(0).unwrap().file_name, "a.png");
    }

    #[tokio::test]
    async fn exports_use_stored_results() {
        let session = BatchSession::new();
        assert!(matches!(session.export_one(0), Err(LumenError::EmptyBatch)));
        assert!(matches!(session.export_zip(None), Err(LumenError::EmptyBatch)));

        session.load_files(vec![png_file("a.png", 4, 4)]);
        session
            .process(
                &BatchProcessor::default(),
                &EnhancementConfig::default(),
                &png_output(),
                Arc::new(NoopProgress),
            )
            .await
            .unwrap();

        let single = session.export_one(0).unwrap();
        assert_eq!(single.file_name, "a.png");
        assert_eq!(single.mime_type, "image/png");
        assert!(matches!(
            session.export_one(3),
            Err(LumenError::ResultNotFound { index: 3, len: 1 })
        ));

        let archive = session.export_zip(Some("holiday")).unwrap();
        assert_eq!(archive.file_name, "holiday.zip");
        assert_eq!(archive.mime_type, "application/zip");
        assert!(!archive.bytes.is_empty());
        assert_eq!(session.results().len(), 1);
    }
}
