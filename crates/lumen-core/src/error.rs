// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Lumen.

use thiserror::Error;

/// Top-level error type for all Lumen operations.
#[derive(Debug, Error)]
pub enum LumenError {
    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Per-item errors (isolated, never abort a batch) --
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("processing task failed: {0}")]
    Worker(String),

    // -- Batch / export errors --
    #[error("no files selected for processing")]
    EmptyInput,

    #[error("nothing to export: the batch has no processed results")]
    EmptyBatch,

    #[error("batch generation {generation} was superseded by newer input")]
    Superseded { generation: u64 },

    #[error("result index {index} out of range ({len} results)")]
    ResultNotFound { index: usize, len: usize },

    #[error("archive creation failed: {0}")]
    Archive(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LumenError {
    /// Whether this error only affects a single item of a batch.
    ///
    /// Item-scoped errors are reported per file and the batch carries on.
    pub fn is_item_scoped(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Encode(_) | Self::Worker(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LumenError>;
