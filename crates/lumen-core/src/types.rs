// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Lumen batch enhancer.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LumenError, Result};

/// Unique identifier for a batch session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Output encodings the enhancer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    Webp,
}

impl OutputFormat {
    /// MIME type used for downloads and data URLs.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// File extension appended to output names.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    /// Whether the quality setting has any effect for this format.
    ///
    /// WebP is lossy in browsers, but the `image` encoder only writes
    /// lossless WebP, so here it behaves like PNG.
    pub fn is_lossy(&self) -> bool {
        matches!(self, Self::Jpeg)
    }

    /// Infer the output format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = LumenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s).ok_or_else(|| {
            LumenError::InvalidConfig(format!(
                "unknown output format: {s} (expected jpeg, png or webp)"
            ))
        })
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Parameters of the brightness/contrast/saturation enhancement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnhancementConfig {
    /// Additive offset applied after contrast, in [-255, 255].
    pub brightness: i32,
    /// Multiplicative contrast factor around mid-grey; must be > 0.
    pub contrast: f32,
    /// Multiplicative saturation factor around the pixel mean; must be >= 0.
    pub saturation: f32,
    /// Images wider than this are scaled down (never up).
    pub max_width: u32,
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            brightness: 20,
            contrast: 1.3,
            saturation: 1.15,
            max_width: 800,
        }
    }
}

impl EnhancementConfig {
    pub fn validate(&self) -> Result<()> {
        if !(-255..=255).contains(&self.brightness) {
            return Err(LumenError::InvalidConfig(format!(
                "brightness {} outside [-255, 255]",
                self.brightness
            )));
        }
        if !self.contrast.is_finite() || self.contrast <= 0.0 {
            return Err(LumenError::InvalidConfig(format!(
                "contrast must be a positive number, got {}",
                self.contrast
            )));
        }
        if !self.saturation.is_finite() || self.saturation < 0.0 {
            return Err(LumenError::InvalidConfig(format!(
                "saturation must be zero or positive, got {}",
                self.saturation
            )));
        }
        if self.max_width == 0 {
            return Err(LumenError::InvalidConfig(
                "max_width must be at least 1 pixel".into(),
            ));
        }
        Ok(())
    }
}

/// Encoding and naming settings shared by every item of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Prepended to every output name as `{prefix}_`.
    pub common_name_prefix: Option<String>,
    pub format: OutputFormat,
    /// Percent in [0, 100]; only meaningful for lossy formats.
    pub quality: u8,
    /// Base name of the zip archive (without `.zip`).
    pub zip_name: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            common_name_prefix: None,
            format: OutputFormat::Jpeg,
            quality: 90,
            zip_name: None,
        }
    }
}

impl OutputConfig {
    pub fn validate(&self) -> Result<()> {
        if self.quality > 100 {
            return Err(LumenError::InvalidConfig(format!(
                "quality {} outside [0, 100]",
                self.quality
            )));
        }
        Ok(())
    }

    /// The trimmed name prefix, or `None` when it is absent or blank.
    pub fn prefix(&self) -> Option<&str> {
        self.common_name_prefix
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// A picked or dropped file: its name and raw, still-encoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: Arc::from(bytes.into()),
        }
    }

    /// Size of the raw file in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Encoded image bytes tagged with their format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// One named output image produced from one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedResult {
    pub name: String,
    pub encoded: EncodedImage,
    /// Index of the source file in the batch input list.
    pub source_index: usize,
}

/// Totals for a finished batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub session_id: SessionId,
    pub generation: u64,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchSummary {
    /// Wall-clock duration of the run.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
