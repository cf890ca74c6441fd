// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Persisted user preferences.
//
// The UI remembers the last quality, format, common name, and zip name the
// user chose. Where they are stored is up to the embedding application; this
// module only defines the shape and a JSON encoding.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{OutputConfig, OutputFormat};

/// Last-known output settings chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Encoding quality percent (0-100).
    pub quality: u8,
    /// Output format for enhanced images.
    pub format: OutputFormat,
    /// Common prefix for output file names (empty means none).
    pub common_name: String,
    /// Name of the zip archive (empty means the default name).
    pub zip_name: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            quality: 90,
            format: OutputFormat::Jpeg,
            common_name: String::new(),
            zip_name: String::new(),
        }
    }
}

impl Preferences {
    /// Parse preferences from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load preferences from a JSON file, falling back to defaults when the
    /// file does not exist yet.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(json) => Self::from_json(&json),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        Ok(())
    }

    /// Build the output configuration for a processing run.
    ///
    /// Names are trimmed; blank names become `None`. Quality is capped at 100.
    pub fn output_config(&self) -> OutputConfig {
        let non_blank = |s: &str| {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        };
        OutputConfig {
            common_name_prefix: non_blank(&self.common_name),
            format: self.format,
            quality: self.quality.min(100),
            zip_name: non_blank(&self.zip_name),
        }
    }
}
