// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Advisory notices shown to the user.
//
// Every outcome the UI reports (toasts, alerts) comes from here, so error
// wording lives in one place. Failures are never fatal to the session; a
// notice only tells the user what happened and what to try next.

use crate::error::LumenError;
use crate::types::BatchSummary;

/// How a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Routine status (previews ready, download started).
    Info,
    /// The user must do something before trying again (pick files, process first).
    ActionRequired,
    /// One file was skipped; the rest of the batch is fine.
    Skipped,
    /// Cannot be fixed by retrying with the same input.
    Permanent,
}

/// A plain-language message with an actionable suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Short summary (shown as the toast text).
    pub message: String,
    /// What the user can try next; empty for purely informational notices.
    pub suggestion: String,
    pub severity: Severity,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: String::new(),
            severity: Severity::Info,
        }
    }

    /// Shown once the before-thumbnails for a new selection are ready.
    pub fn previews_ready(count: usize) -> Self {
        Self::info(format!(
            "Previews ready for {count} {}.",
            if count == 1 { "image" } else { "images" }
        ))
    }

    /// Shown when a batch run has finished.
    pub fn batch_finished(summary: &BatchSummary) -> Self {
        if summary.failed == 0 {
            return Self::info(format!(
                "All {} {} enhanced.",
                summary.succeeded,
                if summary.succeeded == 1 { "image" } else { "images" }
            ));
        }
        Self {
            message: format!(
                "Enhanced {} of {} images; {} could not be processed.",
                summary.succeeded, summary.total, summary.failed
            ),
            suggestion: "The skipped files may be damaged or not images. Check them and try again.".into(),
            severity: Severity::Skipped,
        }
    }

    /// Shown when an archive download starts.
    pub fn zip_started(file_name: &str) -> Self {
        Self::info(format!("Downloading {file_name}."))
    }
}

/// Convert a `LumenError` into a `Notice` the user can act on.
pub fn humanize_error(err: &LumenError) -> Notice {
    match err {
        LumenError::InvalidConfig(detail) => Notice {
            message: "Those enhancement settings aren't valid.".into(),
            suggestion: format!("Reset the settings to their defaults and try again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        LumenError::Decode(_) => Notice {
            message: "One image couldn't be opened and was skipped.".into(),
            suggestion: "The file may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            severity: Severity::Skipped,
        },

        LumenError::Encode(_) => Notice {
            message: "One image couldn't be saved in the chosen format and was skipped.".into(),
            suggestion: "Try a different output format, such as PNG.".into(),
            severity: Severity::Skipped,
        },

        LumenError::Worker(_) => Notice {
            message: "Something went wrong while enhancing one image, so it was skipped.".into(),
            suggestion: "Try processing that image again on its own.".into(),
            severity: Severity::Skipped,
        },

        LumenError::EmptyInput => Notice {
            message: "No images selected.".into(),
            suggestion: "Pick or drop some images first.".into(),
            severity: Severity::ActionRequired,
        },

        LumenError::EmptyBatch => Notice {
            message: "There's nothing to download yet.".into(),
            suggestion: "Process your images first, then download them.".into(),
            severity: Severity::ActionRequired,
        },

        LumenError::Superseded { .. } => Notice {
            message: "Processing stopped because new images were selected.".into(),
            suggestion: "Press process again to enhance the new selection.".into(),
            severity: Severity::Info,
        },

        LumenError::ResultNotFound { .. } => Notice {
            message: "That image isn't ready to download.".into(),
            suggestion: "Wait for processing to finish, then try again.".into(),
            severity: Severity::ActionRequired,
        },

        LumenError::Archive(_) => Notice {
            message: "The zip file couldn't be created.".into(),
            suggestion: "Try again, or download the images one at a time.".into(),
            severity: Severity::Permanent,
        },

        LumenError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => Notice {
                message: "The file couldn't be found.".into(),
                suggestion: "It may have been moved or deleted. Try choosing it again.".into(),
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => Notice {
                message: "The app doesn't have permission to use that file.".into(),
                suggestion: "Check the file permissions, or copy it somewhere else first.".into(),
                severity: Severity::ActionRequired,
            },
            _ => Notice {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, your storage may be full.".into(),
                severity: Severity::Permanent,
            },
        },

        LumenError::Serialization(_) => Notice {
            message: "Your saved settings couldn't be read.".into(),
            suggestion: "The defaults are being used instead. Choose your settings again to save them.".into(),
            severity: Severity::Info,
        },
    }
}
