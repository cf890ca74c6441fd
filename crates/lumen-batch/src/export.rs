// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export of processed results: single-file downloads and zip archives.

use std::io::{Cursor, Write};

use lumen_core::error::{LumenError, Result};
use lumen_core::types::ProcessedResult;
use tracing::{debug, info, instrument};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::naming;

/// MIME type of every archive produced by [`export_zip`].
pub const ZIP_MIME_TYPE: &str = "application/zip";

/// Bytes ready to hand to the user, with a suggested file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// A single result as a download; the bytes pass through untouched.
pub fn export_one(result: &ProcessedResult) -> ExportedFile {
    ExportedFile {
        file_name: result.name.clone(),
        mime_type: result.encoded.mime_type(),
        bytes: result.encoded.bytes.clone(),
    }
}

/// Pack every result into one deflate-compressed zip archive.
///
/// Entries are named after the results, in result order. An entry name can
/// differ from `result.name` (and from what [`export_one`] suggests) in two
/// cases: directory components are stripped, and names that repeat get a
/// numeric suffix (`a.png`, `a_2.png`) so no entry overwrites another.
#[instrument(skip(results), fields(results = results.len()))]
pub fn export_zip(results: &[ProcessedResult], zip_name: Option<&str>) -> Result<ExportedFile> {
    if results.is_empty() {
        return Err(LumenError::EmptyBatch);
    }

    let file_name = naming::archive_file_name(zip_name);
    let entry_names: Vec<String> = results
        .iter()
        .map(|r| naming::archive_entry_name(&r.name, &format!("image_{}", r.source_index)))
        .collect();
    let entry_names = naming::dedupe_names(entry_names.iter().map(String::as_str));

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for (result, entry_name) in results.iter().zip(&entry_names) {
        if *entry_name != result.name {
            debug!(result = %result.name, entry = %entry_name, "Archive entry renamed");
        }
        zip.start_file(entry_name.as_str(), options)
            .map_err(|e| LumenError::Archive(format!("failed to add {entry_name}: {e}")))?;
        zip.write_all(&result.encoded.bytes)
            .map_err(|e| LumenError::Archive(format!("failed to write {entry_name}: {e}")))?;
        debug!(entry = %entry_name, bytes = result.encoded.bytes.len(), "Archive entry written");
    }

    let bytes = zip
        .finish()
        .map_err(|e| LumenError::Archive(format!("failed to finalize archive: {e}")))?
        .into_inner();

    info!(file = %file_name, entries = results.len(), size = bytes.len(), "Archive created");
    Ok(ExportedFile {
        file_name,
        mime_type: ZIP_MIME_TYPE,
        bytes,
    })
}
