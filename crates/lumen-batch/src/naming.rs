// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Deterministic output names for results and archives.

use std::collections::HashSet;
use std::path::Path;

use lumen_core::types::OutputFormat;

/// Archive base name used when the user gave none.
pub const DEFAULT_ARCHIVE_NAME: &str = "enhanced_images";

/// Strip the extension: the last `.` and everything after it.
///
/// Names without an extension, or ending in a bare `.`, are returned as-is.
pub fn base_name_of(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(pos) if pos + 1 < file_name.len() && !file_name[pos + 1..].contains('/') => {
            &file_name[..pos]
        }
        _ => file_name,
    }
}

/// `{prefix}_{base}.{ext}`, or `{base}.{ext}` without a prefix.
pub fn output_name(file_name: &str, prefix: Option<&str>, format: OutputFormat) -> String {
    let base = base_name_of(file_name);
    match prefix {
        Some(prefix) => format!("{prefix}_{base}.{}", format.extension()),
        None => format!("{base}.{}", format.extension()),
    }
}

/// Archive file name: the trimmed user name with whitespace runs replaced by
/// `_`, or [`DEFAULT_ARCHIVE_NAME`], plus `.zip`.
pub fn archive_file_name(zip_name: Option<&str>) -> String {
    let trimmed = zip_name.map(str::trim).unwrap_or_default();
    let base = if trimmed.is_empty() {
        DEFAULT_ARCHIVE_NAME
    } else {
        trimmed
    };
    let sanitized = base.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{sanitized}.zip")
}

/// Archive entry name for a result: directory components are stripped so
/// entries cannot escape the extraction directory.
pub(crate) fn archive_entry_name(name: &str, fallback: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(fallback)
        .to_string()
}

/// Make `names` unique by appending `_2`, `_3`, ... to the base of repeats.
pub(crate) fn dedupe_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for name in names {
        let mut candidate = name.to_string();
        let mut n = 2;
        while !seen.insert(candidate.clone()) {
            let base = base_name_of(name);
            candidate = match name.strip_prefix(base) {
                Some(ext) if !ext.is_empty() => format!("{base}_{n}{ext}"),
                _ => format!("{name}_{n}"),
            };
            n += 1;
        }
        unique.push(candidate);
    }
    unique
}
