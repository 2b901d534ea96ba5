// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity file discovery.

use crate::error::Result;
use crate::models::ActivityFile;
use std::path::Path;

/// List activity files directly inside `dir`, sorted by file name.
///
/// A missing directory yields no files.
pub fn discover_activity_files(dir: &Path) -> Result<Vec<ActivityFile>> {
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "Activity directory missing");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(file) = ActivityFile::from_path(&entry.path()) {
            files.push(file);
        }
    }

    files.sort_by_key(|f| f.file_name());
    tracing::info!(dir = %dir.display(), count = files.len(), "Discovered activity files");
    Ok(files)
}
