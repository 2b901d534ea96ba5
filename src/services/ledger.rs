// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Uploaded-activity ledger.
//!
//! A newline-delimited file of activity ids that were turned into a trip or
//! recognised as duplicates. It is read once at startup and only ever
//! appended to, which is what makes re-runs idempotent.

use crate::error::{AppError, Result};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct UploadedLedger {
    path: PathBuf,
    ids: HashSet<String>,
}

impl UploadedLedger {
    /// Read the ledger, treating a missing file as empty.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let ids = match std::fs::read_to_string(&path) {
            Ok(contents) => contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                return Err(AppError::Ledger(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        tracing::info!(path = %path.display(), count = ids.len(), "Loaded uploaded ledger");
        Ok(Self { path, ids })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Append an id to the ledger file and the in-memory set.
    ///
    /// Ids already present are not written again.
    pub fn record(&mut self, id: &str) -> Result<()> {
        if self.ids.contains(id) {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                AppError::Ledger(format!("failed to open {}: {}", self.path.display(), e))
            })?;
        writeln!(file, "{}", id).map_err(|e| {
            AppError::Ledger(format!("failed to append to {}: {}", self.path.display(), e))
        })?;

        self.ids.insert(id.to_string());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
