// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity metadata index built from the activity export CSV.
//!
//! Records are indexed under their declared activity id and, when the row
//! names a file, under that file's stem. Exports frequently list the
//! compressed name (`42.fit.gz`) while the file on disk is `42.fit`, so both
//! resolve to `42`.

use crate::models::activity::{split_activity_extension, ActivityRecord};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

const COL_ID: &str = "Activity ID";
const COL_NAME: &str = "Activity Name";
const COL_DESCRIPTION: &str = "Activity Description";
const COL_FILENAME: &str = "Filename";
const COL_MEDIA: &str = "Media";

/// Lookup of activity metadata by activity id or file stem.
#[derive(Debug, Default, Clone)]
pub struct MetadataIndex {
    records: HashMap<String, ActivityRecord>,
}

impl MetadataIndex {
    /// Load the index from a CSV export on disk.
    pub fn load_from_file<P: AsRef<Path>>(
        path: P,
        media_base: &Path,
    ) -> Result<Self, MetadataError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| MetadataError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::load_from_reader(file, media_base)
    }

    /// Load the index from any CSV source with a header row.
    pub fn load_from_reader<R: Read>(reader: R, media_base: &Path) -> Result<Self, MetadataError> {
        let mut csv = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = csv
            .headers()
            .map_err(|e| MetadataError::Parse(e.to_string()))?
            .clone();
        let columns = Columns::resolve(&headers)?;

        let mut index = Self::default();
        for row in csv.records() {
            let row = row.map_err(|e| MetadataError::Parse(e.to_string()))?;
            let field = |col: Option<usize>| {
                col.and_then(|i| row.get(i))
                    .map(str::trim)
                    .unwrap_or_default()
            };

            let id = field(Some(columns.id));
            if id.is_empty() {
                continue;
            }

            let name = field(columns.name);
            let record = ActivityRecord {
                id: id.to_string(),
                name: if name.is_empty() {
                    format!("Activity {}", id)
                } else {
                    name.to_string()
                },
                description: field(columns.description).to_string(),
                media_paths: parse_media(field(columns.media), media_base),
            };

            let file_key = file_stem_key(field(columns.filename)).map(str::to_string);
            index.insert_if_absent(id.to_string(), record.clone());
            if let Some(key) = file_key {
                index.insert_if_absent(key, record);
            }
        }

        tracing::info!(keys = index.len(), "Loaded activity metadata");
        Ok(index)
    }

    /// Index a record under `key` unless the key is already taken.
    ///
    /// Returns true if the record was inserted. The first row for a key wins.
    pub fn insert_if_absent(&mut self, key: String, record: ActivityRecord) -> bool {
        match self.records.entry(key) {
            Entry::Occupied(existing) => {
                tracing::debug!(
                    key = %existing.key(),
                    kept = %existing.get().id,
                    ignored = %record.id,
                    "Metadata key already indexed"
                );
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&ActivityRecord> {
        self.records.get(id)
    }

    /// Number of distinct lookup keys (ids and file stems).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Column positions resolved from the header row.
struct Columns {
    id: usize,
    name: Option<usize>,
    description: Option<usize>,
    filename: Option<usize>,
    media: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, MetadataError> {
        // First occurrence wins; exports repeat some header names.
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        Ok(Self {
            id: find(COL_ID).ok_or(MetadataError::MissingColumn(COL_ID))?,
            name: find(COL_NAME),
            description: find(COL_DESCRIPTION),
            filename: find(COL_FILENAME),
            media: find(COL_MEDIA),
        })
    }
}

/// Stem of the file named in a metadata row, used as a secondary key.
fn file_stem_key(filename: &str) -> Option<&str> {
    if filename.is_empty() {
        return None;
    }
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    split_activity_extension(base)
        .map(|(stem, _, _)| stem)
        .filter(|stem| !stem.is_empty())
}

/// Split a pipe-separated media column into paths under `media_base`.
fn parse_media(field: &str, media_base: &Path) -> Vec<PathBuf> {
    field
        .split('|')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| media_base.join(part))
        .collect()
}

/// Errors from metadata loading.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("Failed to read {path:?}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Failed to parse CSV: {0}")]
    Parse(String),

    #[error("Missing required column {0:?}")]
    MissingColumn(&'static str),
}

impl From<MetadataError> for crate::error::AppError {
    fn from(err: MetadataError) -> Self {
        crate::error::AppError::Metadata(err.to_string())
    }
}
