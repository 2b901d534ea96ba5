// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Local activity models: metadata records and activity files on disk.

use std::path::{Path, PathBuf};

/// Compressed extensions, checked before the plain ones so `.fit.gz`
/// is never mistaken for a bare `.gz`.
const COMPRESSED_EXTENSIONS: [(&str, ActivityFormat); 3] = [
    (".fit.gz", ActivityFormat::Fit),
    (".gpx.gz", ActivityFormat::Gpx),
    (".tcx.gz", ActivityFormat::Tcx),
];

const PLAIN_EXTENSIONS: [(&str, ActivityFormat); 3] = [
    (".fit", ActivityFormat::Fit),
    (".gpx", ActivityFormat::Gpx),
    (".tcx", ActivityFormat::Tcx),
];

/// Descriptive metadata for one activity, taken from the metadata export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRecord {
    /// Activity identifier as declared in the export
    pub id: String,
    /// Trip name to submit
    pub name: String,
    /// Trip description to submit (may be empty)
    pub description: String,
    /// Media files to attach, already resolved against the media base directory
    pub media_paths: Vec<PathBuf>,
}

/// Activity file format accepted by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityFormat {
    Fit,
    Gpx,
    Tcx,
}

impl ActivityFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityFormat::Fit => "fit",
            ActivityFormat::Gpx => "gpx",
            ActivityFormat::Tcx => "tcx",
        }
    }
}

/// Split a file name into `(stem, format, compressed)` if it carries a
/// known activity extension.
pub fn split_activity_extension(file_name: &str) -> Option<(&str, ActivityFormat, bool)> {
    for (ext, format) in COMPRESSED_EXTENSIONS {
        if let Some(stem) = file_name.strip_suffix(ext) {
            return Some((stem, format, true));
        }
    }
    for (ext, format) in PLAIN_EXTENSIONS {
        if let Some(stem) = file_name.strip_suffix(ext) {
            return Some((stem, format, false));
        }
    }
    None
}

/// Derive the activity identifier from a file name.
///
/// Strips one known extension (double extensions first); any other name is
/// returned unchanged.
pub fn infer_activity_id(file_name: &str) -> &str {
    split_activity_extension(file_name)
        .map(|(stem, _, _)| stem)
        .unwrap_or(file_name)
}

/// An activity file discovered on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityFile {
    pub path: PathBuf,
    pub inferred_id: String,
    pub format: ActivityFormat,
    pub compressed: bool,
}

impl ActivityFile {
    /// Build from a path, returning `None` if the file name has no known
    /// activity extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let (stem, format, compressed) = split_activity_extension(file_name)?;
        Some(Self {
            path: path.to_path_buf(),
            inferred_id: stem.to_string(),
            format,
            compressed,
        })
    }

    /// File name as found on disk.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name to present to the remote service: compressed files are
    /// sent decompressed, so the `.gz` suffix is dropped.
    pub fn upload_file_name(&self) -> String {
        let name = self.file_name();
        if self.compressed {
            name.strip_suffix(".gz").unwrap_or(&name).to_string()
        } else {
            name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_strips_double_extension() {
        assert_eq!(infer_activity_id("12345.fit.gz"), "12345");
        assert_eq!(infer_activity_id("12345.gpx.gz"), "12345");
        assert_eq!(infer_activity_id("12345.tcx.gz"), "12345");
    }

    #[test]
    fn test_infer_strips_single_extension() {
        assert_eq!(infer_activity_id("12345.fit"), "12345");
        assert_eq!(infer_activity_id("12345.gpx"), "12345");
        assert_eq!(infer_activity_id("12345.tcx"), "12345");
    }

    #[test]
    fn test_infer_strips_only_one_suffix() {
        assert_eq!(infer_activity_id("ride.gpx.fit"), "ride.gpx");
        assert_eq!(infer_activity_id("a.fit.gz.fit"), "a.fit.gz");
    }

    #[test]
    fn test_infer_unknown_extension_unchanged() {
        assert_eq!(infer_activity_id("12345.gz"), "12345.gz");
        assert_eq!(infer_activity_id("notes.txt"), "notes.txt");
        assert_eq!(infer_activity_id("12345"), "12345");
        assert_eq!(infer_activity_id("12345.FIT"), "12345.FIT");
    }

    #[test]
    fn test_activity_file_from_path() {
        let file = ActivityFile::from_path(Path::new("activities/cycling/42.fit.gz")).unwrap();
        assert_eq!(file.inferred_id, "42");
        assert_eq!(file.format, ActivityFormat::Fit);
        assert!(file.compressed);
        assert_eq!(file.file_name(), "42.fit.gz");
        assert_eq!(file.upload_file_name(), "42.fit");

        let file = ActivityFile::from_path(Path::new("7.gpx")).unwrap();
        assert_eq!(file.inferred_id, "7");
        assert_eq!(file.format, ActivityFormat::Gpx);
        assert!(!file.compressed);
        assert_eq!(file.upload_file_name(), "7.gpx");
    }

    #[test]
    fn test_activity_file_rejects_unknown_extension() {
        assert!(ActivityFile::from_path(Path::new("archive.gz")).is_none());
        assert!(ActivityFile::from_path(Path::new("photo.jpg")).is_none());
    }
}
