// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Best-effort media attachment for created trips.
//!
//! Failures are logged and counted per file; they never affect the outcome
//! of the activity the trip was created for.

use crate::error::AppError;
use crate::models::TripRef;
use crate::services::auth::AuthSession;
use crate::services::rwgps::{PhotoUpload, RwgpsClient};
use std::path::{Path, PathBuf};

/// Counts from one attachment pass, for reporting only.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MediaReport {
    pub uploaded: usize,
    /// Files that existed and were tried
    pub attempted: usize,
    /// Files skipped because they were not on disk
    pub missing: usize,
}

pub struct MediaUploader {
    client: RwgpsClient,
    dry_run: bool,
}

impl MediaUploader {
    pub fn new(client: RwgpsClient, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    /// Attach every existing media file to the trip, one request per file.
    pub async fn attach(
        &self,
        auth: &mut AuthSession,
        trip: TripRef,
        paths: &[PathBuf],
    ) -> MediaReport {
        let mut report = MediaReport::default();
        let mut existing = Vec::with_capacity(paths.len());
        for path in paths {
            if path.is_file() {
                existing.push(path);
            } else {
                tracing::warn!(path = %path.display(), trip = %trip, "Media file missing, skipping");
                report.missing += 1;
            }
        }

        if existing.is_empty() {
            return report;
        }

        tracing::info!(count = existing.len(), trip = %trip, "Uploading media");
        for path in existing {
            report.attempted += 1;
            match self.attach_one(auth, trip, path).await {
                Ok(()) => report.uploaded += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), trip = %trip, error = %e, "Media upload failed");
                }
            }
        }

        tracing::info!(
            uploaded = report.uploaded,
            attempted = report.attempted,
            trip = %trip,
            "Media uploaded"
        );
        report
    }

    async fn attach_one(
        &self,
        auth: &mut AuthSession,
        trip: TripRef,
        path: &Path,
    ) -> Result<(), AppError> {
        let token = auth.ensure_authenticated().await?.to_string();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let trip_id = match trip {
            TripRef::Remote(id) if !self.dry_run => id,
            _ => {
                tracing::info!(file = %file_name, trip = %trip, "[DRY-RUN] Would upload photo");
                return Ok(());
            }
        };

        let payload = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::Media(format!("Failed to read {}: {}", path.display(), e)))?;

        let mime = detect_mime(&payload);
        self.client
            .upload_photo(
                &token,
                trip_id,
                PhotoUpload {
                    file_name: file_name.clone(),
                    payload,
                    mime,
                },
            )
            .await?;

        tracing::info!(file = %file_name, trip_id, mime, "Uploaded photo");
        Ok(())
    }
}

/// MIME type of a media file, sniffed from its leading bytes.
pub fn detect_mime(payload: &[u8]) -> &'static str {
    infer::get(payload)
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream")
}
