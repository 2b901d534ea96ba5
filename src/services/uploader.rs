// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trip submission.
//!
//! The service only accepts uncompressed activity files, so gzip files are
//! inflated in memory before they are sent.

use crate::error::AppError;
use crate::models::{ActivityFile, TaskHandle};
use crate::services::auth::AuthSession;
use crate::services::rwgps::{RwgpsClient, TripUpload};
use flate2::read::GzDecoder;
use std::io::Read;

pub struct TripUploader {
    client: RwgpsClient,
    dry_run: bool,
}

impl TripUploader {
    pub fn new(client: RwgpsClient, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    /// Submit one activity file as a trip and return the task to poll.
    pub async fn upload(
        &self,
        auth: &mut AuthSession,
        file: &ActivityFile,
        name: &str,
        description: &str,
    ) -> Result<TaskHandle, AppError> {
        let token = auth.ensure_authenticated().await?.to_string();
        let payload = read_payload(file).await?;
        let file_name = file.upload_file_name();

        if self.dry_run {
            tracing::info!(
                file = %file.file_name(),
                name,
                description_len = description.len(),
                bytes = payload.len(),
                "[DRY-RUN] Would upload trip"
            );
            return Ok(TaskHandle::DryRun);
        }

        tracing::debug!(file = %file_name, bytes = payload.len(), "Uploading trip");
        let task_id = self
            .client
            .create_trip(
                &token,
                TripUpload {
                    file_name,
                    payload,
                    name: name.to_string(),
                    description: description.to_string(),
                },
            )
            .await?;

        tracing::info!(file = %file.file_name(), task_id, "Upload queued");
        Ok(TaskHandle::Queued(task_id))
    }
}

/// Read an activity file, inflating it if it is gzip-compressed.
async fn read_payload(file: &ActivityFile) -> Result<Vec<u8>, AppError> {
    let raw = tokio::fs::read(&file.path).await.map_err(|e| {
        AppError::Upload(format!("Failed to read {}: {}", file.path.display(), e))
    })?;

    if !file.compressed {
        return Ok(raw);
    }

    let path = file.path.display().to_string();
    tokio::task::spawn_blocking(move || decompress_gzip(&raw))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Decompression task failed: {}", e)))?
        .map_err(|e| AppError::Upload(format!("Failed to decompress {}: {}", path, e)))
}

/// Fully inflate a gzip stream into memory.
pub fn decompress_gzip(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
