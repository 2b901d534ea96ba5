// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-activity upload pipeline.
//!
//! Handles the core workflow for each activity file, strictly in order:
//! 1. Apply the allow-list and the uploaded ledger
//! 2. Resolve metadata for the inferred activity id
//! 3. Upload the file as a trip (authenticating on first use)
//! 4. Poll the queued task until it finishes
//! 5. Attach media to a created trip
//! 6. Record the activity in the ledger
//!
//! Per-activity failures are counted and the run moves on. Only fatal
//! errors (credentials, ledger writes) end the run early.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{ActivityFile, TaskOutcome, TripRef};
use crate::services::auth::AuthSession;
use crate::services::ledger::UploadedLedger;
use crate::services::media::{MediaReport, MediaUploader};
use crate::services::metadata::MetadataIndex;
use crate::services::poller::{PollSchedule, TaskPoller};
use crate::services::rwgps::RwgpsClient;
use crate::services::uploader::TripUploader;
use std::collections::HashSet;

/// Switches that change which activities are processed and whether
/// anything is persisted.
#[derive(Debug, Clone, Default)]
struct RunOptions {
    only: Option<HashSet<String>>,
    force: bool,
    dry_run: bool,
}

/// What happened to one activity file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityResult {
    /// Excluded by the allow-list; not counted as skipped.
    Filtered,
    AlreadyUploaded,
    NoMetadata,
    /// The service already had this content. Counted as skipped.
    Duplicate,
    Uploaded { trip: TripRef, media: MediaReport },
    Failed(String),
}

/// Aggregate counts for a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub successes: usize,
    pub skipped: usize,
    pub errors: usize,
    pub filtered: usize,
}

impl RunSummary {
    pub fn record(&mut self, result: &ActivityResult) {
        match result {
            ActivityResult::Filtered => self.filtered += 1,
            ActivityResult::AlreadyUploaded
            | ActivityResult::NoMetadata
            | ActivityResult::Duplicate => self.skipped += 1,
            ActivityResult::Uploaded { .. } => self.successes += 1,
            ActivityResult::Failed(_) => self.errors += 1,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Summary:\n  Successes: {}\n  Skipped: {}\n  Errors: {}",
            self.successes, self.skipped, self.errors
        )
    }
}

/// Drives every activity through the pipeline.
pub struct Orchestrator {
    options: RunOptions,
    index: MetadataIndex,
    ledger: UploadedLedger,
    auth: AuthSession,
    uploader: TripUploader,
    poller: TaskPoller,
    media: MediaUploader,
}

impl Orchestrator {
    pub fn new(config: &Config, index: MetadataIndex, ledger: UploadedLedger) -> Self {
        let client = RwgpsClient::from_config(config);
        let schedule = PollSchedule {
            interval: config.poll_interval,
            timeout: config.poll_timeout,
        };

        Self {
            options: RunOptions {
                only: config.only.clone(),
                force: config.force,
                dry_run: config.dry_run,
            },
            index,
            ledger,
            auth: AuthSession::from_config(client.clone(), config),
            uploader: TripUploader::new(client.clone(), config.dry_run),
            poller: TaskPoller::new(client.clone(), schedule, config.poll_debug),
            media: MediaUploader::new(client, config.dry_run),
        }
    }

    /// Process files in the order given and return the aggregate counts.
    pub async fn run(&mut self, files: &[ActivityFile]) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for file in files {
            let result = self.process(file).await?;
            summary.record(&result);
        }

        tracing::info!(
            successes = summary.successes,
            skipped = summary.skipped,
            errors = summary.errors,
            filtered = summary.filtered,
            "Run complete"
        );
        Ok(summary)
    }

    /// Take one activity file through the pipeline.
    ///
    /// Returns `Err` only for fatal errors.
    pub async fn process(&mut self, file: &ActivityFile) -> Result<ActivityResult> {
        let id = file.inferred_id.as_str();
        let file_name = file.file_name();

        if let Some(only) = &self.options.only {
            if !only.contains(id) {
                return Ok(ActivityResult::Filtered);
            }
        }

        if !self.options.force && self.ledger.contains(id) {
            tracing::info!(activity_id = id, file = %file_name, "Skip (already uploaded)");
            return Ok(ActivityResult::AlreadyUploaded);
        }

        let Some(record) = self.index.get(id).cloned() else {
            tracing::warn!(activity_id = id, file = %file_name, "No metadata for activity, skipping");
            return Ok(ActivityResult::NoMetadata);
        };

        tracing::info!(
            activity_id = id,
            file = %file_name,
            format = file.format.as_str(),
            compressed = file.compressed,
            name = %record.name,
            "Uploading activity"
        );
        let handle = match self
            .uploader
            .upload(&mut self.auth, file, &record.name, &record.description)
            .await
        {
            Ok(handle) => handle,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::error!(activity_id = id, file = %file_name, error = %e, "Upload failed");
                return Ok(ActivityResult::Failed(e.to_string()));
            }
        };

        let outcome = self.poller.wait_for_trip(&self.auth, handle, &file_name).await;
        match outcome {
            TaskOutcome::Duplicate => {
                tracing::info!(activity_id = id, file = %file_name, "Duplicate detected; skipping media");
                if !self.options.dry_run {
                    self.ledger.record(id)?;
                }
                Ok(ActivityResult::Duplicate)
            }
            TaskOutcome::Success(trip) => {
                let media = self
                    .media
                    .attach(&mut self.auth, trip, &record.media_paths)
                    .await;
                if !self.options.dry_run {
                    if let TripRef::Remote(_) = trip {
                        self.ledger.record(id)?;
                    }
                }
                tracing::info!(activity_id = id, file = %file_name, trip = %trip, "Activity uploaded");
                Ok(ActivityResult::Uploaded { trip, media })
            }
            TaskOutcome::Failed(message) => {
                tracing::error!(activity_id = id, file = %file_name, task_message = %message, "Remote processing failed");
                Ok(ActivityResult::Failed(format!("task failed: {}", message)))
            }
            TaskOutcome::TimedOut { last_status } => {
                let last_status = last_status.unwrap_or_else(|| "none".to_string());
                tracing::error!(
                    activity_id = id,
                    file = %file_name,
                    last_status = %last_status,
                    "Timed out waiting for trip; will retry on next run"
                );
                Ok(ActivityResult::Failed(format!(
                    "timed out waiting for task (last status: {})",
                    last_status
                )))
            }
        }
    }
}
