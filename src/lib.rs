// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! RWGPS uploader: publish exported activities to RideWithGPS as trips.
//!
//! Activity files are matched against an exported metadata CSV, uploaded,
//! polled until the service has created the trip, and decorated with the
//! activity's media. A local ledger keeps re-runs from uploading twice.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

use config::Config;
use error::{AppError, Result};
use services::{discover_activity_files, MetadataIndex, Orchestrator, RunSummary, UploadedLedger};

/// Run a complete upload pass with the given configuration.
pub async fn run(config: Config) -> Result<RunSummary> {
    config.trace_loaded();

    if !config.has_credentials() {
        return Err(AppError::Configuration(
            "RWGPS_EMAIL and RWGPS_PASSWORD (or RWGPS_AUTH_TOKEN) must be set".to_string(),
        ));
    }

    let index = MetadataIndex::load_from_file(&config.metadata_csv, &config.media_dir)?;
    println!("Loaded metadata for {} activities from CSV.", index.len());

    if let Some(only) = &config.only {
        println!("Restricting to {} specified activities.", only.len());
    }

    let ledger = UploadedLedger::load(&config.uploaded_log)?;
    println!("Already uploaded: {}", ledger.len());

    let files = discover_activity_files(&config.activities_dir)?;
    if files.is_empty() {
        println!("No activity files found to process.");
        return Ok(RunSummary::default());
    }
    println!(
        "Found {} potential files in {}.",
        files.len(),
        config.activities_dir.display()
    );

    let mut orchestrator = Orchestrator::new(&config, index, ledger);
    orchestrator.run(&files).await
}
