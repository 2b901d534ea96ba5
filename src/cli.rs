// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Command-line flags. Flags override values loaded from the environment.

use crate::config::{seconds_to_duration, Config};
use clap::Parser;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "rwgps-uploader",
    version,
    about = "Upload activity files to RideWithGPS as trips using exported metadata"
)]
pub struct Cli {
    /// Do not perform network mutations
    #[arg(long)]
    pub dry_run: bool,

    /// Comma-separated list of activity IDs to restrict uploads to
    #[arg(long, value_delimiter = ',', value_name = "IDS")]
    pub only: Vec<String>,

    /// Re-upload even if already recorded as uploaded
    #[arg(long)]
    pub force: bool,

    /// Seconds between queued task polls [env: RWGPS_TASK_POLL_INTERVAL, default 2]
    #[arg(long, value_name = "SECS", value_parser = parse_seconds_arg)]
    pub poll_interval: Option<Duration>,

    /// Max seconds to wait for a queued task [env: RWGPS_TASK_POLL_TIMEOUT, default 300]
    #[arg(long, value_name = "SECS", value_parser = parse_seconds_arg)]
    pub poll_timeout: Option<Duration>,

    /// Log every queued task poll
    #[arg(long)]
    pub poll_debug: bool,

    /// Activity metadata export [env: RWGPS_CSV_PATH]
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Directory containing activity files [env: RWGPS_ACTIVITIES_DIR]
    #[arg(long, value_name = "DIR")]
    pub activities_dir: Option<PathBuf>,

    /// Uploaded-activity ledger [env: RWGPS_UPLOADED_LOG]
    #[arg(long, value_name = "PATH")]
    pub ledger: Option<PathBuf>,

    /// Base directory for media file names in the export [env: RWGPS_MEDIA_DIR]
    #[arg(long, value_name = "DIR")]
    pub media_dir: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}

impl Cli {
    /// Apply flags on top of an environment-derived configuration.
    pub fn apply(&self, config: &mut Config) {
        config.dry_run |= self.dry_run;
        config.force |= self.force;
        config.poll_debug |= self.poll_debug;

        let only: HashSet<String> = self
            .only
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();
        if !only.is_empty() {
            config.only = Some(only);
        }

        if let Some(interval) = self.poll_interval {
            config.poll_interval = interval;
        }
        if let Some(timeout) = self.poll_timeout {
            config.poll_timeout = timeout;
        }
        if let Some(path) = &self.csv {
            config.metadata_csv = path.clone();
        }
        if let Some(dir) = &self.activities_dir {
            config.activities_dir = dir.clone();
        }
        if let Some(path) = &self.ledger {
            config.uploaded_log = path.clone();
        }
        if let Some(dir) = &self.media_dir {
            config.media_dir = dir.clone();
        }
    }
}

fn parse_seconds_arg(raw: &str) -> Result<Duration, String> {
    seconds_to_duration(raw).ok_or_else(|| format!("invalid number of seconds: {:?}", raw))
}
