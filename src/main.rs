// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! RWGPS uploader command-line entry point.
//!
//! Exit status: 0 when every activity was handled, 1 if any activity failed
//! or the run was aborted, 2 if configuration is missing or invalid.

use anyhow::Context;
use clap::Parser;
use rwgps_uploader::{cli::Cli, config::Config, error::AppError};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EXIT_ERRORS: u8 = 1;
const EXIT_CONFIG: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let config = match Config::from_env() {
        Ok(mut config) => {
            cli.apply(&mut config);
            config
        }
        Err(e) => {
            tracing::error!(error = %e, "Configuration error");
            eprintln!("ERROR: {} (set it in the environment or a .env file)", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    match run(config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_ERRORS),
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            match e.downcast_ref::<AppError>() {
                Some(AppError::Configuration(_)) => ExitCode::from(EXIT_CONFIG),
                _ => ExitCode::from(EXIT_ERRORS),
            }
        }
    }
}

/// Run the upload pass and print the summary. Returns true if no activity failed.
async fn run(config: Config) -> anyhow::Result<bool> {
    let summary = rwgps_uploader::run(config)
        .await
        .context("Upload run aborted")?;

    println!("\n{}", summary);
    Ok(!summary.has_errors())
}

/// Initialize logging: human-readable by default, flattened JSON on request.
fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rwgps_uploader=info,warn"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}
