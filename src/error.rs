// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.
//!
//! Per-activity failures (`Upload`, `Poll`, `Media`) are counted by the
//! orchestrator and the run continues. Fatal failures abort the run before
//! any further activity is touched.

/// Application error type shared by every pipeline stage.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Trip upload failed: {0}")]
    Upload(String),

    #[error("Task polling failed: {0}")]
    Poll(String),

    #[error("Media upload failed: {0}")]
    Media(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Uploaded ledger error: {0}")]
    Ledger(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Returns true if the error must abort the whole run rather than a
    /// single activity.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::Configuration(_)
                | AppError::Auth(_)
                | AppError::Metadata(_)
                | AppError::Ledger(_)
        )
    }
}

/// Truncate a response body for inclusion in an error or log line.
///
/// Cuts on a char boundary so multi-byte bodies never panic.
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body.to_string(),
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, AppError>;
