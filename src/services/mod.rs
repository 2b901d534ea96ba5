// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - upload pipeline stages.

pub mod auth;
pub mod discovery;
pub mod ledger;
pub mod media;
pub mod metadata;
pub mod orchestrator;
pub mod poller;
pub mod rwgps;
pub mod uploader;

pub use auth::AuthSession;
pub use discovery::discover_activity_files;
pub use ledger::UploadedLedger;
pub use media::{MediaReport, MediaUploader};
pub use metadata::{MetadataError, MetadataIndex};
pub use orchestrator::{ActivityResult, Orchestrator, RunSummary};
pub use poller::{PollSchedule, TaskPoller};
pub use rwgps::RwgpsClient;
pub use uploader::TripUploader;
