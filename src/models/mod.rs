// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the uploader.

pub mod activity;
pub mod task;

pub use activity::{infer_activity_id, ActivityFile, ActivityFormat, ActivityRecord};
pub use task::{QueuedTask, TaskHandle, TaskOutcome, TaskState, TaskStatusResponse, TripRef};
