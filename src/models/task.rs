// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Remote upload task models.
//!
//! A trip upload is processed asynchronously by the service: the upload
//! returns a task id, and the task's status is polled until it reaches a
//! terminal state.

use serde::Deserialize;
use serde_json::Value;

/// Body of the queued task status endpoint.
///
/// Task fields are kept as loose JSON: the service is not consistent about
/// their types, and one odd field must not hide the task's response code.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskStatusResponse {
    #[serde(default)]
    pub queued_tasks: Option<Vec<QueuedTask>>,
    /// Leading part of the raw body, for verbose poll logging
    #[serde(skip)]
    pub body_snippet: String,
}

impl TaskStatusResponse {
    /// The first task entry, which is the one that was asked for.
    pub fn first_task(&self) -> Option<&QueuedTask> {
        self.queued_tasks.as_deref().and_then(|tasks| tasks.first())
    }
}

/// One queued task as reported by the service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueuedTask {
    /// Free-form processing status; only used for logging
    #[serde(default)]
    pub status: Option<Value>,
    /// `success`, `duplicate`, `error`, `failed`, or anything else while queued
    #[serde(default)]
    pub response_code: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub progress: Option<Value>,
    /// Objects created by the task, e.g. `{"type": "trip", "trip": {"id": 1}}`
    #[serde(default)]
    pub associated_objects: Option<Value>,
}

impl QueuedTask {
    pub fn response_code(&self) -> Option<&str> {
        self.response_code.as_ref().and_then(Value::as_str)
    }

    /// Message rendered as text; structured messages are kept as JSON.
    pub fn message_text(&self) -> Option<String> {
        match self.message.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Id of the first associated trip object, if the service has attached one.
    pub fn trip_id(&self) -> Option<u64> {
        self.associated_objects
            .as_ref()
            .and_then(Value::as_array)?
            .iter()
            .filter(|obj| obj.get("type").and_then(Value::as_str) == Some("trip"))
            .find_map(|obj| obj.get("trip").and_then(|t| t.get("id")).and_then(id_from_value))
    }

    /// Status rendered for log lines.
    pub fn status_label(&self) -> String {
        match &self.status {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "unknown".to_string(),
        }
    }
}

/// Read a positive id sent either as a number or a numeric string.
pub fn id_from_value(value: &Value) -> Option<u64> {
    let id = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    id.filter(|id| *id != 0)
}

/// Handle returned by a trip upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskHandle {
    /// The service queued the upload under this task id.
    Queued(u64),
    /// Dry-run: nothing was sent, so there is nothing to poll.
    DryRun,
}

/// Reference to a created trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripRef {
    Remote(u64),
    /// Stand-in for a trip that a dry-run would have created.
    DryRun,
}

impl std::fmt::Display for TripRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TripRef::Remote(id) => write!(f, "{}", id),
            TripRef::DryRun => write!(f, "dry-run"),
        }
    }
}

/// Polling state of a single task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    /// Not yet polled.
    Pending,
    /// Queued or still being processed remotely.
    Processing,
    Success(u64),
    /// The service matched previously uploaded content.
    Duplicate,
    Error(String),
}

impl TaskState {
    /// Classify one status observation.
    ///
    /// A success without an associated trip stays `Processing`: the service
    /// may attach the trip slightly after flagging success.
    pub fn from_task(task: Option<&QueuedTask>) -> Self {
        let Some(task) = task else {
            return TaskState::Processing;
        };

        match task.response_code() {
            Some("success") => match task.trip_id() {
                Some(trip_id) => TaskState::Success(trip_id),
                None => TaskState::Processing,
            },
            Some("duplicate") => TaskState::Duplicate,
            Some("error") | Some("failed") => TaskState::Error(
                task.message_text()
                    .unwrap_or_else(|| "no message from service".to_string()),
            ),
            _ => TaskState::Processing,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Success(_) | TaskState::Duplicate | TaskState::Error(_)
        )
    }
}

/// Final result of waiting on a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success(TripRef),
    Duplicate,
    Failed(String),
    /// The deadline passed before a terminal state was seen.
    TimedOut { last_status: Option<String> },
}
