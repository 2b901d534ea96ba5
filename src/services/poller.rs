// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Queued task polling.
//!
//! After a trip upload the service processes the file asynchronously. The
//! poller checks the task at a fixed interval until it reaches a terminal
//! state or the deadline passes:
//!
//! ```text
//! Pending -> Processing -> Success(trip) | Duplicate | Error
//!                       \-> (deadline) TimedOut
//! ```
//!
//! Transport errors, non-200 responses and unparsable bodies on a single
//! tick leave the task in `Processing`.

use crate::models::{TaskHandle, TaskOutcome, TaskState, TripRef};
use crate::services::auth::AuthSession;
use crate::services::rwgps::{mask_token, RwgpsClient};
use std::time::Duration;
use tokio::time::Instant;

/// Fixed polling interval and overall deadline for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub interval: Duration,
    pub timeout: Duration,
}

pub struct TaskPoller {
    client: RwgpsClient,
    schedule: PollSchedule,
    verbose: bool,
}

impl TaskPoller {
    pub fn new(client: RwgpsClient, schedule: PollSchedule, verbose: bool) -> Self {
        Self {
            client,
            schedule,
            verbose,
        }
    }

    /// Poll a task until it finishes or the deadline passes.
    pub async fn wait_for_trip(
        &self,
        auth: &AuthSession,
        handle: TaskHandle,
        label: &str,
    ) -> TaskOutcome {
        let task_id = match handle {
            TaskHandle::Queued(id) => id,
            TaskHandle::DryRun => {
                tracing::info!(file = label, "[DRY-RUN] Would poll task status");
                return TaskOutcome::Success(TripRef::DryRun);
            }
        };

        let token = auth.token().unwrap_or_default();
        let deadline = Instant::now() + self.schedule.timeout;
        let mut state = TaskState::Pending;
        let mut last_status: Option<String> = None;
        let mut tick = 0u32;

        while Instant::now() < deadline {
            tick += 1;
            let next = self.tick(token, task_id, tick, &mut last_status).await;
            if next != state {
                tracing::debug!(task_id, from = ?state, to = ?next, "Task state changed");
                state = next;
            }

            match &state {
                TaskState::Success(trip_id) => {
                    tracing::info!(task_id, trip_id, file = label, "Task complete");
                    return TaskOutcome::Success(TripRef::Remote(*trip_id));
                }
                TaskState::Duplicate => {
                    tracing::info!(task_id, file = label, "Task marked duplicate");
                    return TaskOutcome::Duplicate;
                }
                TaskState::Error(message) => {
                    tracing::warn!(task_id, file = label, task_message = %message, "Task failed");
                    return TaskOutcome::Failed(message.clone());
                }
                TaskState::Pending | TaskState::Processing => {}
            }

            tokio::time::sleep(self.schedule.interval).await;
        }

        tracing::warn!(
            task_id,
            file = label,
            ticks = tick,
            last_status = last_status.as_deref().unwrap_or("none"),
            "Timed out waiting for task"
        );
        TaskOutcome::TimedOut { last_status }
    }

    /// Perform one status request and classify the result.
    async fn tick(
        &self,
        token: &str,
        task_id: u64,
        tick: u32,
        last_status: &mut Option<String>,
    ) -> TaskState {
        if self.verbose {
            tracing::info!(
                tick,
                task_id,
                base_url = %self.client.base_url(),
                auth_token = %mask_token(token),
                "Polling task status"
            );
        }

        let response = match self.client.task_status(token, task_id).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(task_id, tick, error = %e, "Task status check failed");
                return TaskState::Processing;
            }
        };

        if self.verbose {
            tracing::info!(tick, task_id, body = %response.body_snippet, "Task status body");
        }

        let Some(task) = response.first_task() else {
            if self.verbose {
                tracing::info!(tick, task_id, "No queued task entry yet");
            }
            return TaskState::Processing;
        };

        *last_status = Some(task.status_label());
        if self.verbose {
            tracing::info!(
                tick,
                task_id,
                status = %task.status_label(),
                response_code = task.response_code().unwrap_or("none"),
                task_message = %task.message_text().unwrap_or_default(),
                progress = ?task.progress,
                "Task status"
            );
        }

        let state = TaskState::from_task(Some(task));
        if state == TaskState::Processing && task.response_code() == Some("success") {
            tracing::info!(task_id, "Task succeeded but trip not attached yet; continuing");
        }
        state
    }
}
