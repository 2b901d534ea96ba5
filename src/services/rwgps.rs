// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! RideWithGPS API client.
//!
//! Handles:
//! - Email/password authentication for an auth token
//! - Trip creation from an activity file (queued asynchronously)
//! - Queued task status lookups
//! - Photo uploads attached to a trip

use crate::config::Config;
use crate::error::{truncate_body, AppError};
use crate::models::task::id_from_value;
use crate::models::TaskStatusResponse;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

const AUTH_TIMEOUT: Duration = Duration::from_secs(60);
const TRIP_UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);
const TASK_STATUS_TIMEOUT: Duration = Duration::from_secs(30);
const PHOTO_UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

const AUTH_BODY_LIMIT: usize = 500;
const UPLOAD_BODY_LIMIT: usize = 300;
const PHOTO_BODY_LIMIT: usize = 200;
const POLL_BODY_LIMIT: usize = 180;
const POLL_SNIPPET_LIMIT: usize = 250;

/// RideWithGPS API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct RwgpsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    version: String,
    photo_version: String,
}

impl RwgpsClient {
    pub fn new(base_url: &str, api_key: String, version: String, photo_version: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            version,
            photo_version,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.base_url,
            config.api_key.clone(),
            config.api_version.clone(),
            config.photo_api_version.clone(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange email and password for an auth token.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<String, AppError> {
        let url = format!("{}/users/current.json", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("email", email),
                ("password", password),
                ("apikey", self.api_key.as_str()),
                ("version", self.version.as_str()),
            ])
            .timeout(AUTH_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Authentication request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status != reqwest::StatusCode::OK {
            return Err(AppError::Auth(format!(
                "HTTP {}: {}",
                status,
                truncate_body(&body, AUTH_BODY_LIMIT)
            )));
        }

        let parsed: AuthResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::Auth(format!("JSON parse error: {}", e)))?;

        parsed
            .user
            .and_then(|u| u.auth_token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Auth("Auth token not found in response".to_string()))
    }

    /// Submit an activity file as a new trip. Returns the queued task id.
    pub async fn create_trip(
        &self,
        auth_token: &str,
        upload: TripUpload,
    ) -> Result<u64, AppError> {
        let url = format!("{}/trips.json", self.base_url);
        let file_name = upload.file_name.clone();

        let form = Form::new()
            .text("trip[name]", upload.name)
            .text("trip[description]", upload.description)
            .part("file", Part::bytes(upload.payload).file_name(upload.file_name));

        let response = self
            .http
            .post(&url)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("auth_token", auth_token),
                ("version", self.version.as_str()),
            ])
            .multipart(form)
            .timeout(TRIP_UPLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::Upload(format!("Request failed for {}: {}", file_name, e)))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(AppError::Upload(format!(
                "HTTP {} for {}: {}",
                status,
                file_name,
                truncate_body(&body, UPLOAD_BODY_LIMIT)
            )));
        }

        let value: serde_json::Value = serde_json::from_str(&body).map_err(|_| {
            AppError::Upload(format!(
                "Unexpected non-JSON response for {}: {}",
                file_name,
                truncate_body(&body, UPLOAD_BODY_LIMIT)
            ))
        })?;

        parse_task_id(&value).ok_or_else(|| {
            let keys: Vec<&str> = value
                .as_object()
                .map(|o| o.keys().map(String::as_str).collect())
                .unwrap_or_default();
            AppError::Upload(format!(
                "No task id returned for {} (response keys: {:?})",
                file_name, keys
            ))
        })
    }

    /// Fetch the status of one queued task, including associated objects.
    pub async fn task_status(
        &self,
        auth_token: &str,
        task_id: u64,
    ) -> Result<TaskStatusResponse, AppError> {
        let url = format!("{}/queued_tasks/status.json", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("ids", task_id.to_string().as_str()),
                ("include_objects", "true"),
                ("apikey", self.api_key.as_str()),
                ("auth_token", auth_token),
                ("version", self.version.as_str()),
            ])
            .timeout(TASK_STATUS_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::Poll(format!("Polling error for task {}: {}", task_id, e)))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status != reqwest::StatusCode::OK {
            return Err(AppError::Poll(format!(
                "HTTP {} for task {}: {}",
                status,
                task_id,
                truncate_body(&body, POLL_BODY_LIMIT)
            )));
        }

        let mut parsed: TaskStatusResponse = serde_json::from_str(&body).map_err(|_| {
            AppError::Poll(format!(
                "JSON parse error for task {}: {}",
                task_id,
                truncate_body(&body, POLL_BODY_LIMIT)
            ))
        })?;
        parsed.body_snippet = truncate_body(&body, POLL_SNIPPET_LIMIT);
        Ok(parsed)
    }

    /// Upload a photo and attach it to an existing trip.
    pub async fn upload_photo(
        &self,
        auth_token: &str,
        trip_id: u64,
        photo: PhotoUpload,
    ) -> Result<(), AppError> {
        let url = format!("{}/photos.json", self.base_url);
        let file_name = photo.file_name.clone();

        let part = Part::bytes(photo.payload)
            .file_name(photo.file_name)
            .mime_str(photo.mime)
            .map_err(|e| AppError::Media(format!("Invalid MIME type: {}", e)))?;
        let form = Form::new()
            .part("file", part)
            .text("parent_type", "trip")
            .text("parent_id", trip_id.to_string());

        let response = self
            .http
            .post(&url)
            .header("x-rwgps-api-key", &self.api_key)
            .header("x-rwgps-api-version", &self.photo_version)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("apikey", self.api_key.as_str()), ("auth_token", auth_token)])
            .multipart(form)
            .timeout(PHOTO_UPLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::Media(format!("Request failed for {}: {}", file_name, e)))?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Media(format!(
            "HTTP {} for {}: {}",
            status,
            file_name,
            truncate_body(&body, PHOTO_BODY_LIMIT).replace('\n', " ")
        )))
    }
}

/// Trip submission payload.
#[derive(Debug, Clone)]
pub struct TripUpload {
    pub file_name: String,
    pub payload: Vec<u8>,
    pub name: String,
    pub description: String,
}

/// Photo submission payload.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub payload: Vec<u8>,
    pub mime: &'static str,
}

/// Authentication response from `users/current.json`.
#[derive(Debug, Clone, Deserialize)]
struct AuthResponse {
    #[serde(default)]
    user: Option<AuthUser>,
}

#[derive(Debug, Clone, Deserialize)]
struct AuthUser {
    #[serde(default)]
    auth_token: Option<String>,
}

/// Extract `task_id` from a trip submission response.
fn parse_task_id(value: &serde_json::Value) -> Option<u64> {
    value.get("task_id").and_then(id_from_value)
}

/// Mask a token for log output, keeping only its ends.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 10 {
        return "***".to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
