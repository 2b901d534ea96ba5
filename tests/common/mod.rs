// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process fake RideWithGPS service and test workspace helpers.

use axum::{
    extract::{Multipart, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use rwgps_uploader::config::Config;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

pub const CSV_HEADER: &str =
    "Activity ID,Activity Date,Activity Name,Activity Type,Activity Description,Filename,Media\n";

/// One scripted response of the task status endpoint.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum StatusStep {
    Json(Value),
    Http(u16),
    Raw(String),
}

/// How the fake service answers.
#[derive(Debug, Clone)]
pub struct FakeBehavior {
    /// Token handed out on login; `None` rejects every login with 401
    pub auth_token: Option<String>,
    /// Raw body for a 200 login response, replacing the token body
    pub login_body: Option<String>,
    pub trip_status: u16,
    pub trip_body: String,
    /// Status responses in order; the last one repeats
    pub status_script: Vec<StatusStep>,
    pub photo_status: u16,
}

impl Default for FakeBehavior {
    fn default() -> Self {
        Self {
            auth_token: Some("fake-session-token-1234".to_string()),
            login_body: None,
            trip_status: 200,
            trip_body: json!({"success": 1, "task_id": 4242}).to_string(),
            status_script: vec![StatusStep::Json(trip_created(555))],
            photo_status: 201,
        }
    }
}

#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedTrip {
    pub query: HashMap<String, String>,
    pub name: String,
    pub description: String,
    pub file_name: String,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedPhoto {
    pub parent_type: String,
    pub parent_id: String,
    pub file_name: String,
    pub content_type: String,
    pub api_version: String,
}

/// Requests seen by the fake service.
#[derive(Debug, Default)]
pub struct Recorded {
    pub auth_calls: usize,
    pub trips: Vec<RecordedTrip>,
    pub status_calls: usize,
    pub status_ids: Vec<String>,
    pub photos: Vec<RecordedPhoto>,
}

#[allow(dead_code)]
impl Recorded {
    pub fn total_calls(&self) -> usize {
        self.auth_calls + self.trips.len() + self.status_calls + self.photos.len()
    }
}

struct FakeState {
    behavior: FakeBehavior,
    script: Mutex<VecDeque<StatusStep>>,
    recorded: Mutex<Recorded>,
}

pub struct FakeServer {
    pub base_url: String,
    state: Arc<FakeState>,
}

impl FakeServer {
    pub fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.state.recorded.lock().unwrap()
    }
}

/// Start the fake service on an ephemeral local port.
pub async fn spawn_fake(behavior: FakeBehavior) -> FakeServer {
    let state = Arc::new(FakeState {
        script: Mutex::new(behavior.status_script.iter().cloned().collect()),
        behavior,
        recorded: Mutex::new(Recorded::default()),
    });

    let app = Router::new()
        .route("/users/current.json", get(login))
        .route("/trips.json", post(create_trip))
        .route("/queued_tasks/status.json", get(task_status))
        .route("/photos.json", post(upload_photo))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake server");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeServer {
        base_url: format!("http://{}", addr),
        state,
    }
}

async fn login(
    State(state): State<Arc<FakeState>>,
    Query(_query): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    state.recorded.lock().unwrap().auth_calls += 1;
    if let Some(body) = &state.behavior.login_body {
        return (StatusCode::OK, body.clone());
    }
    match &state.behavior.auth_token {
        Some(token) => (
            StatusCode::OK,
            json!({"user": {"id": 1, "auth_token": token}}).to_string(),
        ),
        None => (StatusCode::UNAUTHORIZED, "Invalid email or password".to_string()),
    }
}

async fn create_trip(
    State(state): State<Arc<FakeState>>,
    Query(query): Query<HashMap<String, String>>,
    mut multipart: Multipart,
) -> (StatusCode, String) {
    let mut trip = RecordedTrip {
        query,
        name: String::new(),
        description: String::new(),
        file_name: String::new(),
        payload: Vec::new(),
    };

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "trip[name]" => trip.name = field.text().await.unwrap_or_default(),
            "trip[description]" => trip.description = field.text().await.unwrap_or_default(),
            "file" => {
                trip.file_name = field.file_name().unwrap_or_default().to_string();
                trip.payload = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
            }
            _ => {}
        }
    }

    state.recorded.lock().unwrap().trips.push(trip);
    (
        StatusCode::from_u16(state.behavior.trip_status).unwrap(),
        state.behavior.trip_body.clone(),
    )
}

async fn task_status(
    State(state): State<Arc<FakeState>>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.status_calls += 1;
        recorded
            .status_ids
            .push(query.get("ids").cloned().unwrap_or_default());
    }

    let step = {
        let mut script = state.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        }
    };

    match step {
        Some(StatusStep::Json(body)) => (StatusCode::OK, body.to_string()),
        Some(StatusStep::Http(code)) => (StatusCode::from_u16(code).unwrap(), "unavailable".to_string()),
        Some(StatusStep::Raw(body)) => (StatusCode::OK, body),
        None => (StatusCode::OK, json!({"queued_tasks": []}).to_string()),
    }
}

async fn upload_photo(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> StatusCode {
    let mut photo = RecordedPhoto {
        parent_type: String::new(),
        parent_id: String::new(),
        file_name: String::new(),
        content_type: String::new(),
        api_version: headers
            .get("x-rwgps-api-version")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string(),
    };

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "parent_type" => photo.parent_type = field.text().await.unwrap_or_default(),
            "parent_id" => photo.parent_id = field.text().await.unwrap_or_default(),
            "file" => {
                photo.file_name = field.file_name().unwrap_or_default().to_string();
                photo.content_type = field.content_type().unwrap_or_default().to_string();
                let _ = field.bytes().await;
            }
            _ => {}
        }
    }

    state.recorded.lock().unwrap().photos.push(photo);
    StatusCode::from_u16(state.behavior.photo_status).unwrap()
}

/// Task status body for a finished task with a trip attached.
pub fn trip_created(trip_id: u64) -> Value {
    json!({"queued_tasks": [{
        "status": "complete",
        "response_code": "success",
        "message": "Trip created",
        "associated_objects": [{"type": "trip", "trip": {"id": trip_id}}]
    }]})
}

/// Task status body for a task still being processed.
#[allow(dead_code)]
pub fn still_processing() -> Value {
    json!({"queued_tasks": [{"status": "processing", "response_code": "queued", "progress": 50}]})
}

/// Task status body with a bare response code.
#[allow(dead_code)]
pub fn response_code(code: &str, message: &str) -> Value {
    json!({"queued_tasks": [{"status": "complete", "response_code": code, "message": message}]})
}

/// Temporary project layout: metadata CSV, activity directory, media
/// directory and ledger path.
pub struct Workspace {
    pub dir: TempDir,
    pub config: Config,
}

#[allow(dead_code)]
impl Workspace {
    /// Lay out a workspace with the given CSV rows (header added) pointing at `base_url`.
    pub fn new(base_url: &str, csv_rows: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("activities/cycling")).unwrap();
        std::fs::create_dir_all(root.join("media")).unwrap();
        std::fs::write(root.join("activities.csv"), format!("{}{}", CSV_HEADER, csv_rows)).unwrap();

        let config = Config {
            base_url: base_url.to_string(),
            poll_interval: Duration::from_millis(10),
            poll_timeout: Duration::from_secs(5),
            metadata_csv: root.join("activities.csv"),
            activities_dir: root.join("activities/cycling"),
            uploaded_log: root.join(".uploaded_rwgps.log"),
            media_dir: root.to_path_buf(),
            ..Config::default()
        };

        Self { dir, config }
    }

    pub fn add_activity(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.config.activities_dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn add_media(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join("media").join(name);
        std::fs::write(&path, b"\xff\xd8\xff\xe0 fake jpeg").unwrap();
        path
    }

    pub fn ledger_contents(&self) -> Option<String> {
        std::fs::read_to_string(&self.config.uploaded_log).ok()
    }
}
