//! Shared test helpers for integration tests.
//!
//! [`FakeDevice`] serves the device HTTP API from an in-memory SD card on an
//! ephemeral local port, so the real HTTP client and services can be driven
//! end to end.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use bytes::Bytes;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use sdbridge_client::HttpDeviceClient;
use sdbridge_core::config::AppConfig;
use sdbridge_service::{DebugLog, DeviceContext};

/// One multipart part received by `/upload` or `/edit`
#[derive(Debug, Clone)]
pub struct ReceivedPart {
    pub endpoint: &'static str,
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
}

/// Mutable state of the fake device
pub struct DeviceState {
    /// `/wifistatus` body
    pub wifi: Mutex<String>,
    /// `/btstatus` body
    pub bluetooth: Mutex<String>,
    /// Status code forced on both status endpoints
    pub status_failure: Mutex<Option<u16>>,
    /// Delay before answering status endpoints
    pub status_delay: Mutex<Option<Duration>>,
    /// Status code forced on `/upload`
    pub upload_failure: Mutex<Option<u16>>,
    /// Every SD-card endpoint answers `<TAG>:SDBUSY`
    pub sd_busy: AtomicBool,
    /// File contents by path
    pub files: Mutex<BTreeMap<String, Vec<u8>>>,
    /// Directory paths, root excluded
    pub dirs: Mutex<BTreeSet<String>>,
    /// `METHOD /path?query` of every request, in arrival order
    pub requests: Mutex<Vec<String>>,
    /// Multipart parts received
    pub parts: Mutex<Vec<ReceivedPart>>,
    /// Number of `/relinquish` calls
    pub relinquished: AtomicUsize,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            wifi: Mutex::new("WIFI:Connected:192.168.1.50".to_string()),
            bluetooth: Mutex::new("BT:Ready".to_string()),
            status_failure: Mutex::new(None),
            status_delay: Mutex::new(None),
            upload_failure: Mutex::new(None),
            sd_busy: AtomicBool::new(false),
            files: Mutex::new(BTreeMap::new()),
            dirs: Mutex::new(BTreeSet::new()),
            requests: Mutex::new(Vec::new()),
            parts: Mutex::new(Vec::new()),
            relinquished: AtomicUsize::new(0),
        }
    }
}

impl DeviceState {
    fn record(&self, line: String) {
        self.requests.lock().unwrap().push(line);
    }

    fn busy(&self) -> bool {
        self.sd_busy.load(Ordering::SeqCst)
    }

    /// Add a file with `contents`
    pub fn add_file(&self, path: &str, contents: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), contents.to_vec());
    }

    /// Add a directory
    pub fn add_dir(&self, path: &str) {
        self.dirs.lock().unwrap().insert(path.to_string());
    }

    /// Remove a file or directory, as another client would
    pub fn remove(&self, path: &str) {
        self.files.lock().unwrap().remove(path);
        self.dirs.lock().unwrap().remove(path);
    }

    /// Requests whose line starts with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }

    fn listing(&self, dir: &str) -> Vec<Value> {
        let prefix = if dir == "/" {
            "/".to_string()
        } else {
            format!("{}/", dir)
        };
        let direct = |path: &str| {
            path.strip_prefix(prefix.as_str())
                .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
        };
        let name = |path: &str| path.rsplit('/').next().unwrap_or_default().to_string();

        let mut entries = Vec::new();
        for path in self.dirs.lock().unwrap().iter().filter(|p| direct(p)) {
            entries.push(json!({ "name": name(path), "path": path, "type": "dir" }));
        }
        for (path, data) in self.files.lock().unwrap().iter().filter(|(p, _)| direct(p)) {
            entries.push(json!({
                "name": name(path),
                "path": path,
                "type": "file",
                "size": data.len()
            }));
        }
        entries
    }
}

/// A running fake device
pub struct FakeDevice {
    /// `http://127.0.0.1:<port>`
    pub base_url: String,
    /// Device state, shared with the handlers
    pub state: Arc<DeviceState>,
    server: JoinHandle<()>,
}

impl FakeDevice {
    /// Start a device with an empty card
    pub async fn start() -> Self {
        let state = Arc::new(DeviceState::default());
        let app = router(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake device");
        let addr = listener.local_addr().expect("Fake device address");
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake device crashed");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            server,
        }
    }

    /// Configuration pointing at this device
    pub fn config(&self) -> AppConfig {
        AppConfig::default()
            .with_base_url(&self.base_url)
            .expect("Valid fake device URL")
    }

    /// Services wired to this device over real HTTP
    pub fn context(&self) -> DeviceContext {
        context_for(self.config())
    }
}

impl Drop for FakeDevice {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Services for an arbitrary configuration
pub fn context_for(config: AppConfig) -> DeviceContext {
    let client = HttpDeviceClient::new(&config.device).expect("Failed to build client");
    DeviceContext::new(config, Arc::new(client), DebugLog::default())
}

/// A base URL nothing listens on
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Address");
    drop(listener);
    format!("http://{}", addr)
}

type Shared = State<Arc<DeviceState>>;
type Params = Query<HashMap<String, String>>;

fn router(state: Arc<DeviceState>) -> Router {
    Router::new()
        .route("/wifistatus", get(wifi_status))
        .route("/btstatus", get(bt_status))
        .route("/list", get(list))
        .route("/download", get(download))
        .route("/delete", get(delete))
        .route("/relinquish", get(relinquish))
        .route("/upload", post(upload))
        .route("/edit", post(edit))
        .with_state(state)
}

async fn status_reply(state: &DeviceState, body: String) -> Response {
    let delay = *state.status_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    let failure = *state.status_failure.lock().unwrap();
    match failure {
        Some(code) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            "error",
        )
            .into_response(),
        None => body.into_response(),
    }
}

async fn wifi_status(State(state): Shared) -> Response {
    state.record("GET /wifistatus".to_string());
    let body = state.wifi.lock().unwrap().clone();
    status_reply(&state, body).await
}

async fn bt_status(State(state): Shared) -> Response {
    state.record("GET /btstatus".to_string());
    let body = state.bluetooth.lock().unwrap().clone();
    status_reply(&state, body).await
}

async fn list(State(state): Shared, Query(params): Params) -> Response {
    let dir = params.get("dir").cloned();
    state.record(format!("GET /list?dir={}", dir.clone().unwrap_or_default()));

    let Some(dir) = dir else {
        return "LIST:BADARGS".into_response();
    };
    if state.busy() {
        return "LIST:SDBUSY".into_response();
    }
    if state.files.lock().unwrap().contains_key(&dir) {
        return "LIST:NOTDIR".into_response();
    }
    if dir != "/" && !state.dirs.lock().unwrap().contains(&dir) {
        return "LIST:BADPATH".into_response();
    }
    axum::Json(Value::Array(state.listing(&dir))).into_response()
}

async fn download(State(state): Shared, Query(params): Params) -> Response {
    let path = params.get("path").cloned().unwrap_or_default();
    state.record(format!("GET /download?path={}", path));

    if state.busy() {
        return "DOWNLOAD:SDBUSY".into_response();
    }
    let data = state.files.lock().unwrap().get(&path).cloned();
    match data {
        Some(data) => Bytes::from(data).into_response(),
        None => (StatusCode::NOT_FOUND, "File not found").into_response(),
    }
}

async fn delete(State(state): Shared, Query(params): Params) -> Response {
    let path = params.get("path").cloned();
    state.record(format!("GET /delete?path={}", path.clone().unwrap_or_default()));

    let Some(path) = path else {
        return "DELETE:BADARGS".into_response();
    };
    if state.busy() {
        return "DELETE:SDBUSY".into_response();
    }
    if state.files.lock().unwrap().remove(&path).is_none() {
        return "DELETE:BADPATH".into_response();
    }
    "DELETE:OK".into_response()
}

async fn relinquish(State(state): Shared) -> Response {
    state.record("GET /relinquish".to_string());
    state.relinquished.fetch_add(1, Ordering::SeqCst);
    "OK".into_response()
}

async fn receive(state: &DeviceState, endpoint: &'static str, mut multipart: Multipart) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let Ok(data) = field.bytes().await else {
            return (StatusCode::BAD_REQUEST, "broken part").into_response();
        };

        state.parts.lock().unwrap().push(ReceivedPart {
            endpoint,
            field: name,
            file_name: file_name.clone(),
            content_type,
            size: data.len(),
        });
        if let Some(path) = file_name {
            state.add_file(&path, &data);
        }
    }
    "OK".into_response()
}

async fn upload(State(state): Shared, mut multipart: Multipart) -> Response {
    state.record("POST /upload".to_string());
    let failure = *state.upload_failure.lock().unwrap();
    if let Some(code) = failure {
        while let Ok(Some(field)) = multipart.next_field().await {
            let _ = field.bytes().await;
        }
        return (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            "upload rejected",
        )
            .into_response();
    }
    receive(&state, "/upload", multipart).await
}

async fn edit(State(state): Shared, multipart: Multipart) -> Response {
    state.record("POST /edit".to_string());
    receive(&state, "/edit", multipart).await
}
