//! In-process stub cluster for integration tests.
//!
//! One axum server answers the master API (`/dir/*`, `/vol/*`, `/submit`),
//! the volume API (`/<fid>`) and a filer API (`/filer/<path>`), so a lookup
//! can point straight back at it.

#![allow(dead_code)]

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Canned response: status code and raw body
#[derive(Clone, Debug)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn json(value: Value) -> Self {
        Self {
            status: 200,
            body: value.to_string(),
        }
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status).unwrap();
        (status, self.body).into_response()
    }
}

/// Stored upload
#[derive(Clone, Debug)]
pub struct Blob {
    pub filename: String,
    pub mime: String,
    pub data: Vec<u8>,
}

#[derive(Clone)]
pub struct Stub {
    pub assign: Arc<Mutex<Reply>>,
    pub lookup: Arc<Mutex<Reply>>,
    pub status: Arc<Mutex<Reply>>,
    pub status_calls: Arc<AtomicUsize>,
    pub lookup_calls: Arc<AtomicUsize>,
    pub queries: Arc<Mutex<Vec<(String, HashMap<String, String>)>>>,
    pub blobs: Arc<Mutex<HashMap<String, Blob>>>,
    pub deletes: Arc<Mutex<Vec<String>>>,
}

impl Default for Stub {
    fn default() -> Self {
        Self {
            assign: Arc::new(Mutex::new(Reply::json(json!({})))),
            lookup: Arc::new(Mutex::new(Reply::json(json!({ "locations": [] })))),
            status: Arc::new(Mutex::new(Reply::json(json!({})))),
            status_calls: Arc::new(AtomicUsize::new(0)),
            lookup_calls: Arc::new(AtomicUsize::new(0)),
            queries: Arc::new(Mutex::new(Vec::new())),
            blobs: Arc::new(Mutex::new(HashMap::new())),
            deletes: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Stub {
    pub fn set_assign(&self, reply: Reply) {
        *self.assign.lock().unwrap() = reply;
    }

    pub fn set_lookup(&self, reply: Reply) {
        *self.lookup.lock().unwrap() = reply;
    }

    pub fn set_status(&self, reply: Reply) {
        *self.status.lock().unwrap() = reply;
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    /// Query strings recorded for `path`, oldest first
    pub fn queries_for(&self, path: &str) -> Vec<HashMap<String, String>> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, q)| q.clone())
            .collect()
    }

    pub fn put_blob(&self, key: &str, data: &[u8]) {
        self.blobs.lock().unwrap().insert(
            key.to_string(),
            Blob {
                filename: String::new(),
                mime: String::new(),
                data: data.to_vec(),
            },
        );
    }

    pub fn blob(&self, key: &str) -> Option<Blob> {
        self.blobs.lock().unwrap().get(key).cloned()
    }

    fn record(&self, path: &str, query: HashMap<String, String>) {
        self.queries.lock().unwrap().push((path.to_string(), query));
    }

    /// Bind to an ephemeral port and serve in the background.
    /// Returns `host:port`.
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(self.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr.to_string()
    }
}

fn router(stub: Stub) -> Router {
    Router::new()
        .route("/dir/assign", get(assign))
        .route("/dir/lookup", get(lookup))
        .route("/dir/status", get(status))
        .route("/vol/grow", get(grow))
        .route("/vol/vacuum", get(vacuum))
        .route("/submit", post(submit))
        .route("/filer/*path", post(filer_put).get(filer_get).delete(filer_delete))
        .route("/:fid", post(blob_put).get(blob_get).delete(blob_delete))
        .with_state(stub)
}

async fn assign(State(stub): State<Stub>, Query(q): Query<HashMap<String, String>>) -> impl IntoResponse {
    stub.record("/dir/assign", q);
    let reply = stub.assign.lock().unwrap().clone();
    reply.into_response()
}

async fn lookup(State(stub): State<Stub>, Query(q): Query<HashMap<String, String>>) -> impl IntoResponse {
    stub.lookup_calls.fetch_add(1, Ordering::SeqCst);
    stub.record("/dir/lookup", q);
    let reply = stub.lookup.lock().unwrap().clone();
    reply.into_response()
}

async fn status(State(stub): State<Stub>) -> impl IntoResponse {
    stub.status_calls.fetch_add(1, Ordering::SeqCst);
    let reply = stub.status.lock().unwrap().clone();
    reply.into_response()
}

async fn grow(State(stub): State<Stub>, Query(q): Query<HashMap<String, String>>) -> impl IntoResponse {
    stub.record("/vol/grow", q);
    Json(json!({ "count": 2 }))
}

async fn vacuum(State(stub): State<Stub>, Query(q): Query<HashMap<String, String>>) -> impl IntoResponse {
    stub.record("/vol/vacuum", q);
    // Body deliberately not JSON: the client must not care.
    (StatusCode::OK, "vacuumed")
}

async fn read_file(mut multipart: Multipart) -> Option<Blob> {
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let mime = field.content_type().unwrap_or_default().to_string();
            let data = field.bytes().await.unwrap().to_vec();
            return Some(Blob {
                filename,
                mime,
                data,
            });
        }
    }
    None
}

async fn store(stub: &Stub, key: String, multipart: Multipart) -> axum::response::Response {
    match read_file(multipart).await {
        Some(blob) => {
            let body = json!({ "name": blob.filename, "size": blob.data.len() });
            stub.blobs.lock().unwrap().insert(key, blob);
            Json(body).into_response()
        }
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing file field" })),
        )
            .into_response(),
    }
}

async fn submit(
    State(stub): State<Stub>,
    Query(q): Query<HashMap<String, String>>,
    multipart: Multipart,
) -> impl IntoResponse {
    stub.record("/submit", q);
    match read_file(multipart).await {
        Some(blob) => {
            let fid = "5,0abc12345678";
            let body = json!({ "fid": fid, "url": "127.0.0.1:1", "name": blob.filename, "size": blob.data.len() });
            stub.blobs.lock().unwrap().insert(fid.to_string(), blob);
            Json(body).into_response()
        }
        None => (StatusCode::BAD_REQUEST, Json(json!({ "error": "missing file field" })))
            .into_response(),
    }
}

async fn blob_put(State(stub): State<Stub>, Path(fid): Path<String>, multipart: Multipart) -> impl IntoResponse {
    store(&stub, fid, multipart).await
}

async fn blob_get(State(stub): State<Stub>, Path(fid): Path<String>) -> impl IntoResponse {
    match stub.blob(&fid) {
        Some(blob) => (StatusCode::OK, blob.data).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn blob_delete(State(stub): State<Stub>, Path(fid): Path<String>) -> impl IntoResponse {
    stub.deletes.lock().unwrap().push(fid.clone());
    match stub.blobs.lock().unwrap().remove(&fid) {
        Some(_) => (StatusCode::ACCEPTED, Json(json!({ "size": 0 }))).into_response(),
        None => (StatusCode::NOT_FOUND, "no such file").into_response(),
    }
}

async fn filer_put(State(stub): State<Stub>, Path(path): Path<String>, multipart: Multipart) -> impl IntoResponse {
    store(&stub, format!("filer/{}", path), multipart).await
}

async fn filer_get(State(stub): State<Stub>, Path(path): Path<String>) -> impl IntoResponse {
    match stub.blob(&format!("filer/{}", path)) {
        Some(blob) => (StatusCode::OK, blob.data).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn filer_delete(State(stub): State<Stub>, Path(path): Path<String>) -> impl IntoResponse {
    match stub.blobs.lock().unwrap().remove(&format!("filer/{}", path)) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// `/dir/status` body with one datacenter per `(id, node urls)` pair
pub fn status_body(dcs: &[(&str, &[&str])]) -> Value {
    let data_centers: Vec<Value> = dcs
        .iter()
        .map(|(id, urls)| {
            let nodes: Vec<Value> = urls
                .iter()
                .map(|u| json!({ "Url": u, "PublicUrl": u, "Free": 1, "Max": 8, "Volumes": 7 }))
                .collect();
            json!({
                "Id": id, "Free": 1, "Max": 8,
                "Racks": [{ "Id": "rack1", "Free": 1, "Max": 8, "DataNodes": nodes }]
            })
        })
        .collect();
    json!({
        "Topology": { "DataCenters": data_centers, "Free": 1, "Max": 8, "layouts": [] },
        "Version": "stub 0.1"
    })
}

/// `/dir/lookup` body listing `urls` in order
pub fn lookup_body(volume_id: u32, urls: &[&str]) -> Value {
    let locations: Vec<Value> = urls
        .iter()
        .map(|u| json!({ "url": u, "publicUrl": u }))
        .collect();
    json!({ "volumeId": volume_id.to_string(), "locations": locations })
}

/// Poll `cond` every 10ms until it holds or `timeout` passes
pub async fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}
