//! In-process stand-in for the RAG backend, served with axum on an
//! ephemeral port.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ReceivedFile {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Answer,
    ServerError,
    Malformed,
}

pub struct StubState {
    pub uploads: Mutex<Vec<ReceivedFile>>,
    pub queries: Mutex<Vec<Value>>,
    pub sessions: Mutex<HashSet<String>>,
    pub query_mode: Mutex<QueryMode>,
}

pub struct StubBackend {
    pub addr: SocketAddr,
    pub state: Arc<StubState>,
}

impl StubBackend {
    pub async fn start() -> Self {
        let state = Arc::new(StubState {
            uploads: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            sessions: Mutex::new(HashSet::new()),
            query_mode: Mutex::new(QueryMode::Answer),
        });

        let app = Router::new()
            .route("/upload", post(upload))
            .route("/query", post(query))
            .route("/health", get(health))
            .route("/session/:session_id", delete(cleanup_session))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_query_mode(&self, mode: QueryMode) {
        *self.state.query_mode.lock().unwrap() = mode;
    }

    pub fn uploads(&self) -> Vec<ReceivedFile> {
        self.state.uploads.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<Value> {
        self.state.queries.lock().unwrap().clone()
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

async fn upload(State(state): State<Arc<StubState>>, mut multipart: Multipart) -> Response {
    let mut saw_file = false;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return detail(StatusCode::BAD_REQUEST, &e.to_string()),
        };
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => return detail(StatusCode::BAD_REQUEST, &e.to_string()),
        };

        saw_file |= name == "file";
        state.uploads.lock().unwrap().push(ReceivedFile {
            field: name,
            file_name,
            content_type,
            bytes,
        });
    }

    if !saw_file {
        return detail(StatusCode::UNPROCESSABLE_ENTITY, "field required: file");
    }

    let session_id = Uuid::new_v4().to_string();
    state.sessions.lock().unwrap().insert(session_id.clone());
    Json(json!({ "session_id": session_id, "message": "File processed successfully" }))
        .into_response()
}

async fn query(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
    state.queries.lock().unwrap().push(body.clone());

    let mode = *state.query_mode.lock().unwrap();
    match mode {
        QueryMode::ServerError => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
        QueryMode::Malformed => return (StatusCode::OK, "<html>not json</html>").into_response(),
        QueryMode::Answer => {}
    }

    let session_id = body["session_id"].as_str().unwrap_or_default();
    if !state.sessions.lock().unwrap().contains(session_id) {
        return detail(StatusCode::NOT_FOUND, "Session not found");
    }

    Json(json!({ "answer": "42", "context": ["p1", "p2"] })).into_response()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn cleanup_session(
    State(state): State<Arc<StubState>>,
    Path(session_id): Path<String>,
) -> Response {
    if state.sessions.lock().unwrap().remove(&session_id) {
        Json(json!({ "message": "Session cleaned up successfully" })).into_response()
    } else {
        detail(StatusCode::NOT_FOUND, "Session not found")
    }
}
