//! Fake of the remote entity API
//!
//! Serves the token endpoint and the company/employee collections from an
//! in-memory store. The client under test is blocking, so the server runs on
//! its own tokio runtime in a background thread; tests stay plain `#[test]`.

use super::constants::*;
use axum::extract::{Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use chrono::{SubsecRound, TimeDelta, Utc};
use entity_api_client::auth::http_date;
use entity_api_client::{EntityKind, EntityRecord};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Default)]
struct ApiState {
    tokens: HashSet<String>,
    collections: HashMap<EntityKind, Vec<EntityRecord>>,
    next_id: i64,
}

type SharedState = Arc<Mutex<ApiState>>;

impl ApiState {
    fn is_authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|token| self.tokens.contains(token))
    }

    fn insert(&mut self, kind: EntityKind, name: &str) -> Option<EntityRecord> {
        let entities = self.collections.entry(kind).or_default();
        if entities.iter().any(|e| e.name == name) {
            return None;
        }
        self.next_id += 1;
        let record = EntityRecord {
            id: self.next_id,
            name: name.to_string(),
        };
        entities.push(record.clone());
        Some(record)
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "Message": "Authorization has been denied for this request." })),
    )
        .into_response()
}

fn parse_kind(collection: &str) -> Result<EntityKind, Response> {
    EntityKind::from_collection_name(collection).ok_or_else(|| StatusCode::NOT_FOUND.into_response())
}

async fn issue_token(
    State(state): State<SharedState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if form.get("grant_type").map(String::as_str) != Some(PASSWORD_GRANT) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unsupported_grant_type" })),
        )
            .into_response();
    }

    let username = form.get("username").cloned().unwrap_or_default();
    let access_token = uuid::Uuid::new_v4().simple().to_string();
    let issued = Utc::now().trunc_subsecs(0);
    let expires = issued + TimeDelta::seconds(TOKEN_LIFETIME_SECS);
    state.lock().unwrap().tokens.insert(access_token.clone());

    Json(json!({
        "access_token": access_token,
        "token_type": TOKEN_TYPE,
        "expires_in": TOKEN_LIFETIME_SECS,
        "displayName": username,
        ".issued": http_date::format(&issued),
        ".expires": http_date::format(&expires),
    }))
    .into_response()
}

async fn list_entities(
    State(state): State<SharedState>,
    Path(collection): Path<String>,
    headers: HeaderMap,
) -> Response {
    let kind = match parse_kind(&collection) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    let state = state.lock().unwrap();
    if !state.is_authorized(&headers) {
        return unauthorized();
    }
    let entities = state.collections.get(&kind).cloned().unwrap_or_default();
    Json(entities).into_response()
}

async fn create_entity(
    State(state): State<SharedState>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let kind = match parse_kind(&collection) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    let mut state = state.lock().unwrap();
    if !state.is_authorized(&headers) {
        return unauthorized();
    }

    let name = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| {
            value
                .get("Name")
                .or_else(|| value.get("name"))
                .and_then(|name| name.as_str())
                .map(str::to_string)
        });
    let Some(name) = name else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "Message": "Name is required" })))
            .into_response();
    };

    match state.insert(kind, &name) {
        Some(record) => Json(record).into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "Message": format!("{} already exists", name) })),
        )
            .into_response(),
    }
}

async fn get_entity(
    State(state): State<SharedState>,
    Path((collection, id)): Path<(String, i64)>,
    headers: HeaderMap,
) -> Response {
    let kind = match parse_kind(&collection) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    let state = state.lock().unwrap();
    if !state.is_authorized(&headers) {
        return unauthorized();
    }
    state
        .collections
        .get(&kind)
        .and_then(|entities| entities.iter().find(|e| e.id == id))
        .map(|record| Json(record.clone()).into_response())
        .unwrap_or_else(|| StatusCode::NOT_FOUND.into_response())
}

async fn delete_entity(
    State(state): State<SharedState>,
    Path((collection, id)): Path<(String, i64)>,
    headers: HeaderMap,
) -> Response {
    let kind = match parse_kind(&collection) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    let mut state = state.lock().unwrap();
    if !state.is_authorized(&headers) {
        return unauthorized();
    }
    let entities = state.collections.entry(kind).or_default();
    match entities.iter().position(|e| e.id == id) {
        Some(index) => {
            entities.remove(index);
            StatusCode::OK.into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn make_app(state: SharedState) -> Router {
    Router::new()
        .route("/token", post(issue_token))
        .route(
            &format!("{}/{{collection}}", COLLECTIONS_PATH),
            get(list_entities).post(create_entity),
        )
        .route(
            &format!("{}/{{collection}}/id/{{id}}", COLLECTIONS_PATH),
            get(get_entity).delete(delete_entity),
        )
        .with_state(state)
}

/// Fake API server with an isolated in-memory store
///
/// When dropped, the server shuts down and its thread is joined.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    state: SharedState,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Spawns a new fake server on a random port
    ///
    /// The listener is bound before this returns, so the server accepts
    /// connections right away.
    ///
    /// # Panics
    ///
    /// Panics if the runtime can't be built or the port can't be bound.
    pub fn spawn() -> Self {
        entity_api_client::logging::init_for_tests();

        let state = SharedState::default();
        let app = make_app(state.clone());
        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<u16>();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let thread = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .expect("Failed to build tokio runtime");

            runtime.block_on(async move {
                let listener = TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("Failed to bind to random port");
                let port = listener
                    .local_addr()
                    .expect("Failed to get local address")
                    .port();
                ready_tx.send(port).expect("Test thread went away");

                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        shutdown_rx.await.ok();
                    })
                    .await
                    .expect("Server failed");
            });
        });

        let port = ready_rx
            .recv_timeout(Duration::from_millis(SERVER_READY_TIMEOUT_MS))
            .unwrap_or_else(|_| {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                )
            });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            port,
            state,
            shutdown_tx: Some(shutdown_tx),
            thread: Some(thread),
        }
    }

    /// Number of live entities, read directly from the store
    pub fn entity_count(&self, kind: EntityKind) -> usize {
        self.state
            .lock()
            .unwrap()
            .collections
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Inserts entities bypassing the API, e.g. leftovers from a previous run
    pub fn seed(&self, kind: EntityKind, names: &[&str]) -> Vec<EntityRecord> {
        let mut state = self.state.lock().unwrap();
        names
            .iter()
            .filter_map(|name| state.insert(kind, name))
            .collect()
    }

    /// Invalidates every token issued so far
    pub fn revoke_all_tokens(&self) {
        self.state.lock().unwrap().tokens.clear();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
