#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use clubs_portal::{
    ClientConfig, ClientState, MemoryCredentialStore,
    storage::{CredentialKey, CredentialState},
};
use serde_json::{Value, json};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use tokio::net::TcpListener;

pub const ACCESS_TOKEN: &str = "tok1";
pub const REFRESH_TOKEN: &str = "ref1";

/// One request as seen by the fake backend.
#[derive(Debug, Clone)]
pub struct Hit {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
    pub content_type: Option<String>,
}

/// Shared control panel of the fake backend. Flags flip behaviour per test.
#[derive(Clone, Default)]
pub struct Backend {
    pub hits: Arc<Mutex<Vec<Hit>>>,
    pub is_admin: Arc<AtomicBool>,
    pub fail_me: Arc<AtomicBool>,
    pub omit_refresh: Arc<AtomicBool>,
    pub fail_logout: Arc<AtomicBool>,
    pub fail_create_club: Arc<AtomicBool>,
}

impl Backend {
    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }

    pub fn hits_to(&self, path: &str) -> Vec<Hit> {
        self.hits().into_iter().filter(|h| h.path == path).collect()
    }

    pub fn enable(flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }
}

pub struct TestApp {
    pub address: String,
    pub backend: Backend,
}

impl TestApp {
    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            api_url: format!("{}/api", self.address),
            media_base: self.address.clone(),
            ..ClientConfig::default()
        }
    }

    /// Client over an in-memory store, session already loaded (anonymous when empty).
    pub async fn client(&self, store: Arc<MemoryCredentialStore>) -> ClientState {
        let state = ClientState::new(self.config(), store as CredentialState)
            .expect("client construction failed");
        state.session.load().await;
        state
    }

    /// Client whose store holds a session persisted by an earlier run.
    pub async fn logged_in_client(&self, token: &str, role: &str) -> (ClientState, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::with_entries(&[
            (CredentialKey::AccessToken, token),
            (CredentialKey::RefreshToken, REFRESH_TOKEN),
            (CredentialKey::Role, role),
        ]));
        let state = self.client(store.clone()).await;
        (state, store)
    }
}

pub async fn spawn_backend() -> TestApp {
    let backend = Backend::default();

    let api = Router::new()
        .route("/login/", post(login))
        .route("/register/", post(register))
        .route("/logout/", post(logout))
        .route("/me/", get(me))
        .route("/clubs/", get(list_clubs))
        .route("/clubs/admin/clubs/", get(admin_list_clubs).post(admin_create_club))
        .route("/clubs/admin/clubs/{id}/", delete(admin_delete_club))
        .route("/events/", get(list_events))
        .route("/events/me/followed-events/", get(followed_events_malformed));

    let router = Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(backend.clone(), record))
        .with_state(backend.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address, backend }
}

async fn record(State(backend): State<Backend>, request: Request, next: Next) -> Response {
    // The closure borrows `request`; it must be gone before the request moves on.
    let hit = {
        let header_value = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Hit {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            authorization: header_value("authorization"),
            request_id: header_value("x-request-id"),
            content_type: header_value("content-type"),
        }
    };
    backend.hits.lock().unwrap().push(hit);
    next.run(request).await
}

fn authorized(headers: &HeaderMap) -> Result<(), StatusCode> {
    let expected = format!("Bearer {ACCESS_TOKEN}");
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn login(
    State(backend): State<Backend>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    if body["username"] == "alice" && body["password"] == "secret" {
        if backend.omit_refresh.load(Ordering::SeqCst) {
            return Ok(Json(json!({ "access": ACCESS_TOKEN })));
        }
        Ok(Json(json!({ "access": ACCESS_TOKEN, "refresh": REFRESH_TOKEN })))
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

async fn register(Json(body): Json<Value>) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(json!({
            "id": 2,
            "username": body["username"],
            "email": body["email"],
            "is_admin": false,
        })),
    )
}

async fn logout(State(backend): State<Backend>) -> StatusCode {
    if backend.fail_logout.load(Ordering::SeqCst) {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::RESET_CONTENT
    }
}

async fn me(State(backend): State<Backend>, headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    authorized(&headers)?;
    if backend.fail_me.load(Ordering::SeqCst) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(json!({
        "id": 1,
        "username": "alice",
        "email": "alice@example.com",
        "is_admin": backend.is_admin.load(Ordering::SeqCst),
        "profile_image": null,
    })))
}

async fn list_clubs(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    authorized(&headers)?;
    Ok(Json(json!([
        { "id": 1, "name": "Chess", "description": "Weekly games", "image": null, "followers_count": 4, "is_followed": true },
        { "id": 2, "name": "Hiking", "description": "Trails", "image": "/media/clubs/hiking.jpg", "followers_count": 0, "is_followed": false },
    ])))
}

fn admin_club(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "Managed club",
        "image": null,
        "created_by": 1,
        "created_by_username": "alice",
        "created_at": "2025-01-10T09:00:00Z",
        "updated_at": "2025-01-10T09:00:00Z",
    })
}

async fn admin_list_clubs(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    authorized(&headers)?;
    Ok(Json(json!([admin_club(1, "Chess"), admin_club(2, "Hiking")])))
}

async fn admin_create_club(
    State(backend): State<Backend>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, StatusCode> {
    authorized(&headers)?;
    let is_multipart = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));
    if !is_multipart || backend.fail_create_club.load(Ordering::SeqCst) {
        return Err(StatusCode::BAD_REQUEST);
    }
    let body = String::from_utf8_lossy(&body);
    if !body.contains("name=\"name\"") {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok((StatusCode::CREATED, Json(admin_club(3, "Robotics"))))
}

async fn admin_delete_club(headers: HeaderMap, Path(_id): Path<i64>) -> StatusCode {
    match authorized(&headers) {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(status) => status,
    }
}

async fn list_events(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    authorized(&headers)?;
    Ok(Json(json!([
        { "id": 7, "title": "Open day", "description": "Meet the clubs", "date": "2025-03-01T15:00:00Z", "created_by": "alice", "followers_count": 2 },
        { "id": 8, "title": "Breakfast", "description": "Early start", "date": "2025-03-01T08:00:00Z", "created_by": "bob" },
        { "id": 9, "title": "Hike", "description": "Ridge trail", "date": "2025-03-02T07:30:00Z", "created_by": "alice" },
    ])))
}

async fn followed_events_malformed(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    authorized(&headers)?;
    Ok(Json(json!({ "unexpected": "shape" })))
}
