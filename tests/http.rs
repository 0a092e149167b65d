use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::get,
};
use once_cell::sync::Lazy;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

const VALID_TOKEN: &str = "t1";

#[derive(Debug, Deserialize)]
struct SidebarCache {
    username: String,
    avatar_url: Option<String>,
}

/// Stand-in for the external profile service.
#[derive(Clone)]
struct FakeBackend {
    user: Arc<Mutex<Value>>,
    updates: Arc<Mutex<Vec<Vec<(String, String)>>>>,
}

impl FakeBackend {
    fn new() -> Self {
        Self {
            user: Arc::new(Mutex::new(json!({ "username": "alice", "email": "a@x.com" }))),
            updates: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {VALID_TOKEN}"))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "jwt expired" }))).into_response()
}

async fn fetch_profile(
    State(backend): State<FakeBackend>,
    Path(_email): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let user = backend.user.lock().await.clone();
    Json(json!({ "user": user })).into_response()
}

async fn update_profile(
    State(backend): State<FakeBackend>,
    Path(_email): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let value = if field.file_name().is_some() {
            "<file>".to_string()
        } else {
            field.text().await.unwrap()
        };
        fields.push((name, value));
    }

    let mut user = backend.user.lock().await;
    for (name, value) in &fields {
        if name == "username" || name == "email" {
            user[name.as_str()] = Value::String(value.clone());
        }
    }
    backend.updates.lock().await.push(fields);
    Json(json!({ "user": user.clone() })).into_response()
}

async fn spawn_backend() -> (String, FakeBackend) {
    let backend = FakeBackend::new();
    let app = Router::new()
        .route("/api/user/profile/:email", get(fetch_profile).put(update_profile))
        .with_state(backend.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let origin = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (origin, backend)
}

struct TestServer {
    base_url: String,
    data_path: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_file(&self.data_path);
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("bis_dashboard_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/sidebar")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server(backend_origin: &str, session: Value) -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    std::fs::write(&data_path, serde_json::to_vec(&session).unwrap()).unwrap();

    let child = Command::new(env!("CARGO_BIN_EXE_bis_dashboard"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", &data_path)
        .env("BACKEND_ORIGIN", backend_origin)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer {
        base_url,
        data_path,
        child,
    }
}

#[tokio::test]
async fn http_profile_page_shows_loaded_user() {
    let _guard = TEST_LOCK.lock().await;
    let (origin, _backend) = spawn_backend().await;
    let server = spawn_server(&origin, json!({ "token": VALID_TOKEN, "userEmail": "a@x.com" })).await;
    let client = Client::new();

    let html = client
        .get(format!("{}/profile", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(html.contains(r#"value="alice" disabled"#));
    assert!(html.contains("Edit Profile"));
    assert!(!html.contains("currentPassword"));
}

#[tokio::test]
async fn http_save_profile_updates_sidebar() {
    let _guard = TEST_LOCK.lock().await;
    let (origin, backend) = spawn_backend().await;
    let server = spawn_server(&origin, json!({ "token": VALID_TOKEN, "userEmail": "a@x.com" })).await;
    let client = Client::new();

    client
        .get(format!("{}/profile", server.base_url))
        .send()
        .await
        .unwrap();
    let response = client
        .post(format!("{}/profile/edit", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let form = Form::new()
        .text("username", "bob")
        .text("email", "a@x.com")
        .text("currentPassword", "")
        .text("newPassword", "");
    let html = client
        .post(format!("{}/profile/save", server.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Profile updated successfully!"));

    let updates = backend.updates.lock().await.clone();
    assert_eq!(
        updates,
        vec![vec![
            ("username".to_string(), "bob".to_string()),
            ("email".to_string(), "a@x.com".to_string()),
        ]]
    );

    let sidebar: SidebarCache = client
        .get(format!("{}/api/sidebar", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(sidebar.username, "bob");
    assert_eq!(sidebar.avatar_url, None);

    let saved: Value = serde_json::from_slice(&std::fs::read(&server.data_path).unwrap()).unwrap();
    assert_eq!(saved["username"], "bob");
    assert_eq!(saved["userEmail"], "a@x.com");
}

#[tokio::test]
async fn http_avatar_preview_keeps_draft_edits() {
    let _guard = TEST_LOCK.lock().await;
    let (origin, backend) = spawn_backend().await;
    let server = spawn_server(&origin, json!({ "token": VALID_TOKEN, "userEmail": "a@x.com" })).await;
    let client = Client::new();

    client
        .get(format!("{}/profile", server.base_url))
        .send()
        .await
        .unwrap();
    client
        .post(format!("{}/profile/edit", server.base_url))
        .send()
        .await
        .unwrap();

    let picture = Part::bytes(vec![0x89, b'P', b'N', b'G'])
        .file_name("me.png")
        .mime_str("image/png")
        .unwrap();
    let form = Form::new()
        .text("username", "zed")
        .text("email", "a@x.com")
        .part("profilePic", picture);
    let response = client
        .post(format!("{}/profile/avatar", server.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let view: Value = client
        .get(format!("{}/api/profile", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["editing"], true);
    assert_eq!(view["draft"]["username"], "zed");
    assert_eq!(view["profile"]["username"], "alice");
    assert_eq!(view["pending_avatar"], "me.png");
    assert!(
        view["preview_url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,")
    );
    assert!(backend.updates.lock().await.is_empty());
}

#[tokio::test]
async fn http_expired_token_keeps_loading_state() {
    let _guard = TEST_LOCK.lock().await;
    let (origin, _backend) = spawn_backend().await;
    let server = spawn_server(&origin, json!({ "token": "stale", "userEmail": "a@x.com" })).await;
    let client = Client::new();

    let html = client
        .get(format!("{}/profile", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(html.contains("Please log in again"));
    assert!(html.contains("spinner"));
    assert!(!html.contains(r#"name="username""#));
}

#[tokio::test]
async fn http_missing_session_requires_auth() {
    let _guard = TEST_LOCK.lock().await;
    let (origin, _backend) = spawn_backend().await;
    let server = spawn_server(&origin, json!({})).await;
    let client = Client::new();

    let view: Value = client
        .get(format!("{}/api/profile", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(view["loaded"], false);
    assert_eq!(view["status"]["kind"], "error");
    assert_eq!(view["status"]["text"], "Authentication required");
}

#[tokio::test]
async fn http_unknown_field_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let (origin, _backend) = spawn_backend().await;
    let server = spawn_server(&origin, json!({ "token": VALID_TOKEN, "userEmail": "a@x.com" })).await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/profile/field", server.base_url))
        .json(&json!({ "name": "password", "value": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let view: Value = client
        .post(format!("{}/api/profile/field", server.base_url))
        .json(&json!({ "name": "age", "value": "25" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    // The field endpoint edits whatever draft exists; none is loaded yet here.
    assert_eq!(view["loaded"], false);

    client
        .get(format!("{}/api/profile", server.base_url))
        .send()
        .await
        .unwrap();
    let view: Value = client
        .post(format!("{}/api/profile/field", server.base_url))
        .json(&json!({ "name": "age", "value": "25" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["draft"]["age"], 25);
    assert!(view["profile"].get("age").is_none());
}

#[tokio::test]
async fn http_logout_clears_session() {
    let _guard = TEST_LOCK.lock().await;
    let (origin, _backend) = spawn_backend().await;
    let server = spawn_server(
        &origin,
        json!({ "token": VALID_TOKEN, "userEmail": "a@x.com", "username": "alice" }),
    )
    .await;
    let client = Client::new();

    let sidebar: SidebarCache = client
        .get(format!("{}/api/sidebar", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(sidebar.username, "alice");

    let response = client
        .post(format!("{}/logout", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let saved: Value = serde_json::from_slice(&std::fs::read(&server.data_path).unwrap()).unwrap();
    assert_eq!(saved, json!({}));

    let sidebar: SidebarCache = client
        .get(format!("{}/api/sidebar", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(sidebar.username, "");
}
