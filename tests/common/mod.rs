//! Common test utilities and helpers for integration tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use stockroom::auth::{AccountService, RateLimitConfig, TokenService};
use stockroom::database::SqliteDatabase;
use stockroom::server::{build_router, AppState};
use stockroom::storage::{AttachmentIngestor, FilesystemStore};
use tempfile::TempDir;

/// Signing secret shared by the test server and tests that mint tokens
pub const TEST_SECRET: &str = "integration-test-secret";

/// A live server over an in-memory database and a temp upload directory
pub struct TestApp {
    pub addr: SocketAddr,
    pub state: AppState<SqliteDatabase>,
    pub upload_dir: TempDir,
    // Dropping the sender shuts the server down
    _shutdown: tokio::sync::oneshot::Sender<()>,
}

impl TestApp {
    /// Boot a server on an OS-assigned port
    pub async fn spawn() -> Self {
        Self::spawn_with_rate_limit(RateLimitConfig::default()).await
    }

    /// Boot a server with a specific login rate limit
    pub async fn spawn_with_rate_limit(rate_limit: RateLimitConfig) -> Self {
        let database = Arc::new(
            SqliteDatabase::in_memory()
                .await
                .expect("Failed to create test database"),
        );
        let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
        let store = FilesystemStore::new(upload_dir.path());
        let ingestor = Arc::new(AttachmentIngestor::new(Arc::new(store)));
        let tokens = Arc::new(TokenService::new(TEST_SECRET, 3600));
        let accounts = Arc::new(AccountService::new(Arc::clone(&database), rate_limit));

        let state = AppState {
            accounts,
            tokens,
            database,
            ingestor,
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("Failed to get local address");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let app = build_router(state.clone());
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("Server error");
        });

        // Give the server a moment to start
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        Self {
            addr,
            state,
            upload_dir,
            _shutdown: shutdown_tx,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Register a user, asserting success, and return the response body
pub async fn register_user(
    client: &reqwest::Client,
    app: &TestApp,
    username: &str,
) -> serde_json::Value {
    let response = client
        .post(app.url("/users/register"))
        .json(&serde_json::json!({
            "username": username,
            "name": format!("{} Display", username),
            "password": "pass1234",
            "age": 30,
        }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(response.status(), 201, "registration should succeed");
    response.json().await.expect("register response not json")
}

/// Log a user in with the default test password and return the session token
pub async fn login_user(client: &reqwest::Client, app: &TestApp, username: &str) -> String {
    let response = client
        .post(app.url("/users/login"))
        .json(&serde_json::json!({
            "username": username,
            "password": "pass1234",
        }))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(response.status(), 200, "login should succeed");

    let body: serde_json::Value = response.json().await.expect("login response not json");
    body["token"].as_str().expect("missing token").to_string()
}

/// Register and log in, returning the session token
pub async fn register_and_login(
    client: &reqwest::Client,
    app: &TestApp,
    username: &str,
) -> String {
    register_user(client, app, username).await;
    login_user(client, app, username).await
}

/// Build an item multipart form with the given file attached
pub fn item_form(
    title: &str,
    description: &str,
    status: &str,
    file_name: &str,
    data: &[u8],
) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new()
        .text("title", title.to_string())
        .text("description", description.to_string())
        .text("status", status.to_string())
        .part(
            "item_image",
            reqwest::multipart::Part::bytes(data.to_vec()).file_name(file_name.to_string()),
        )
}

/// Create an item as the given session, asserting success
pub async fn create_item(
    client: &reqwest::Client,
    app: &TestApp,
    token: &str,
    title: &str,
) -> serde_json::Value {
    let form = item_form(title, "Integration test item", "active", "photo.jpg", b"jpeg bytes");
    let response = client
        .post(app.url("/items"))
        .header("auth-token", token)
        .multipart(form)
        .send()
        .await
        .expect("create item request failed");
    assert_eq!(response.status(), 201, "item creation should succeed");
    response.json().await.expect("create response not json")
}
