#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use attractions_server::backend::BackendClient;
use attractions_server::config::Config;
use attractions_server::routes::create_routes;
use attractions_server::state::AppState;

pub const API_KEY: &str = "anon-key";
pub const SITE_URL: &str = "http://localhost:3000";
pub const TOKEN: &str = "partner-access-token";

/// Config pointing the backend clients at `backend_url` (usually a `MockServer`).
pub fn test_config(backend_url: &str) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("BACKEND_URL", backend_url.to_string()),
        ("BACKEND_API_KEY", API_KEY.to_string()),
        ("SITE_URL", SITE_URL.to_string()),
        ("MAX_UPLOAD_BYTES", "1048576".to_string()),
    ]);
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

/// A pool that never connects. Requests that reach the database fail with a
/// database error; everything before that runs normally.
pub fn unreachable_pool() -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(100))
        .connect_lazy("postgres://nobody@127.0.0.1:1/none")
        .unwrap()
}

pub fn backend_client(pool: PgPool, backend_url: &str) -> BackendClient {
    BackendClient::new(pool, &test_config(backend_url))
}

/// The production router wired to the given pool and backend.
pub fn build_test_app(pool: PgPool, backend_url: &str) -> Router {
    let config = test_config(backend_url);
    let backend = BackendClient::new(pool, &config);
    create_routes(AppState::new(backend, config))
}

pub fn identity_json(id: Uuid, email: &str) -> Value {
    json!({
        "id": id,
        "aud": "authenticated",
        "email": email,
        "user_metadata": { "full_name": email },
        "identities": [{ "provider": "email", "identity_id": Uuid::new_v4() }],
    })
}

pub fn session_json(id: Uuid, email: &str) -> Value {
    json!({
        "access_token": TOKEN,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "refresh-token",
        "user": identity_json(id, email),
    })
}

/// Makes the provider accept [`TOKEN`] as belonging to `user_id`.
pub async fn accept_token(server: &MockServer, user_id: Uuid) {
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(identity_json(user_id, "partner@example.com")),
        )
        .mount(server)
        .await;
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    json_request(app, Method::POST, uri, body, None).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value) -> Response {
    json_request(app, Method::POST, uri, body, Some(TOKEN)).await
}

pub async fn patch_json_auth(app: Router, uri: &str, body: Value) -> Response {
    json_request(app, Method::PATCH, uri, body, Some(TOKEN)).await
}

async fn json_request(
    app: Router,
    method: Method,
    uri: &str,
    body: Value,
    token: Option<&str>,
) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    send(app, request).await
}

pub const BOUNDARY: &str = "attractions-test-boundary";

/// A multipart body with a single `file` field.
pub fn multipart_file(file_name: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart_auth(app: Router, uri: &str, body: Vec<u8>) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {TOKEN}"))
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
