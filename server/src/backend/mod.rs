//! Client for the managed backend: the Postgres pool plus the identity and
//! object-storage HTTP APIs that sit next to it.
//!
//! One `BackendClient` is built at startup and handed to the router state;
//! nothing in the crate reaches for a global handle.

use reqwest::Response;
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use crate::config::Config;

pub mod auth;
pub mod storage;

pub use auth::AuthGateway;
pub use storage::StorageClient;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("This email is already registered. Please sign in instead.")]
    AlreadyRegistered,

    #[error("unexpected backend response: {0}")]
    Decode(String),
}

#[derive(Clone)]
pub struct BackendClient {
    pub pool: PgPool,
    pub auth: AuthGateway,
    pub storage: StorageClient,
}

impl BackendClient {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        let http = reqwest::Client::new();

        Self {
            pool,
            auth: AuthGateway::new(
                http.clone(),
                &config.backend_url,
                &config.backend_api_key,
                &config.site_url,
            ),
            storage: StorageClient::new(http, &config.backend_url, &config.backend_api_key),
        }
    }
}

/// Error payloads differ between the identity and storage APIs; take whichever
/// message field is present.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

/// Turns a non-success response into `BackendError::Api`, keeping the provider's message.
pub(crate) async fn api_error(response: Response) -> BackendError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();

    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let message = body
        .error_description
        .or(body.msg)
        .or(body.message)
        .or(body.error)
        .unwrap_or(text);

    BackendError::Api { status, message }
}

/// Checks the status and returns the response untouched on success.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, BackendError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(api_error(response).await)
    }
}
