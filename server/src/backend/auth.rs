//! Gateway to the external identity provider (GoTrue-compatible `/auth/v1` API).
//!
//! Each operation is one HTTP call. Failures come back as the provider's own
//! status and message; nothing here retries.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{ensure_success, BackendError};

/// The identity record held by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
    /// Linked sign-in identities. The provider returns an empty list when a
    /// sign-up hits an address that is already registered.
    #[serde(default, skip_serializing)]
    pub identities: Option<Vec<Value>>,
}

impl Identity {
    /// Display name from the provider metadata, if any.
    pub fn display_name(&self) -> Option<&str> {
        self.user_metadata
            .get("name")
            .or_else(|| self.user_metadata.get("full_name"))
            .and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: String,
    pub user: Identity,
}

/// Sign-up returns a full session when the provider auto-confirms, otherwise
/// just the unconfirmed user.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(Session),
    User(Identity),
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUp {
    pub user: Identity,
    pub session: Option<Session>,
}

/// Fields accepted by `PUT /user`. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Clone)]
pub struct AuthGateway {
    http: Client,
    base_url: String,
    api_key: String,
    site_url: String,
}

impl AuthGateway {
    pub fn new(http: Client, backend_url: &str, api_key: &str, site_url: &str) -> Self {
        Self {
            http,
            base_url: format!("{}/auth/v1", backend_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    /// Where the verification e-mail sends the partner back to.
    pub fn verification_redirect(&self) -> String {
        format!("{}/login?verified=true", self.site_url)
    }

    pub fn password_reset_redirect(&self) -> String {
        format!("{}/auth/reset-password", self.site_url)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUp, BackendError> {
        let response = self
            .http
            .post(format!("{}/signup", self.base_url))
            .query(&[("redirect_to", self.verification_redirect())])
            .header("apikey", &self.api_key)
            .json(&json!({
                "email": email,
                "password": password,
                // Seeds the profile row's display name until the partner sets one.
                "data": { "full_name": email },
            }))
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let body: SignUpResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        let sign_up = match body {
            SignUpResponse::Session(session) => SignUp {
                user: session.user.clone(),
                session: Some(session),
            },
            SignUpResponse::User(user) => SignUp {
                user,
                session: None,
            },
        };

        if sign_up
            .user
            .identities
            .as_ref()
            .is_some_and(|identities| identities.is_empty())
        {
            return Err(BackendError::AlreadyRegistered);
        }

        tracing::info!(user_id = %sign_up.user.id, "Partner signed up");
        Ok(sign_up)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let response = self
            .http
            .post(format!("{}/token", self.base_url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let session: Session = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        tracing::info!(user_id = %session.user.id, "Partner signed in");
        Ok(session)
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let response = self
            .http
            .post(format!("{}/logout", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    pub async fn reset_password(&self, email: &str) -> Result<(), BackendError> {
        let response = self
            .http
            .post(format!("{}/recover", self.base_url))
            .query(&[("redirect_to", self.password_reset_redirect())])
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email }))
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    pub async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<Identity, BackendError> {
        self.update_user(
            access_token,
            &UserAttributes {
                password: Some(new_password.to_string()),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn update_user(
        &self,
        access_token: &str,
        attributes: &UserAttributes,
    ) -> Result<Identity, BackendError> {
        let response = self
            .http
            .put(format!("{}/user", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .json(attributes)
            .send()
            .await?;

        ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Resolves the identity behind an access token.
    pub async fn get_user(&self, access_token: &str) -> Result<Identity, BackendError> {
        let response = self
            .http
            .get(format!("{}/user", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}
