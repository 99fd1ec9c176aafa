//! Bearer-token extractor for partner routes.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::backend::auth::Identity;
use crate::repositories::UserRepo;
use crate::state::AppState;
use crate::utils::error::AppError;

/// The signed-in partner behind the request's access token.
///
/// The token is checked with the identity provider on every request; the
/// provider is the only holder of session state.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub identity: Identity,
    /// Forwarded to the provider for user-scoped calls (uploads, sign-out).
    pub access_token: String,
}

pub(crate) fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::AuthError("Missing Authorization header".into()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::AuthError("Invalid Authorization format. Expected: Bearer <token>".into())
        })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.to_string();
        let identity = UserRepo::get_current(&state.backend.auth, &token).await?;

        Ok(AuthUser {
            id: identity.id,
            identity,
            access_token: token,
        })
    }
}
