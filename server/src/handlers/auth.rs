//! Sign-up, sign-in and password flows, passed straight through to the
//! identity provider.

use axum::extract::State;
use axum::response::Response;
use serde::Deserialize;
use validator::Validate;

use crate::middleware::AuthUser;
use crate::repositories::UserRepo;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::Json;
use crate::utils::response::{created, empty_success, success};

#[derive(Debug, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordUpdate {
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// POST /api/v1/auth/signup
pub async fn sign_up(
    State(state): State<AppState>,
    Json(input): Json<Credentials>,
) -> AppResult<Response> {
    input.validate()?;

    let sign_up = state
        .backend
        .auth
        .sign_up(&input.email, &input.password)
        .await?;

    // Auto-confirmed accounts are signed in right away and need their profile now.
    if sign_up.session.is_some() {
        UserRepo::ensure_exists(state.pool(), sign_up.user.id, &input.email).await?;
    }

    Ok(created(sign_up, "Check your email to confirm your account"))
}

/// POST /api/v1/auth/signin
pub async fn sign_in(
    State(state): State<AppState>,
    Json(input): Json<Credentials>,
) -> AppResult<Response> {
    input.validate()?;

    let session = state
        .backend
        .auth
        .sign_in(&input.email, &input.password)
        .await?;

    let default_name = session.user.display_name().unwrap_or(input.email.as_str()).to_string();
    UserRepo::ensure_exists(state.pool(), session.user.id, &default_name).await?;

    Ok(success(session, "Signed in successfully"))
}

/// POST /api/v1/auth/signout
pub async fn sign_out(State(state): State<AppState>, user: AuthUser) -> AppResult<Response> {
    state.backend.auth.sign_out(&user.access_token).await?;
    tracing::info!(user_id = %user.id, "Partner signed out");
    Ok(empty_success("Signed out successfully"))
}

/// POST /api/v1/auth/password/reset
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(input): Json<PasswordResetRequest>,
) -> AppResult<Response> {
    input.validate()?;
    state.backend.auth.reset_password(&input.email).await?;
    Ok(empty_success("Password reset email sent"))
}

/// PUT /api/v1/auth/password
pub async fn update_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<PasswordUpdate>,
) -> AppResult<Response> {
    input.validate()?;
    state
        .backend
        .auth
        .update_password(&user.access_token, &input.password)
        .await?;
    tracing::info!(user_id = %user.id, "Password updated");
    Ok(empty_success("Password updated successfully"))
}
