use axum::extract::State;
use axum::response::Response;
use validator::Validate;

use crate::middleware::AuthUser;
use crate::models::user::{CurrentUser, UpdateCompanyName, UpdateProfile};
use crate::repositories::UserRepo;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::Json;
use crate::utils::response::{empty_success, success};

/// GET /api/v1/me
pub async fn get_current(State(state): State<AppState>, user: AuthUser) -> AppResult<Response> {
    let profile = UserRepo::find(state.pool(), user.id).await?;
    Ok(success(
        CurrentUser {
            identity: user.identity,
            profile,
        },
        "Profile loaded",
    ))
}

/// PUT /api/v1/me
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<UpdateProfile>,
) -> AppResult<Response> {
    input.validate()?;
    let current =
        UserRepo::update_profile(&state.backend, &user.access_token, user.id, &input).await?;
    Ok(success(current, "Profile updated successfully"))
}

/// PUT /api/v1/me/company
pub async fn update_company_name(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<UpdateCompanyName>,
) -> AppResult<Response> {
    input.validate()?;
    let profile =
        UserRepo::update_company_name(state.pool(), user.id, input.company_name.trim()).await?;
    Ok(success(profile, "Company name updated successfully"))
}

/// DELETE /api/v1/me
pub async fn delete_profile(State(state): State<AppState>, user: AuthUser) -> AppResult<Response> {
    UserRepo::delete_profile(&state.backend, &user.access_token, user.id).await?;
    Ok(empty_success("Account deleted successfully"))
}
