use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;
use validator::Validate;

use crate::middleware::AuthUser;
use crate::models::ticket::UpdateTicket;
use crate::repositories::TicketRepo;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::{Json, Path};
use crate::utils::response::{empty_success, success};

/// PATCH /api/v1/tickets/:id
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTicket>,
) -> AppResult<Response> {
    input.validate()?;
    let ticket = TicketRepo::update(state.pool(), id, user.id, &input).await?;
    Ok(success(ticket, "Ticket updated successfully"))
}

/// DELETE /api/v1/tickets/:id
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    TicketRepo::delete(state.pool(), id, user.id).await?;
    Ok(empty_success("Ticket deleted successfully"))
}
