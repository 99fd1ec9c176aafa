use axum::extract::State;
use axum::response::Response;

use crate::middleware::AuthUser;
use crate::models::attraction::ListAttractions;
use crate::models::dashboard::DashboardStats;
use crate::repositories::{AttractionRepo, TicketRepo, UserRepo};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::success;

/// GET /api/v1/dashboard
pub async fn stats(State(state): State<AppState>, user: AuthUser) -> AppResult<Response> {
    let pool = state.pool();

    let profile = UserRepo::find(pool, user.id).await?;
    let attractions = AttractionRepo::list(pool, user.id, &ListAttractions::default()).await?;
    let ids: Vec<_> = attractions.iter().map(|a| a.id).collect();
    let total_tickets = TicketRepo::count(pool, &ids).await?;

    Ok(success(
        DashboardStats::new(profile.company_name, &attractions, total_tickets),
        "Dashboard loaded",
    ))
}
