//! Handlers for the `/attractions` resource.

use axum::extract::{Multipart, State};
use axum::response::Response;
use uuid::Uuid;
use validator::Validate;

use super::uploads::{read_file, store, UploadKind, UploadedFile};
use crate::middleware::AuthUser;
use crate::models::attraction::{CreateAttraction, ListAttractions, UpdateAttraction};
use crate::models::ticket::NewTicket;
use crate::repositories::{AttractionRepo, TicketRepo};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::{Json, Path, Query};
use crate::utils::response::{created, empty_success, success};

/// GET /api/v1/attractions
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListAttractions>,
) -> AppResult<Response> {
    if query.include_tickets {
        let attractions = AttractionRepo::list_with_tickets(state.pool(), user.id, &query).await?;
        Ok(success(attractions, "Attractions loaded"))
    } else {
        let attractions = AttractionRepo::list(state.pool(), user.id, &query).await?;
        Ok(success(attractions, "Attractions loaded"))
    }
}

/// POST /api/v1/attractions
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateAttraction>,
) -> AppResult<Response> {
    input.validate()?;
    let attraction = AttractionRepo::create(state.pool(), user.id, &input).await?;
    Ok(created(attraction, "Attraction added successfully"))
}

/// GET /api/v1/attractions/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let attraction = AttractionRepo::find(state.pool(), id, user.id).await?;
    Ok(success(attraction, "Attraction loaded"))
}

/// PATCH /api/v1/attractions/:id
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateAttraction>,
) -> AppResult<Response> {
    input.validate()?;
    let attraction = AttractionRepo::update(state.pool(), id, user.id, &input).await?;
    Ok(success(attraction, "Attraction updated successfully"))
}

/// DELETE /api/v1/attractions/:id
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    AttractionRepo::delete(state.pool(), id, user.id).await?;
    Ok(empty_success("Attraction deleted successfully"))
}

/// POST /api/v1/attractions/:id/tickets
pub async fn add_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<NewTicket>,
) -> AppResult<Response> {
    input.validate()?;
    let ticket = TicketRepo::create(state.pool(), id, user.id, &input).await?;
    Ok(created(ticket, "Ticket added successfully"))
}

/// POST /api/v1/attractions/:id/image
pub async fn upload_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Response> {
    attach_upload(state, user, id, UploadKind::Image, multipart).await
}

/// POST /api/v1/attractions/:id/barcode
pub async fn upload_barcode(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Response> {
    attach_upload(state, user, id, UploadKind::Barcode, multipart).await
}

/// Checks ownership before storing anything, then records the URL on the row.
async fn attach_upload(
    state: AppState,
    user: AuthUser,
    id: Uuid,
    kind: UploadKind,
    mut multipart: Multipart,
) -> AppResult<Response> {
    AttractionRepo::find(state.pool(), id, user.id).await?;

    let upload = read_file(&mut multipart).await?;
    let url = store(&state, &user, kind, &upload).await?;

    let (image_url, barcode_url) = match kind {
        UploadKind::Image => (Some(url.clone()), None),
        UploadKind::Barcode => (None, Some(url.clone())),
    };
    AttractionRepo::attach_media(state.pool(), id, user.id, image_url, barcode_url).await?;

    Ok(created(UploadedFile { url }, "File attached to attraction"))
}
