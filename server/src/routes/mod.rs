use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, with_security_headers};
use crate::handlers::{attractions, auth, dashboard, health_check, profile, tickets, uploads};
use crate::state::AppState;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(auth::sign_up))
        .route("/auth/signin", post(auth::sign_in))
        .route("/auth/signout", post(auth::sign_out))
        .route("/auth/password/reset", post(auth::request_password_reset))
        .route("/auth/password", put(auth::update_password))
        .route(
            "/me",
            get(profile::get_current)
                .put(profile::update_profile)
                .delete(profile::delete_profile),
        )
        .route("/me/company", put(profile::update_company_name))
        .route("/dashboard", get(dashboard::stats))
        .route("/attractions", get(attractions::list).post(attractions::create))
        .route(
            "/attractions/:id",
            get(attractions::get_by_id)
                .patch(attractions::update)
                .delete(attractions::delete),
        )
        .route("/attractions/:id/tickets", post(attractions::add_ticket))
        .route("/attractions/:id/image", post(attractions::upload_image))
        .route("/attractions/:id/barcode", post(attractions::upload_barcode))
        .route("/uploads/image", post(uploads::upload_image))
        .route("/uploads/barcode", post(uploads::upload_barcode))
        .route("/tickets/:id", patch(tickets::update).delete(tickets::delete))
}

pub fn create_routes(state: AppState) -> Router {
    let config = state.config.clone();

    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    with_security_headers(router, config.production)
        .layer(create_cors_layer(&config.cors_allowed_origins))
}
