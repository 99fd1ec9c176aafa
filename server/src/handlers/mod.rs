use axum::response::Response;
use serde::Serialize;

use crate::utils::response::success;

pub mod attractions;
pub mod auth;
pub mod dashboard;
pub mod profile;
pub mod tickets;
pub mod uploads;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "attractions-api",
    };

    success(payload, "Health check successful")
}
