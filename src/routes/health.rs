use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::infra::app_state::AppState;

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(utoipa_axum::routes!(health))
}

#[derive(Serialize, ToSchema)]
pub struct HealthRes {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "2025-10-01T12:00:00.000Z")]
    pub time: String,
}

/// Liveness probe. Never touches storage.
#[utoipa::path(
    get,
    path = "/health",
    tags = ["System"],
    responses(
        (status = 200, description = "Service is up", body = HealthRes)
    )
)]
async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        status: "ok".into(),
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
