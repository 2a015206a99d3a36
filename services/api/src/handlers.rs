//! Axum Handlers for the REST API
//!
//! Small JSON endpoints that sit next to the websocket relay: the practice
//! theme catalog and a health probe. The `utoipa` annotations generate the
//! OpenAPI documentation.

use axum::response::Json;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::catalog;

/// Service health indicator.
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"ok"` while the service is running.
    #[schema(example = "ok")]
    pub status: String,
}

/// List the practice themes and their scenarios.
#[utoipa::path(
    get,
    path = "/api/themes",
    responses(
        (status = 200, description = "Map of theme names to scenario lists", body = BTreeMap<String, Vec<String>>)
    )
)]
pub async fn get_themes() -> Json<BTreeMap<&'static str, Vec<&'static str>>> {
    Json(catalog::theme_map())
}

/// Report service health.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
