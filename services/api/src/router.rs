//! Axum Router Configuration
//!
//! This module defines the complete HTTP surface of the application: the
//! REST API, the conversation WebSocket endpoint, OpenAPI documentation and
//! the static frontend fallback.

use crate::{handlers, state::AppState, ws::ws_handler};

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::get_themes, handlers::healthcheck),
    components(schemas(handlers::HealthResponse)),
    tags(
        (name = "Parla API", description = "Realtime speech practice relay")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let static_dir = app_state.config.static_dir.clone();

    // Group all routes that require AppState into their own router.
    let api_router = Router::new()
        .route("/api/themes", get(handlers::get_themes))
        .route("/health", get(handlers::healthcheck))
        .route("/ws/conversation", get(ws_handler))
        .with_state(app_state);

    // Merge the stateful routes with the stateless ones and fall back to
    // the bundled frontend for everything else.
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
        .fallback_service(ServeDir::new(static_dir))
}
