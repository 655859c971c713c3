pub mod health;
pub mod orders;

use axum::{Router, middleware::from_fn_with_state};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};
use utoipa_axum::router::OpenApiRouter;

use crate::infra::{
    app_state::AppState,
    middleware::{self, cors_layer, with_security_headers},
    swagger,
};

/// All API routes together with their OpenAPI description.
pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    health::routes_with_openapi().merge(orders::routes_with_openapi())
}

/// Builds the complete application around an already constructed state.
pub fn app(state: AppState) -> Router {
    let (router, openapi) = routes_with_openapi().split_for_parts();
    let mut router = router.merge(swagger::create_swagger_ui(openapi));

    if let Some(dir) = state.config.static_dir.as_ref() {
        if dir.is_dir() {
            tracing::info!("Serving static files from {}", dir.display());
            router = router.fallback_service(ServeDir::new(dir));
        } else {
            tracing::warn!("STATIC_DIR {} is not a directory, ignoring", dir.display());
        }
    }

    let router = router.layer(from_fn_with_state(state.clone(), middleware::rate_limit));

    with_security_headers(router)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors)),
        )
        .with_state(state)
}
