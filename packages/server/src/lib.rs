pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod seed;
pub mod service;
pub mod state;

use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use axum::middleware::from_fn_with_state;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::middleware::Diagnostics;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Real Estate API",
        version = "1.0.0",
        description = "Read access to the real-estate property catalog"
    ),
    tags(
        (name = "Properties", description = "Property listing, filtering, and details"),
    ),
)]
struct ApiDoc;

/// Build the application router.
///
/// Every request passes through the error boundary, which renders any
/// failure as the JSON error envelope. Development mode also mounts the
/// Swagger UI and Scalar API docs.
pub fn build_router(state: AppState) -> axum::Router {
    let development = state.config.environment.is_development();
    let diagnostics = Diagnostics {
        enabled: development,
    };
    let cors = cors_layer(&state.config.server.cors);

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes())
        .split_for_parts();

    let mut router = router.with_state(state);
    if development {
        router = router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
            .merge(Scalar::with_url("/scalar", api));
    }

    router
        .layer(CatchPanicLayer::custom(middleware::handle_panic))
        .layer(from_fn_with_state(diagnostics, middleware::error_boundary))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Read-only API: only `GET` is allowed cross-origin. No origins configured means any origin.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::HeaderName::from_static(
            middleware::REQUEST_ID_HEADER,
        )])
        .max_age(Duration::from_secs(config.max_age));

    if config.allow_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(origins)
}
