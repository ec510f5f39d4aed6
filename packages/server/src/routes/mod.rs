use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/properties", property_routes())
}

fn property_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::property::list_properties))
        .routes(routes!(handlers::property::filter_properties))
        .routes(routes!(handlers::property::get_property))
}
