use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::path::AppPath;
use crate::extractors::query::AppQuery;
use crate::models::property::*;
use crate::service::property_service;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Properties",
    operation_id = "listProperties",
    summary = "List all properties",
    description = "Returns every property with its basic information. The list is empty when there are no properties.",
    responses(
        (status = 200, description = "List of properties", body = Vec<PropertySummary>),
        (status = 503, description = "Database unavailable (Database Error)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_properties(
    State(state): State<AppState>,
) -> Result<Json<Vec<PropertySummary>>, AppError> {
    let properties = property_service(&state).list_all().await?;
    Ok(Json(properties))
}

#[utoipa::path(
    get,
    path = "/filter",
    tag = "Properties",
    operation_id = "filterProperties",
    summary = "Filter properties",
    description = "Returns the properties matching every given criterion: case-insensitive substring of name and address, and an inclusive price range. Omitted criteria are not applied.",
    params(PropertyFilter),
    responses(
        (status = 200, description = "Matching properties", body = Vec<PropertySummary>),
        (status = 400, description = "Invalid price range or malformed parameter (Validation Error)", body = ErrorBody),
        (status = 503, description = "Database unavailable (Database Error)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn filter_properties(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<PropertyFilter>,
) -> Result<Json<Vec<PropertySummary>>, AppError> {
    let properties = property_service(&state)
        .list_filtered(Some(&filter))
        .await?;
    Ok(Json(properties))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Properties",
    operation_id = "getProperty",
    summary = "Get a property by ID",
    description = "Returns the full details of a property, including owner, images, and sale history.",
    params(("id" = String, Path, description = "Property ID (24-character hex ObjectId)")),
    responses(
        (status = 200, description = "Property details", body = PropertyDetail),
        (status = 400, description = "Blank, malformed, or undecodable ID (Validation Error)", body = ErrorBody),
        (status = 404, description = "Property not found (Not Found)", body = ErrorBody),
        (status = 503, description = "Database unavailable (Database Error)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_property(
    State(state): State<AppState>,
    AppPath(id): AppPath<String>,
) -> Result<Json<PropertyDetail>, AppError> {
    let property = property_service(&state).get_by_id(&id).await?;
    Ok(Json(property))
}
