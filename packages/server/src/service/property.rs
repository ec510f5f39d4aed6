use tracing::{error, info, instrument};

use crate::error::AppError;
use crate::models::property::{
    PropertyDetail, PropertyFilter, PropertySummary, to_detail, to_summary,
};
use crate::repository::query::validate_range;
use crate::repository::{PropertyRepository, parse_id};
use crate::state::AppState;

/// Read operations over the property catalog.
///
/// Built per request around the shared repository handle. Validation and
/// not-found errors raised here, and database errors from the repository,
/// are returned unchanged. An unclassified error coming out of the repository
/// is recorded as the cause of a business error.
pub struct PropertyService<'a> {
    repo: &'a dyn PropertyRepository,
}

pub fn property_service(state: &AppState) -> PropertyService<'_> {
    PropertyService::new(state.properties.as_ref())
}

impl<'a> PropertyService<'a> {
    pub fn new(repo: &'a dyn PropertyRepository) -> Self {
        Self { repo }
    }

    /// Summaries of every stored property. An empty store yields an empty list.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<PropertySummary>, AppError> {
        let properties = self
            .repo
            .get_all()
            .await
            .map_err(|e| escalate(e, "Failed to retrieve properties"))?;

        if properties.is_empty() {
            info!("No properties found in database");
            return Ok(Vec::new());
        }

        properties.iter().map(to_summary).collect()
    }

    /// Full detail of one property.
    #[instrument(skip(self), fields(property_id = %id))]
    pub async fn get_by_id(&self, id: &str) -> Result<PropertyDetail, AppError> {
        if id.trim().is_empty() {
            return Err(AppError::validation("Id", "Property ID cannot be empty"));
        }
        parse_id(id)?;

        let context = format!("Failed to retrieve property details for id {id}");
        let property = self
            .repo
            .get_by_id(id)
            .await
            .map_err(|e| escalate(e, context))?
            .ok_or_else(|| AppError::not_found("Property", id))?;

        to_detail(&property)
    }

    /// Summaries of the properties matching `filter`.
    ///
    /// The price range is checked here and again when the repository builds
    /// its query.
    #[instrument(skip(self))]
    pub async fn list_filtered(
        &self,
        filter: Option<&PropertyFilter>,
    ) -> Result<Vec<PropertySummary>, AppError> {
        let filter = filter.ok_or_else(|| AppError::invalid("Filter cannot be null"))?;
        validate_range(filter.min_price, filter.max_price)?;

        let properties = self
            .repo
            .get_filtered(filter)
            .await
            .map_err(|e| escalate(e, "Failed to filter properties"))?;

        if properties.is_empty() {
            info!("No properties found matching the filter criteria");
            return Ok(Vec::new());
        }

        properties.iter().map(to_summary).collect()
    }
}

/// Keep classified errors as they are; wrap anything unclassified in a business error.
fn escalate(err: AppError, context: impl Into<String>) -> AppError {
    match err {
        AppError::Internal { .. } => {
            let context = context.into();
            error!(error = %err, "{context}");
            AppError::business(context, err)
        }
        classified => classified,
    }
}
