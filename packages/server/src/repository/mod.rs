//! Store access for property documents.
//!
//! Every backend reports store-layer faults as [`AppError::Database`]; callers
//! never see a driver error type.

pub mod memory;
pub mod mongo;
pub mod query;

use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::entity::Property;
use crate::error::AppError;
use crate::models::property::PropertyFilter;

pub use memory::MemoryPropertyRepository;
pub use mongo::MongoPropertyRepository;

#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// All properties in storage order.
    async fn get_all(&self) -> Result<Vec<Property>, AppError>;

    /// `None` when no property has this id. Fails with a validation error when
    /// `id` is not a 24-character hex ObjectId.
    async fn get_by_id(&self, id: &str) -> Result<Option<Property>, AppError>;

    /// Properties matching every criterion present in `filter`.
    async fn get_filtered(&self, filter: &PropertyFilter) -> Result<Vec<Property>, AppError>;

    /// Insert `property`, assigning a fresh id when it has none. Returns the stored entity.
    async fn create(&self, property: Property) -> Result<Property, AppError>;

    /// Replace the document with this id. Returns whether anything changed.
    async fn replace(&self, id: &str, property: Property) -> Result<bool, AppError>;

    async fn delete(&self, id: &str) -> Result<(), AppError>;

    async fn count(&self) -> Result<u64, AppError>;
}

/// Parse a property id, rejecting anything that is not a canonical ObjectId.
pub fn parse_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::validation("Id", "Invalid property ID format"))
}
