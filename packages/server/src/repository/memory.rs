use async_trait::async_trait;
use bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::query::build_filter;
use super::{PropertyRepository, parse_id};
use crate::entity::Property;
use crate::error::AppError;
use crate::models::property::PropertyFilter;

/// Process-local property store, kept in insertion order.
///
/// Evaluates the same [`super::query::PropertyQuery`] the MongoDB backend
/// sends to the server. Selected with `database.backend = "memory"`.
#[derive(Default)]
pub struct MemoryPropertyRepository {
    properties: RwLock<Vec<Property>>,
}

impl MemoryPropertyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PropertyRepository for MemoryPropertyRepository {
    async fn get_all(&self) -> Result<Vec<Property>, AppError> {
        Ok(self.properties.read().await.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Property>, AppError> {
        let oid = parse_id(id)?;
        let properties = self.properties.read().await;
        Ok(properties.iter().find(|p| same_id(&p.id, &oid)).cloned())
    }

    async fn get_filtered(&self, filter: &PropertyFilter) -> Result<Vec<Property>, AppError> {
        let query = build_filter(filter)?;
        let properties = self.properties.read().await;
        Ok(properties
            .iter()
            .filter(|p| query.matches(p))
            .cloned()
            .collect())
    }

    async fn create(&self, mut property: Property) -> Result<Property, AppError> {
        if property.id.is_empty() {
            property.id = ObjectId::new().to_hex();
        } else {
            property.id = parse_id(&property.id)?.to_hex();
        }
        self.properties.write().await.push(property.clone());
        Ok(property)
    }

    async fn replace(&self, id: &str, mut property: Property) -> Result<bool, AppError> {
        let oid = parse_id(id)?;
        property.id = oid.to_hex();

        let mut properties = self.properties.write().await;
        let slot = properties
            .iter_mut()
            .find(|p| same_id(&p.id, &oid))
            .ok_or_else(|| AppError::not_found("Property", id))?;

        let modified = *slot != property;
        *slot = property;
        Ok(modified)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let oid = parse_id(id)?;
        let mut properties = self.properties.write().await;
        let index = properties
            .iter()
            .position(|p| same_id(&p.id, &oid))
            .ok_or_else(|| AppError::not_found("Property", id))?;
        properties.remove(index);
        Ok(())
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.properties.read().await.len() as u64)
    }
}

fn same_id(stored: &str, oid: &ObjectId) -> bool {
    ObjectId::parse_str(stored).is_ok_and(|stored| stored == *oid)
}
