use std::future::IntoFuture;
use std::time::Duration;

use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::{Collection, Database, error::Error as MongoError};
use tracing::{error, info};

use super::query::build_filter;
use super::{PropertyRepository, parse_id};
use crate::entity::Property;
use crate::error::AppError;
use crate::models::property::PropertyFilter;

/// Property repository over a MongoDB collection.
#[derive(Clone)]
pub struct MongoPropertyRepository {
    properties: Collection<Property>,
    timeout: Duration,
}

impl MongoPropertyRepository {
    /// `timeout` bounds every store call; hitting it counts as a database error.
    pub fn new(db: &Database, collection: &str, timeout: Duration) -> Self {
        Self {
            properties: db.collection(collection),
            timeout,
        }
    }

    /// Await a driver call, turning driver errors and timeouts into
    /// [`AppError::Database`] carrying `failure` as the internal message.
    async fn run<T, F>(&self, call: F, failure: impl FnOnce() -> String) -> Result<T, AppError>
    where
        F: IntoFuture<Output = Result<T, MongoError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                let message = failure();
                error!(error = %err, "{message}");
                Err(AppError::database(message, err))
            }
            Err(elapsed) => {
                let message = failure();
                error!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "{message}: timed out"
                );
                Err(AppError::database(message, elapsed))
            }
        }
    }
}

#[async_trait]
impl PropertyRepository for MongoPropertyRepository {
    async fn get_all(&self) -> Result<Vec<Property>, AppError> {
        self.run(
            async {
                let cursor = self.properties.find(doc! {}).await?;
                cursor.try_collect::<Vec<Property>>().await
            },
            || "Failed to retrieve properties from database".into(),
        )
        .await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Property>, AppError> {
        let oid = parse_id(id)?;
        self.run(self.properties.find_one(doc! { "_id": oid }), || {
            format!("Failed to retrieve property with id {id} from database")
        })
        .await
    }

    async fn get_filtered(&self, filter: &PropertyFilter) -> Result<Vec<Property>, AppError> {
        let query = build_filter(filter)?;
        self.run(
            async {
                let cursor = self.properties.find(query.to_document()).await?;
                cursor.try_collect::<Vec<Property>>().await
            },
            || "Failed to filter properties from database".into(),
        )
        .await
    }

    async fn create(&self, mut property: Property) -> Result<Property, AppError> {
        if property.id.is_empty() {
            property.id = ObjectId::new().to_hex();
        } else {
            parse_id(&property.id)?;
        }

        self.run(self.properties.insert_one(&property), || {
            "Failed to create property in database".into()
        })
        .await?;

        info!(property_id = %property.id, "Property created successfully");
        Ok(property)
    }

    async fn replace(&self, id: &str, mut property: Property) -> Result<bool, AppError> {
        let oid = parse_id(id)?;
        // `_id` is immutable; the replacement must carry the target's id.
        property.id = oid.to_hex();

        let result = self
            .run(
                self.properties.replace_one(doc! { "_id": oid }, &property),
                || format!("Failed to update property with id {id} in database"),
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::not_found("Property", id));
        }

        info!(property_id = %id, "Property updated successfully");
        Ok(result.modified_count > 0)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let oid = parse_id(id)?;
        let result = self
            .run(self.properties.delete_one(doc! { "_id": oid }), || {
                format!("Failed to delete property with id {id} from database")
            })
            .await?;

        if result.deleted_count == 0 {
            return Err(AppError::not_found("Property", id));
        }

        info!(property_id = %id, "Property deleted successfully");
        Ok(())
    }

    async fn count(&self) -> Result<u64, AppError> {
        self.run(self.properties.count_documents(doc! {}), || {
            "Failed to count properties in database".into()
        })
        .await
    }
}
