use std::path::{Path, PathBuf};

use bson::Bson;
use tracing::info;

use crate::entity::Property;
use crate::error::AppError;
use crate::repository::PropertyRepository;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("seed file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("seed file must contain a JSON array of properties")]
    NotAnArray,
    #[error("seed entry {index} is not valid extended JSON: {source}")]
    ExtendedJson {
        index: usize,
        source: bson::extjson::de::Error,
    },
    #[error("seed entry {index} is not a valid property: {source}")]
    Property {
        index: usize,
        source: bson::de::Error,
    },
    #[error(transparent)]
    Store(#[from] AppError),
}

/// Parse a JSON array of property documents in MongoDB extended JSON
/// (dates as `{"$date": "..."}`), as produced by `mongoexport --jsonArray`
/// or the catalog's data generator.
pub fn parse_seed(json: &str) -> Result<Vec<Property>, SeedError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let serde_json::Value::Array(entries) = value else {
        return Err(SeedError::NotAnArray);
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let bson = Bson::try_from(entry)
                .map_err(|source| SeedError::ExtendedJson { index, source })?;
            bson::from_bson(bson).map_err(|source| SeedError::Property { index, source })
        })
        .collect()
}

/// Insert the properties in `path` when the store holds none.
///
/// Returns the number of properties inserted.
pub async fn seed_if_empty(repo: &dyn PropertyRepository, path: &Path) -> Result<usize, SeedError> {
    let existing = repo.count().await?;
    if existing > 0 {
        info!(existing, "Property store already populated, skipping seed");
        return Ok(0);
    }

    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Io {
            path: path.to_owned(),
            source,
        })?;

    let properties = parse_seed(&json)?;
    let total = properties.len();
    for property in properties {
        repo.create(property).await?;
    }

    info!(inserted = total, path = %path.display(), "Seeded property store");
    Ok(total)
}
