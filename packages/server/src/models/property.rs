//! Read projections of [`Property`] and the mapping onto them.
//!
//! The `From` conversions are total: a missing owner, image list, or trace
//! list becomes empty strings, `null`s, or empty arrays in the projection and
//! never an error. [`to_summary`] and [`to_detail`] wrap them so that a fault
//! while mapping surfaces as [`AppError::Business`].

use std::panic::{AssertUnwindSafe, catch_unwind};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::entity::{Property, PropertyImage, PropertyTrace};
use crate::error::{AppError, Panicked};

/// Query parameters for filtering properties. Every criterion is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PropertyFilter {
    /// Case-insensitive substring of the property name.
    #[param(example = "Casa")]
    pub name: Option<String>,
    /// Case-insensitive substring of the address.
    #[param(example = "Medellín")]
    pub address: Option<String>,
    /// Inclusive lower price bound. Must be >= 0.
    #[serde(alias = "min_price", default, deserialize_with = "blank_as_none")]
    #[param(example = 100000)]
    pub min_price: Option<f64>,
    /// Inclusive upper price bound. Must be >= 0 and >= `minPrice`.
    #[serde(alias = "max_price", default, deserialize_with = "blank_as_none")]
    #[param(example = 500000)]
    pub max_price: Option<f64>,
}

/// A price bound as sent by a client: a number, or a numeric string where an
/// empty value means the bound is absent (`?minPrice=&maxPrice=`).
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Bound {
        Number(f64),
        Text(String),
    }

    match Option::<Bound>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Bound::Number(value)) => Ok(Some(value)),
        Some(Bound::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Bound::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid price `{text}`"))),
    }
}

/// Row of a property listing.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertySummary {
    #[schema(example = "507f1f77bcf86cd799439011")]
    pub id: String,
    /// Empty when the property has no owner.
    pub id_owner: String,
    pub owner_name: String,
    #[schema(example = "Casa Moderna")]
    pub property_name: String,
    pub address: String,
    #[schema(example = 300000)]
    pub price: f64,
    /// File of the first enabled image, in stored order.
    pub image: Option<String>,
}

/// Full view of a single property.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetail {
    pub id: String,
    pub name: String,
    pub address: String,
    pub price: f64,
    pub code_internal: String,
    pub year: i32,

    pub owner_id: String,
    pub owner_name: String,
    pub owner_address: String,
    pub owner_photo: Option<String>,
    pub owner_birthday: Option<DateTime<Utc>>,

    /// Always an array, empty when the property has no images.
    pub images: Vec<PropertyImageResponse>,
    /// Always an array, empty when the property has no recorded sales.
    pub traces: Vec<PropertyTraceResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyImageResponse {
    pub id: String,
    pub file: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyTraceResponse {
    pub id: String,
    pub name: String,
    pub date_sale: DateTime<Utc>,
    pub value: f64,
    pub tax: f64,
}

/// File of the first enabled image, if any.
pub fn display_image(images: Option<&[PropertyImage]>) -> Option<String> {
    images?
        .iter()
        .find(|img| img.enabled)
        .map(|img| img.file.clone())
}

impl From<&Property> for PropertySummary {
    fn from(p: &Property) -> Self {
        let owner = p.owner.as_ref();
        Self {
            id: p.id.clone(),
            id_owner: owner.map(|o| o.owner_id.clone()).unwrap_or_default(),
            owner_name: owner.map(|o| o.name.clone()).unwrap_or_default(),
            property_name: p.name.clone(),
            address: p.address.clone(),
            price: p.price,
            image: display_image(p.images.as_deref()),
        }
    }
}

impl From<&PropertyImage> for PropertyImageResponse {
    fn from(img: &PropertyImage) -> Self {
        Self {
            id: img.image_id.clone(),
            file: img.file.clone(),
            enabled: img.enabled,
        }
    }
}

impl From<&PropertyTrace> for PropertyTraceResponse {
    fn from(t: &PropertyTrace) -> Self {
        Self {
            id: t.trace_id.clone(),
            name: t.name.clone(),
            date_sale: t.date_sale,
            value: t.value,
            tax: t.tax,
        }
    }
}

impl From<&Property> for PropertyDetail {
    fn from(p: &Property) -> Self {
        let owner = p.owner.as_ref();
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            address: p.address.clone(),
            price: p.price,
            code_internal: p.code_internal.clone(),
            year: p.year,
            owner_id: owner.map(|o| o.owner_id.clone()).unwrap_or_default(),
            owner_name: owner.map(|o| o.name.clone()).unwrap_or_default(),
            owner_address: owner.map(|o| o.address.clone()).unwrap_or_default(),
            owner_photo: owner.and_then(|o| o.photo.clone()),
            owner_birthday: owner.map(|o| o.birthday),
            images: p
                .images
                .iter()
                .flatten()
                .map(PropertyImageResponse::from)
                .collect(),
            traces: p
                .traces
                .iter()
                .flatten()
                .map(PropertyTraceResponse::from)
                .collect(),
        }
    }
}

pub fn to_summary(property: &Property) -> Result<PropertySummary, AppError> {
    guarded(property, "DTO", |p| PropertySummary::from(p))
}

pub fn to_detail(property: &Property) -> Result<PropertyDetail, AppError> {
    guarded(property, "detail DTO", |p| PropertyDetail::from(p))
}

fn guarded<T>(
    property: &Property,
    target: &str,
    map: impl FnOnce(&Property) -> T,
) -> Result<T, AppError> {
    catch_unwind(AssertUnwindSafe(|| map(property))).map_err(|payload| {
        let fault = Panicked::from_payload(payload.as_ref());
        tracing::error!(property_id = %property.id, %fault, "Error mapping property to {target}");
        AppError::business(
            format!("Failed to map property {} to {target}", property.id),
            fault,
        )
    })
}
