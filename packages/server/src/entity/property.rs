use serde::{Deserialize, Serialize};

use super::{Owner, PropertyImage, PropertyTrace};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Property {
    /// Hex form of the document's ObjectId. Empty until the store assigns one.
    #[serde(
        rename = "_id",
        with = "bson::serde_helpers::hex_string_as_object_id",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,

    pub name: String,
    pub address: String,
    pub price: f64,
    pub code_internal: String,
    pub year: i32,

    #[serde(default)]
    pub owner: Option<Owner>,

    /// Stored order matters: the first enabled image is the display image.
    #[serde(default)]
    pub images: Option<Vec<PropertyImage>>,

    #[serde(default)]
    pub traces: Option<Vec<PropertyTrace>>,
}
