use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PropertyImage {
    pub image_id: String,
    pub file: String, // URL or storage key
    pub enabled: bool,
}
