use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded sale of a property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PropertyTrace {
    pub trace_id: String,
    pub name: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub date_sale: DateTime<Utc>,
    pub value: f64,
    pub tax: f64,
}
