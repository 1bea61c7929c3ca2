//! Course Entity

use chrono::{DateTime, Utc};
use kernel::id::{CourseId, InstructorId};
use platform::pocketbase::time::deserialize_optional;
use serde::{Deserialize, Deserializer, Serialize};

use super::optional_relation;
use crate::domain::services::parse_price;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Free-form price as entered by staff, e.g. `"49.99"`
    #[serde(default, deserialize_with = "price_text")]
    pub price: String,
    #[serde(default, deserialize_with = "optional_relation")]
    pub instructor_id: Option<InstructorId>,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub updated: Option<DateTime<Utc>>,
}

impl Course {
    /// Numeric price; anything unparseable counts as zero
    pub fn price_value(&self) -> f64 {
        parse_price(&self.price)
    }
}

/// Accepts both `"49.99"` and `49.99`
fn price_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Text(String),
        Number(f64),
    }

    Ok(match Option::<Price>::deserialize(deserializer)? {
        Some(Price::Text(text)) => text,
        Some(Price::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

/// Fields sent when creating or editing a course; unset fields are left
/// untouched on update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor_id: Option<InstructorId>,
}
