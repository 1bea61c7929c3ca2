//! Learning records as stored in the hosted backend

pub mod certificate;
pub mod course;
pub mod enrollment;
pub mod instructor;

use kernel::id::Id;
use serde::{Deserialize, Deserializer};

/// Optional relation field; the backend sends `""` when unset
pub(crate) fn optional_relation<'de, D, T>(deserializer: D) -> Result<Option<Id<T>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .filter(|v| !v.is_empty())
        .map(Id::from_backend))
}
