use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identifier of a row rendered in a list.
///
/// Database-backed lists use integer ids; client-side lists may key rows by
/// string. Serialized untagged so `5` and `"user-5"` both round-trip.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(DbId),
    Str(String),
}

impl RecordId {
    /// The integer form, when this id is numeric.
    pub fn as_db_id(&self) -> Option<DbId> {
        match self {
            RecordId::Int(id) => Some(*id),
            RecordId::Str(s) => s.parse().ok(),
        }
    }
}

impl From<DbId> for RecordId {
    fn from(id: DbId) -> Self {
        RecordId::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Str(id.to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{id}"),
            RecordId::Str(s) => f.write_str(s),
        }
    }
}

/// `deserialize_with` helper for `Option<Option<T>>` patch fields.
///
/// Paired with `#[serde(default)]`: a missing key stays `None`, an explicit
/// `null` becomes `Some(None)` and a value becomes `Some(Some(v))`.
pub fn nullable_field<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
