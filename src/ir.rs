use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Canonical location id.
///
/// Upstream records carry ids either as JSON strings or JSON numbers. Both are
/// converted here, once, so the rest of the crate only ever compares strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LocationId(String);

impl LocationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LocationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for LocationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Self(text),
            RawId::Number(number) => Self(number.to_string()),
        })
    }
}

/// One location as delivered by the data layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<LocationId>,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "type")]
    pub type_name: String,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub parent_id: Option<LocationId>,
    #[serde(default)]
    pub child_count: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
}

impl LocationRecord {
    pub fn new(id: impl Into<LocationId>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent: impl Into<LocationId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    pub fn with_child_count(mut self, count: u32) -> Self {
        self.child_count = Some(count);
        self
    }

    /// The record's id as text, if it has one.
    pub fn key(&self) -> Option<&str> {
        self.id.as_ref().map(LocationId::as_str)
    }
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<LocationId>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = Option::<LocationId>::deserialize(deserializer)?;
    Ok(id.filter(|id| !id.is_blank()))
}

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("invalid location JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected an array of locations or an object with a `locations` array")]
    UnexpectedShape,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LocationsDocument {
    List(Vec<LocationRecord>),
    Wrapped { locations: Vec<LocationRecord> },
}

/// Parse a location snapshot: either a bare JSON array or `{"locations": [...]}`.
pub fn parse_locations(input: &str) -> Result<Vec<LocationRecord>, InputError> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    if !value.is_array() && value.get("locations").is_none() {
        return Err(InputError::UnexpectedShape);
    }
    let document: LocationsDocument = serde_json::from_value(value)?;
    Ok(match document {
        LocationsDocument::List(list) => list,
        LocationsDocument::Wrapped { locations } => locations,
    })
}
