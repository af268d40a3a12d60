use crate::constants::APP_ID_FIELD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Insertion-ordered field map shared by both record kinds.
pub type Fields = Map<String, Value>;

/// One scraped app listing.
///
/// Before splitting it may carry its reviews embedded under the reviews field;
/// after [`crate::splitter::split_records`] it never does.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationRecord {
    fields: Fields,
}

impl ApplicationRecord {
    pub fn new(fields: Fields) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Returns the identifier as text, or `None` when it is absent, null or empty.
    ///
    /// Non-string identifiers are rendered with their JSON text so that the
    /// back-reference on reviews is always a string.
    pub fn app_id(&self) -> Option<String> {
        match self.fields.get(APP_ID_FIELD)? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl From<Fields> for ApplicationRecord {
    fn from(fields: Fields) -> Self {
        Self::new(fields)
    }
}

/// One user review, tagged with the identifier of the app it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewRecord {
    fields: Fields,
}

impl ReviewRecord {
    /// Builds a review from its raw fields and sets the back-reference.
    ///
    /// An existing `appId` on the raw review is overwritten so the
    /// back-reference always names the owner.
    pub fn with_owner(mut fields: Fields, owner_id: &str) -> Self {
        fields.insert(APP_ID_FIELD.to_string(), Value::String(owner_id.to_string()));
        Self { fields }
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Identifier of the owning app.
    pub fn app_id(&self) -> Option<&str> {
        self.fields.get(APP_ID_FIELD).and_then(Value::as_str)
    }
}
