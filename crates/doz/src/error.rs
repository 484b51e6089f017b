//! Validation failure type and its JSON error format.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single field failure as rendered in the API error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrorResponse {
    /// The field name that failed validation
    pub field: String,
    /// Resolved message, field name already substituted
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    pub fields: Vec<FieldErrorResponse>,
}

/// Serializable error body:
///
/// ```json
/// {
///   "error": {
///     "type": "validation_error",
///     "message": "Validation failed",
///     "fields": [{"field": "age", "message": "age must be number"}]
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiValidationError {
    pub error: ErrorBody,
}

/// Failed validation as a [`std::error::Error`], for callers that want to
/// propagate an invalid result with `?`.
///
/// Holds the `exception` map of an invalid result: field name to resolved
/// message, in request order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Validation failed: {} field error(s)", .fields.len())]
pub struct ValidationFailed {
    fields: IndexMap<String, String>,
}

impl ValidationFailed {
    pub fn new(fields: IndexMap<String, String>) -> Self {
        Self { fields }
    }

    /// Field name to message.
    pub fn fields(&self) -> &IndexMap<String, String> {
        &self.fields
    }

    /// Message for `field`, if it failed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_fields(self) -> IndexMap<String, String> {
        self.fields
    }

    /// Render as the structured API error body.
    pub fn to_api_error(&self) -> ApiValidationError {
        ApiValidationError {
            error: ErrorBody {
                error_type: "validation_error".to_string(),
                message: "Validation failed".to_string(),
                fields: self
                    .fields
                    .iter()
                    .map(|(field, message)| FieldErrorResponse {
                        field: field.clone(),
                        message: message.clone(),
                    })
                    .collect(),
            },
        }
    }
}

impl Serialize for ValidationFailed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_api_error().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ValidationFailed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let api = ApiValidationError::deserialize(deserializer)?;
        Ok(Self::new(
            api.error
                .fields
                .into_iter()
                .map(|f| (f.field, f.message))
                .collect(),
        ))
    }
}
