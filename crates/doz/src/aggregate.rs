//! Folding per-field outcomes into one validation result.

use crate::error::ValidationFailed;
use crate::outcome::Outcome;
use crate::value::Map;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use tracing::{debug, trace};

/// Field name to already-evaluated outcome, in insertion order.
///
/// ## Example
///
/// ```
/// use doz::{aggregate, rules, ValidationRequest, Value};
///
/// let request = ValidationRequest::new()
///     .field("name", rules::string(&"John".into()))
///     .field("age", rules::number(&Value::from(25), &Default::default()));
///
/// let result = aggregate(&request);
/// assert!(result.is_valid());
/// assert_eq!(result.data().unwrap()["age"], Value::from(25));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationRequest {
    fields: IndexMap<String, Outcome>,
}

impl ValidationRequest {
    /// Empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ValidationRequest::insert`].
    pub fn field(mut self, name: impl Into<String>, outcome: Outcome) -> Self {
        self.insert(name, outcome);
        self
    }

    /// Add a field. An existing field keeps its position and gets the new
    /// outcome.
    pub fn insert(&mut self, name: impl Into<String>, outcome: Outcome) -> Option<Outcome> {
        self.fields.insert(name.into(), outcome)
    }

    /// Outcome recorded for `name`.
    pub fn get(&self, name: &str) -> Option<&Outcome> {
        self.fields.get(name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Outcome)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, Outcome)> for ValidationRequest {
    fn from_iter<I: IntoIterator<Item = (K, Outcome)>>(iter: I) -> Self {
        let mut request = Self::new();
        request.extend(iter);
        request
    }
}

impl<K: Into<String>> Extend<(K, Outcome)> for ValidationRequest {
    fn extend<I: IntoIterator<Item = (K, Outcome)>>(&mut self, iter: I) {
        for (name, outcome) in iter {
            self.insert(name, outcome);
        }
    }
}

impl From<IndexMap<String, Outcome>> for ValidationRequest {
    fn from(fields: IndexMap<String, Outcome>) -> Self {
        Self { fields }
    }
}

/// How the overall `valid` flag is derived from the per-field outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagPolicy {
    /// Every field overwrites the flag, so it reflects the last field only.
    /// An earlier failure is dropped when a later field passes.
    #[default]
    LastWins,
    /// Valid only when every field is valid.
    AllValid,
}

/// Aggregator settings, loadable from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    pub policy: FlagPolicy,
}

/// Outcome of a whole request.
///
/// Serializes as `{"valid":true,"data":{..}}` or
/// `{"valid":false,"exception":{..}}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// Every reported field with its rule output.
    Valid { data: Map },
    /// Failing fields with their resolved messages.
    Invalid { exception: IndexMap<String, String> },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid { .. })
    }

    pub fn data(&self) -> Option<&Map> {
        match self {
            ValidationResult::Valid { data } => Some(data),
            ValidationResult::Invalid { .. } => None,
        }
    }

    pub fn exception(&self) -> Option<&IndexMap<String, String>> {
        match self {
            ValidationResult::Valid { .. } => None,
            ValidationResult::Invalid { exception } => Some(exception),
        }
    }

    /// Switch to `Result` so a failure can be propagated with `?`.
    pub fn into_result(self) -> Result<Map, ValidationFailed> {
        match self {
            ValidationResult::Valid { data } => Ok(data),
            ValidationResult::Invalid { exception } => Err(ValidationFailed::new(exception)),
        }
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            ValidationResult::Valid { data } => {
                map.serialize_entry("valid", &true)?;
                map.serialize_entry("data", data)?;
            }
            ValidationResult::Invalid { exception } => {
                map.serialize_entry("valid", &false)?;
                map.serialize_entry("exception", exception)?;
            }
        }
        map.end()
    }
}

/// Folds a [`ValidationRequest`] into a [`ValidationResult`].
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    config: AggregatorConfig,
}

impl Aggregator {
    /// Aggregator with the default [`FlagPolicy::LastWins`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AggregatorConfig) -> Self {
        Self { config }
    }

    pub fn policy(mut self, policy: FlagPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Walk the request once in order. Valid fields land in `data`, failing
    /// fields in `exception` with the field name resolved into their message.
    /// The policy flag picks which of the two is returned.
    pub fn aggregate(&self, request: &ValidationRequest) -> ValidationResult {
        let mut data = Map::new();
        let mut exception = IndexMap::new();
        let mut valid = true;

        for (field, outcome) in request.iter() {
            let passed = match outcome {
                Outcome::Valid { value } => {
                    data.insert(field.to_string(), value.clone());
                    true
                }
                Outcome::Invalid { message, .. } => {
                    exception.insert(field.to_string(), message.resolve(field));
                    false
                }
            };
            trace!(field, valid = passed, "field aggregated");

            valid = match self.config.policy {
                FlagPolicy::LastWins => passed,
                FlagPolicy::AllValid => valid && passed,
            };
        }

        debug!(
            fields = request.len(),
            failed = exception.len(),
            valid,
            policy = ?self.config.policy,
            "validation aggregated"
        );

        if valid {
            ValidationResult::Valid { data }
        } else {
            ValidationResult::Invalid { exception }
        }
    }
}

/// Aggregate with the default policy.
pub fn aggregate(request: &ValidationRequest) -> ValidationResult {
    Aggregator::new().aggregate(request)
}

/// Constructor-style entry point: `Validation::new(&request).result`.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub result: ValidationResult,
}

impl Validation {
    pub fn new(request: &ValidationRequest) -> Self {
        Self {
            result: aggregate(request),
        }
    }

    pub fn into_result(self) -> ValidationResult {
        self.result
    }
}

impl From<ValidationRequest> for Validation {
    fn from(request: ValidationRequest) -> Self {
        Self::new(&request)
    }
}
