//! Object rules: plain objects, required keys, per-key shapes and runtime
//! classes.

use super::{keyed_failure, list, type_mismatch};
use crate::message::Message;
use crate::outcome::Outcome;
use crate::traits::Rule;
use crate::value::{Class, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Plain object: not an array, not null.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectRule;

impl Rule for ObjectRule {
    fn check(&self, value: &Value) -> Outcome {
        match value {
            Value::Object(_) => Outcome::valid(value.clone()),
            _ => type_mismatch(value, "object"),
        }
    }

    fn rule_name(&self) -> &'static str {
        "object"
    }
}

/// Check `value` against [`ObjectRule`].
pub fn object(value: &Value) -> Outcome {
    ObjectRule.check(value)
}

/// Object that has every one of `properties` as a key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HasPropertiesRule {
    pub properties: Vec<String>,
}

impl HasPropertiesRule {
    /// Keys that must be present.
    pub fn new<S: Into<String>>(properties: impl IntoIterator<Item = S>) -> Self {
        Self {
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }
}

impl Rule for HasPropertiesRule {
    fn check(&self, value: &Value) -> Outcome {
        let Some(map) = value.as_object() else {
            return type_mismatch(value, "object");
        };

        let missing: Vec<&String> = self
            .properties
            .iter()
            .filter(|p| !map.contains_key(p.as_str()))
            .collect();
        if missing.is_empty() {
            return Outcome::valid(value.clone());
        }

        Outcome::invalid(
            value.clone(),
            Message::field(format!(
                "must have all of these properties: {}",
                list(missing)
            )),
        )
    }

    fn rule_name(&self) -> &'static str {
        "has_properties"
    }
}

/// Check that `value` is an object holding every key in `properties`.
pub fn has_properties(value: &Value, properties: &[&str]) -> Outcome {
    HasPropertiesRule::new(properties.iter().copied()).check(value)
}

/// Object whose declared keys each pass their own rule.
///
/// Unlike the other composites this one does not stop at the first problem:
/// every declared key is checked and all failures are joined with `"; "`.
#[derive(Default)]
pub struct ShapeRule<'r> {
    fields: Vec<(String, Box<dyn Rule + 'r>)>,
}

impl<'r> ShapeRule<'r> {
    /// Shape with no declared keys.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Declare `key` with its rule. Declaration order is reporting order.
    pub fn field(mut self, key: impl Into<String>, rule: impl Rule + 'r) -> Self {
        self.fields.push((key.into(), Box::new(rule)));
        self
    }
}

impl fmt::Debug for ShapeRule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.fields.iter().map(|(k, r)| (k, r.rule_name())))
            .finish()
    }
}

impl Rule for ShapeRule<'_> {
    fn check(&self, value: &Value) -> Outcome {
        check_shape(
            value,
            self.fields.iter().map(|(key, rule)| (key.as_str(), rule.as_ref())),
        )
    }

    fn rule_name(&self) -> &'static str {
        "shape"
    }
}

/// Check an object key by key, accumulating every failure.
pub fn shape(value: &Value, fields: &[(&str, &dyn Rule)]) -> Outcome {
    check_shape(value, fields.iter().map(|(key, rule)| (*key, *rule)))
}

fn check_shape<'a>(
    value: &Value,
    fields: impl Iterator<Item = (&'a str, &'a dyn Rule)>,
) -> Outcome {
    let Some(map) = value.as_object() else {
        return type_mismatch(value, "object");
    };

    let mut errors = Vec::new();
    for (key, rule) in fields {
        let Some(property) = map.get(key) else {
            errors.push(Message::text(format!("Missing required property: {key}")));
            continue;
        };

        if let Outcome::Invalid { message, .. } = rule.check(property) {
            trace!(key, rule = rule.rule_name(), "shape property rejected");
            errors.push(keyed_failure(key, &message));
        }
    }

    if errors.is_empty() {
        Outcome::valid(value.clone())
    } else {
        Outcome::invalid(value.clone(), Message::join(errors, "; "))
    }
}

/// Value belonging to at least one of `classes`.
///
/// Scalars count as instances of their built-in class: `42` passes
/// [`Class::NUMBER`] and `"42"` passes [`Class::STRING`]. Use
/// [`Class::of`] to require a wrapped [`Instance`](crate::Instance).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceOfRule {
    pub classes: Vec<Class>,
}

impl InstanceOfRule {
    /// Accept members of any of `classes`.
    pub fn new(classes: impl IntoIterator<Item = Class>) -> Self {
        Self {
            classes: classes.into_iter().collect(),
        }
    }
}

impl Rule for InstanceOfRule {
    fn check(&self, value: &Value) -> Outcome {
        instance_of(value, &self.classes)
    }

    fn rule_name(&self) -> &'static str {
        "instance_of"
    }
}

/// Check that `value` belongs to one of `classes`.
pub fn instance_of(value: &Value, classes: &[Class]) -> Outcome {
    if classes.iter().any(|class| class.matches(value)) {
        return Outcome::valid(value.clone());
    }

    let names: Vec<&str> = classes.iter().map(Class::name).collect();
    Outcome::invalid(
        value.clone(),
        Message::field(format!("must be instance of {}", names.join(" or "))),
    )
}
