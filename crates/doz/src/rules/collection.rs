//! Array rules.

use super::{list, type_mismatch};
use crate::message::Message;
use crate::outcome::Outcome;
use crate::traits::Rule;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Array with optional inclusive length bounds. A bound of `0` is honored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrayRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl ArrayRule {
    /// Any length.
    pub fn new() -> Self {
        Self::default()
    }

    /// Both length bounds, inclusive.
    pub fn between(min_length: usize, max_length: usize) -> Self {
        Self {
            min_length: Some(min_length),
            max_length: Some(max_length),
        }
    }

    /// Set the minimum length.
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Set the maximum length.
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }
}

impl Rule for ArrayRule {
    fn check(&self, value: &Value) -> Outcome {
        let Some(items) = value.as_array() else {
            return type_mismatch(value, "array");
        };

        if let Some(min) = self.min_length {
            if items.len() < min {
                return Outcome::invalid(
                    value.clone(),
                    Message::field(format!("length must be at least {min}")),
                );
            }
        }

        if let Some(max) = self.max_length {
            if items.len() > max {
                return Outcome::invalid(
                    value.clone(),
                    Message::field(format!("length must be at most {max}")),
                );
            }
        }

        Outcome::valid(value.clone())
    }

    fn rule_name(&self) -> &'static str {
        "array"
    }
}

/// Check `value` against an [`ArrayRule`].
pub fn array(value: &Value, rule: &ArrayRule) -> Outcome {
    rule.check(value)
}

/// Array containing every one of `items`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayIncludesRule {
    pub items: Vec<Value>,
}

impl ArrayIncludesRule {
    /// Items that must all be present.
    pub fn new<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}

impl Rule for ArrayIncludesRule {
    fn check(&self, value: &Value) -> Outcome {
        array_includes(value, &self.items)
    }

    fn rule_name(&self) -> &'static str {
        "array_includes"
    }
}

/// Every missing item is listed, in the order of `required`.
pub fn array_includes(value: &Value, required: &[Value]) -> Outcome {
    let Some(items) = value.as_array() else {
        return type_mismatch(value, "array");
    };

    let missing: Vec<&Value> = required.iter().filter(|r| !items.contains(*r)).collect();
    if missing.is_empty() {
        return Outcome::valid(value.clone());
    }

    Outcome::invalid(
        value.clone(),
        Message::field(format!("must include all of these items: {}", list(missing))),
    )
}

/// Array whose elements all pass `item`.
pub struct ArrayOfRule<'r> {
    item: Box<dyn Rule + 'r>,
}

impl<'r> ArrayOfRule<'r> {
    /// Apply `item` to every element.
    pub fn new(item: impl Rule + 'r) -> Self {
        Self {
            item: Box::new(item),
        }
    }
}

impl fmt::Debug for ArrayOfRule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayOfRule")
            .field("item", &self.item.rule_name())
            .finish()
    }
}

impl Rule for ArrayOfRule<'_> {
    fn check(&self, value: &Value) -> Outcome {
        array_of(value, self.item.as_ref())
    }

    fn rule_name(&self) -> &'static str {
        "array_of"
    }
}

/// Stops at the first failing element and reports
/// `"Item at index {i}: {message}"`. The nested message keeps its field slot,
/// so the outer field name lands in it.
pub fn array_of(value: &Value, item: &dyn Rule) -> Outcome {
    let Some(items) = value.as_array() else {
        return type_mismatch(value, "array");
    };

    for (index, element) in items.iter().enumerate() {
        if let Outcome::Invalid { message, .. } = item.check(element) {
            trace!(index, rule = item.rule_name(), "array element rejected");
            return Outcome::invalid(
                value.clone(),
                message.prefixed(format!("Item at index {index}: ")),
            );
        }
    }

    Outcome::valid(value.clone())
}
