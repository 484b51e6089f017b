//! Scalar rules: string, number, boolean and custom patterns.

use super::type_mismatch;
use crate::message::Message;
use crate::outcome::Outcome;
use crate::traits::Rule;
use crate::value::{display_number, Value};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Non-empty string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringRule;

impl Rule for StringRule {
    fn check(&self, value: &Value) -> Outcome {
        match value {
            Value::String(s) if s.is_empty() => {
                Outcome::invalid(value.clone(), Message::field("cannot be empty"))
            }
            Value::String(_) => Outcome::valid(value.clone()),
            _ => type_mismatch(value, "string"),
        }
    }

    fn rule_name(&self) -> &'static str {
        "string"
    }
}

/// Check `value` against [`StringRule`].
pub fn string(value: &Value) -> Outcome {
    StringRule.check(value)
}

/// Numeric value with optional inclusive bounds.
///
/// Only [`Value::Number`] passes. Strings such as `"25"` are rejected, so
/// callers holding text (form entries, query strings) parse it first.
/// A bound of `0` (or `NaN`) counts as unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberRule {
    /// Minimum value (inclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Maximum value (inclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl NumberRule {
    /// Unbounded number rule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Both bounds, inclusive.
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Lower bound only.
    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// Upper bound only.
    pub fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }
}

// zero and NaN bounds are ignored
fn bound(limit: Option<f64>) -> Option<f64> {
    limit.filter(|l| *l != 0.0 && !l.is_nan())
}

impl Rule for NumberRule {
    fn check(&self, value: &Value) -> Outcome {
        let n = match value {
            Value::Number(n) if !n.is_nan() => *n,
            _ => return type_mismatch(value, "number"),
        };

        if let Some(min) = bound(self.min) {
            if n < min {
                return Outcome::invalid(
                    value.clone(),
                    Message::field(format!("must be greater than {}", display_number(min))),
                );
            }
        }

        if let Some(max) = bound(self.max) {
            if n > max {
                return Outcome::invalid(
                    value.clone(),
                    Message::field(format!("must be less than {}", display_number(max))),
                );
            }
        }

        Outcome::valid(n)
    }

    fn rule_name(&self) -> &'static str {
        "number"
    }
}

/// Check `value` against a [`NumberRule`].
pub fn number(value: &Value, rule: &NumberRule) -> Outcome {
    rule.check(value)
}

/// Strict boolean, no truthiness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BooleanRule;

impl Rule for BooleanRule {
    fn check(&self, value: &Value) -> Outcome {
        match value {
            Value::Bool(_) => Outcome::valid(value.clone()),
            _ => type_mismatch(value, "boolean"),
        }
    }

    fn rule_name(&self) -> &'static str {
        "boolean"
    }
}

/// Check `value` against [`BooleanRule`].
pub fn boolean(value: &Value) -> Outcome {
    BooleanRule.check(value)
}

/// String matching a caller-supplied pattern.
#[derive(Debug, Clone)]
pub struct RegexRule {
    pattern: Regex,
    message: Option<Message>,
}

impl RegexRule {
    /// Rule with the default failure message.
    pub fn new(pattern: Regex) -> Self {
        Self {
            pattern,
            message: None,
        }
    }

    /// Compile `pattern` first.
    pub fn from_pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::new)
    }

    /// Custom failure message. The first `$` in `template` is where the
    /// field name goes.
    pub fn with_message(mut self, template: &str) -> Self {
        self.message = Some(Message::parse(template));
        self
    }

    /// The compiled pattern.
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

impl Rule for RegexRule {
    fn check(&self, value: &Value) -> Outcome {
        let Some(text) = value.as_str() else {
            return type_mismatch(value, "string");
        };

        if self.pattern.is_match(text) {
            return Outcome::valid(value.clone());
        }

        let message = self
            .message
            .clone()
            .unwrap_or_else(|| Message::field("does not match required pattern"));
        Outcome::invalid(value.clone(), message)
    }

    fn rule_name(&self) -> &'static str {
        "regex"
    }
}

/// Match `value` against `pattern`, with an optional `$` message template.
pub fn regex(value: &Value, pattern: &Regex, message: Option<&str>) -> Outcome {
    let rule = RegexRule::new(pattern.clone());
    match message {
        Some(template) => rule.with_message(template).check(value),
        None => rule.check(value),
    }
}
