//! Password strength rule.

use super::type_mismatch;
use crate::message::Message;
use crate::outcome::Outcome;
use crate::traits::Rule;
use crate::value::Value;
use serde::{Deserialize, Serialize};

const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Password policy.
///
/// Checks run in order and the first failure wins: length bounds, then
/// uppercase, lowercase, digit and special character. Lengths count
/// characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordRule {
    pub min_length: usize,
    pub max_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_numbers: bool,
    pub require_special_chars: bool,
}

impl Default for PasswordRule {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 100,
            require_uppercase: true,
            require_lowercase: true,
            require_numbers: true,
            require_special_chars: true,
        }
    }
}

impl PasswordRule {
    /// The default policy: 8 to 100 characters with every character class.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum length.
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = min;
        self
    }

    /// Set the maximum length.
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = max;
        self
    }

    /// Toggle the uppercase requirement.
    pub fn require_uppercase(mut self, required: bool) -> Self {
        self.require_uppercase = required;
        self
    }

    /// Toggle the lowercase requirement.
    pub fn require_lowercase(mut self, required: bool) -> Self {
        self.require_lowercase = required;
        self
    }

    /// Toggle the digit requirement.
    pub fn require_numbers(mut self, required: bool) -> Self {
        self.require_numbers = required;
        self
    }

    /// Toggle the special character requirement.
    pub fn require_special_chars(mut self, required: bool) -> Self {
        self.require_special_chars = required;
        self
    }

    fn first_violation(&self, password: &str) -> Option<Message> {
        let len = password.chars().count();
        if len < self.min_length {
            return Some(Message::field(format!(
                "must be at least {} characters",
                self.min_length
            )));
        }
        if len > self.max_length {
            return Some(Message::field(format!(
                "must be at most {} characters",
                self.max_length
            )));
        }

        let classes: [(bool, fn(char) -> bool, &str); 4] = [
            (self.require_uppercase, |c| c.is_ascii_uppercase(), "uppercase letter"),
            (self.require_lowercase, |c| c.is_ascii_lowercase(), "lowercase letter"),
            (self.require_numbers, |c| c.is_ascii_digit(), "number"),
            (self.require_special_chars, |c| SPECIAL_CHARS.contains(c), "special character"),
        ];

        classes
            .into_iter()
            .find(|(required, matches, _)| *required && !password.chars().any(*matches))
            .map(|(_, _, name)| Message::field(format!("must contain at least one {name}")))
    }
}

impl Rule for PasswordRule {
    fn check(&self, value: &Value) -> Outcome {
        let Some(password) = value.as_str() else {
            return type_mismatch(value, "string");
        };

        match self.first_violation(password) {
            Some(message) => Outcome::invalid(value.clone(), message),
            None => Outcome::valid(value.clone()),
        }
    }

    fn rule_name(&self) -> &'static str {
        "password"
    }
}

/// Check `value` against a [`PasswordRule`].
pub fn password(value: &Value, rule: &PasswordRule) -> Outcome {
    rule.check(value)
}
