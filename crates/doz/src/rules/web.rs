//! Rules for web-shaped strings: email, URL and UUID.

use super::{list, type_mismatch};
use crate::message::Message;
use crate::outcome::Outcome;
use crate::traits::Rule;
use crate::value::Value;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use url::Url;

// Pre-compiled regex patterns
static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static UUID_V4_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

fn uuid_v4_regex() -> &'static Regex {
    UUID_V4_REGEX.get_or_init(|| {
        Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
            .unwrap()
    })
}

/// Email address: something, `@`, something, `.`, something, no whitespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmailRule;

impl Rule for EmailRule {
    fn check(&self, value: &Value) -> Outcome {
        let Some(text) = value.as_str() else {
            return type_mismatch(value, "string");
        };

        if email_regex().is_match(text) {
            Outcome::valid(value.clone())
        } else {
            Outcome::invalid(value.clone(), Message::field("must be valid email address"))
        }
    }

    fn rule_name(&self) -> &'static str {
        "email"
    }
}

/// Check `value` against [`EmailRule`].
pub fn email(value: &Value) -> Outcome {
    EmailRule.check(value)
}

/// Absolute URL, optionally restricted to a set of schemes.
///
/// The output is the parsed [`Url`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlRule {
    /// Allowed schemes without the trailing `:`, e.g. `["https"]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocols: Option<Vec<String>>,
}

impl UrlRule {
    /// Any scheme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only these schemes.
    pub fn protocols<S: Into<String>>(protocols: impl IntoIterator<Item = S>) -> Self {
        Self {
            protocols: Some(protocols.into_iter().map(Into::into).collect()),
        }
    }
}

impl Rule for UrlRule {
    fn check(&self, value: &Value) -> Outcome {
        let Some(text) = value.as_str() else {
            return type_mismatch(value, "string");
        };

        let url = match Url::parse(text) {
            Ok(url) => url,
            Err(_) => {
                return Outcome::invalid(value.clone(), Message::field("must be a valid URL"));
            }
        };

        if let Some(protocols) = &self.protocols {
            if !protocols.iter().any(|p| p == url.scheme()) {
                return Outcome::invalid(
                    value.clone(),
                    Message::field(format!(
                        "must use one of these protocols: {}",
                        list(protocols)
                    )),
                );
            }
        }

        Outcome::valid(url)
    }

    fn rule_name(&self) -> &'static str {
        "url"
    }
}

/// Check `value` against a [`UrlRule`].
pub fn url(value: &Value, rule: &UrlRule) -> Outcome {
    rule.check(value)
}

/// Hyphenated version 4 UUID, any letter case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Uuidv4Rule;

impl Rule for Uuidv4Rule {
    fn check(&self, value: &Value) -> Outcome {
        let Some(text) = value.as_str() else {
            return type_mismatch(value, "string");
        };

        if uuid_v4_regex().is_match(text) {
            Outcome::valid(value.clone())
        } else {
            Outcome::invalid(value.clone(), Message::field("must be a valid UUIDv4"))
        }
    }

    fn rule_name(&self) -> &'static str {
        "uuidv4"
    }
}

/// Check `value` against [`Uuidv4Rule`].
pub fn uuidv4(value: &Value) -> Outcome {
    Uuidv4Rule.check(value)
}
