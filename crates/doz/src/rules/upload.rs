//! Upload rules: file metadata, MIME types and multi-value forms.

use super::{list, type_mismatch};
use crate::message::Message;
use crate::outcome::Outcome;
use crate::traits::Rule;
use crate::value::{display_number, FileInfo, Map, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

fn as_file(value: &Value) -> Result<&FileInfo, Outcome> {
    value.as_file().ok_or_else(|| type_mismatch(value, "a File"))
}

/// Uploaded file with an optional size cap and extension allow-list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRule {
    /// Size cap in bytes. `0` counts as unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size_in_bytes: Option<u64>,
    /// Extensions without the dot, compared case-insensitively
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_extensions: Option<Vec<String>>,
}

impl FileRule {
    /// No size cap and any extension.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject files larger than `bytes`.
    pub fn max_size_in_bytes(mut self, bytes: u64) -> Self {
        self.max_size_in_bytes = Some(bytes);
        self
    }

    /// Accept only these extensions.
    pub fn allowed_extensions<S: Into<String>>(
        mut self,
        extensions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.allowed_extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }
}

impl Rule for FileRule {
    fn check(&self, value: &Value) -> Outcome {
        let file = match as_file(value) {
            Ok(file) => file,
            Err(outcome) => return outcome,
        };

        if let Some(max) = self.max_size_in_bytes.filter(|max| *max > 0) {
            if file.size > max {
                return Outcome::invalid(
                    value.clone(),
                    Message::field(format!(
                        "size must be less than {}MB",
                        display_number(max as f64 / BYTES_PER_MB)
                    )),
                );
            }
        }

        if let Some(allowed) = &self.allowed_extensions {
            let accepted = file
                .extension()
                .is_some_and(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)));
            if !accepted {
                return Outcome::invalid(
                    value.clone(),
                    Message::field(format!(
                        "must have one of these extensions: {}",
                        list(allowed)
                    )),
                );
            }
        }

        Outcome::valid(value.clone())
    }

    fn rule_name(&self) -> &'static str {
        "file"
    }
}

/// Check `value` against a [`FileRule`].
pub fn file(value: &Value, rule: &FileRule) -> Outcome {
    rule.check(value)
}

/// File whose declared content type is in `allowed`, compared exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MimeRule {
    pub allowed: Vec<String>,
}

impl MimeRule {
    /// Allow-list of exact content types.
    pub fn new<S: Into<String>>(allowed: impl IntoIterator<Item = S>) -> Self {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl Rule for MimeRule {
    fn check(&self, value: &Value) -> Outcome {
        let file = match as_file(value) {
            Ok(file) => file,
            Err(outcome) => return outcome,
        };

        if self.allowed.iter().any(|mime| *mime == file.content_type) {
            return Outcome::valid(value.clone());
        }

        Outcome::invalid(
            value.clone(),
            Message::field(format!(
                "must be one of these MIME types: {}",
                list(&self.allowed)
            )),
        )
    }

    fn rule_name(&self) -> &'static str {
        "mime"
    }
}

/// Check that `value` is a file with one of the `allowed` content types.
pub fn mime(value: &Value, allowed: &[&str]) -> Outcome {
    MimeRule::new(allowed.iter().copied()).check(value)
}

/// Form whose declared keys each pass their own rule.
///
/// Each rule sees the first entry stored under its key, or an empty string
/// when the key is absent. Entries are text or files, so numeric fields
/// need a closure that parses before calling [`number`](super::number).
/// On success the output is an object of the nested outputs.
///
/// Failures name the key in place of the field and are joined with `"; "`,
/// e.g. `"age must be number; email must be valid email address"`.
#[derive(Default)]
pub struct FormDataRule<'r> {
    fields: Vec<(String, Box<dyn Rule + 'r>)>,
}

impl<'r> FormDataRule<'r> {
    /// Form rule with no declared keys.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Declare `key` and the rule its entry must pass.
    pub fn field(mut self, key: impl Into<String>, rule: impl Rule + 'r) -> Self {
        self.fields.push((key.into(), Box::new(rule)));
        self
    }
}

impl fmt::Debug for FormDataRule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.fields.iter().map(|(k, r)| (k, r.rule_name())))
            .finish()
    }
}

impl Rule for FormDataRule<'_> {
    fn check(&self, value: &Value) -> Outcome {
        check_form(
            value,
            self.fields.iter().map(|(key, rule)| (key.as_str(), rule.as_ref())),
        )
    }

    fn rule_name(&self) -> &'static str {
        "form_data"
    }
}

/// Check a [`FormData`](crate::FormData) value entry by entry.
pub fn form_data(value: &Value, fields: &[(&str, &dyn Rule)]) -> Outcome {
    check_form(value, fields.iter().map(|(key, rule)| (*key, *rule)))
}

fn check_form<'a>(value: &Value, fields: impl Iterator<Item = (&'a str, &'a dyn Rule)>) -> Outcome {
    let Some(form) = value.as_form() else {
        return type_mismatch(value, "FormData");
    };

    let mut output = Map::new();
    let mut errors = Vec::new();
    for (key, rule) in fields {
        let entry = form
            .get(key)
            .map_or_else(|| Value::String(String::new()), Value::from);
        match rule.check(&entry) {
            Outcome::Valid { value } => {
                output.insert(key.to_string(), value);
            }
            Outcome::Invalid { message, .. } => {
                trace!(key, rule = rule.rule_name(), "form entry rejected");
                errors.push(message.bind(key));
            }
        }
    }

    if errors.is_empty() {
        Outcome::valid(output)
    } else {
        Outcome::invalid(value.clone(), Message::join(errors, "; "))
    }
}
