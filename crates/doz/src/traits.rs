//! The rule abstraction shared by every validator and by composite rules.

use crate::outcome::Outcome;
use crate::value::Value;

/// A validation rule: inspects one value and produces an [`Outcome`].
///
/// Rules are pure. Composite rules (`array_of`, `shape`, `form_data`) accept
/// nested rules as `&dyn Rule` or `Box<dyn Rule>`, and any closure
/// `Fn(&Value) -> Outcome` is a rule, so catalog functions can be passed
/// directly:
///
/// ```
/// use doz::{rules, Outcome, Rule, Value};
///
/// let positive = |v: &Value| match v.as_f64() {
///     Some(n) if n > 0.0 => Outcome::valid(n),
///     _ => Outcome::invalid(v.clone(), doz::Message::field("must be positive")),
/// };
///
/// let outcome = rules::array_of(&Value::array([1, 2, 3]), &positive);
/// assert!(outcome.is_valid());
/// assert!(rules::string.check(&Value::from("ok")).is_valid());
/// ```
pub trait Rule: Send + Sync {
    /// Validate `value`.
    fn check(&self, value: &Value) -> Outcome;

    /// Rule name for logs.
    fn rule_name(&self) -> &'static str {
        "custom"
    }
}

impl<F> Rule for F
where
    F: Fn(&Value) -> Outcome + Send + Sync,
{
    fn check(&self, value: &Value) -> Outcome {
        self(value)
    }
}
