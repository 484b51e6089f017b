//! Result of applying one rule to one value.

use crate::message::Message;
use crate::value::Value;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Outcome of a single rule evaluation.
///
/// A valid outcome carries the rule's output, which may differ from the input
/// (date rules parse, the url rule parses, composites rebuild their output).
/// An invalid outcome carries the rejected input and a [`Message`] whose slot
/// is filled with the field name during aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Valid { value: Value },
    Invalid { raw_input: Value, message: Message },
}

impl Outcome {
    pub fn valid(value: impl Into<Value>) -> Self {
        Outcome::Valid {
            value: value.into(),
        }
    }

    pub fn invalid(raw_input: impl Into<Value>, message: Message) -> Self {
        Outcome::Invalid {
            raw_input: raw_input.into(),
            message,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Outcome::Valid { .. })
    }

    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// Output value of a valid outcome.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Outcome::Valid { value } => Some(value),
            Outcome::Invalid { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&Message> {
        match self {
            Outcome::Valid { .. } => None,
            Outcome::Invalid { message, .. } => Some(message),
        }
    }

    /// Input a rule rejected.
    pub fn raw_input(&self) -> Option<&Value> {
        match self {
            Outcome::Valid { .. } => None,
            Outcome::Invalid { raw_input, .. } => Some(raw_input),
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Outcome::Valid { value } => Some(value),
            Outcome::Invalid { .. } => None,
        }
    }

    pub fn into_result(self) -> Result<Value, Message> {
        match self {
            Outcome::Valid { value } => Ok(value),
            Outcome::Invalid { message, .. } => Err(message),
        }
    }
}

/// Serializes as `{"ok":true,"value":..}` or
/// `{"ok":false,"rawInput":..,"messageTemplate":..}`.
impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Valid { value } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("ok", &true)?;
                map.serialize_entry("value", value)?;
                map.end()
            }
            Outcome::Invalid { raw_input, message } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("ok", &false)?;
                map.serialize_entry("rawInput", raw_input)?;
                map.serialize_entry("messageTemplate", message)?;
                map.end()
            }
        }
    }
}
