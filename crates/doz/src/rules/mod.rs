//! The rule catalog.
//!
//! Every rule exists twice: as a configured struct implementing [`Rule`] and
//! as a catalog function taking the value plus its options. Catalog functions
//! with no options (`string`, `boolean`, ...) are themselves rules and can be
//! handed to the composite rules.
//!
//! [`Rule`]: crate::Rule

mod collection;
mod object;
mod password;
mod primitive;
mod temporal;
mod upload;
mod web;

pub use collection::*;
pub use object::*;
pub use password::*;
pub use primitive::*;
pub use temporal::*;
pub use upload::*;
pub use web::*;

use crate::message::Message;
use crate::outcome::Outcome;
use crate::value::Value;

/// `"<field> must be {expected}"` for an input of the wrong type.
pub(crate) fn type_mismatch(value: &Value, expected: &str) -> Outcome {
    Outcome::invalid(value.clone(), Message::field(format!("must be {expected}")))
}

/// Per-key failure of `shape`: `"{key}: {message}"` with
/// the nested slot filled by the key.
pub(crate) fn keyed_failure(key: &str, message: &Message) -> Message {
    message.bind(key).prefixed(format!("{key}: "))
}

/// Items listed in a message, comma separated.
pub(crate) fn list<T: std::fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
