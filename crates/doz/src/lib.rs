//! # Doz
//!
//! Declarative field validation. Doz has two parts:
//!
//! - a catalog of pure rules ([`rules`]), each turning one [`Value`] into an
//!   [`Outcome`]: either the output value, or the rejected
//!   input plus a field-agnostic [`Message`];
//! - an aggregator that folds a [`ValidationRequest`] of named outcomes into
//!   one [`ValidationResult`], resolving the field names into the messages.
//!
//! ## Example
//!
//! ```rust
//! use doz::prelude::*;
//!
//! let input = Value::from(serde_json::json!({
//!     "name": "John",
//!     "email": "not-an-email",
//!     "age": 25,
//! }));
//! let form = input.as_object().unwrap();
//!
//! let request = ValidationRequest::new()
//!     .field("name", rules::string(&form["name"]))
//!     .field("email", rules::email(&form["email"]))
//!     .field("age", rules::number(&form["age"], &NumberRule::between(18.0, 120.0)));
//!
//! let result = Aggregator::new()
//!     .policy(FlagPolicy::AllValid)
//!     .aggregate(&request);
//!
//! assert_eq!(
//!     result.exception().unwrap()["email"],
//!     "email must be valid email address"
//! );
//! ```
//!
//! ## Result Format
//!
//! ```json
//! {"valid": true, "data": {"name": "John", "age": 25}}
//! {"valid": false, "exception": {"email": "email must be valid email address"}}
//! ```
//!
//! [`ValidationResult::into_result`] turns a failure into a
//! [`ValidationFailed`] error, which renders the structured API body:
//!
//! ```json
//! {
//!   "error": {
//!     "type": "validation_error",
//!     "message": "Validation failed",
//!     "fields": [{"field": "email", "message": "email must be valid email address"}]
//!   }
//! }
//! ```
//!
//! ## Flag Policy
//!
//! By default the overall `valid` flag follows the *last* field of the
//! request ([`FlagPolicy::LastWins`]). Use [`FlagPolicy::AllValid`] to require
//! every field to pass.

mod aggregate;
pub mod error;
mod message;
mod outcome;
pub mod rules;
mod traits;
mod value;


pub use aggregate::{
    aggregate, Aggregator, AggregatorConfig, FlagPolicy, Validation, ValidationRequest,
    ValidationResult,
};
pub use error::{ApiValidationError, ValidationFailed};
pub use message::Message;
pub use outcome::Outcome;
pub use traits::Rule;
pub use value::{Class, FileInfo, FormData, FormEntry, Instance, Map, Value};

/// Prelude module for validation
pub mod prelude {
    pub use crate::aggregate::{
        aggregate, Aggregator, FlagPolicy, Validation, ValidationRequest, ValidationResult,
    };
    pub use crate::error::ValidationFailed;
    pub use crate::message::Message;
    pub use crate::outcome::Outcome;
    pub use crate::rules::{
        self, ArrayIncludesRule, ArrayOfRule, ArrayRule, BooleanRule, DateBetweenRule, DateRule,
        EmailRule, FileRule, FormDataRule, HasPropertiesRule, InstanceOfRule, MimeRule,
        NumberRule, ObjectRule, PasswordRule, RegexRule, ShapeRule, StringRule, UrlRule,
        Uuidv4Rule,
    };
    pub use crate::traits::Rule;
    pub use crate::value::{Class, FileInfo, FormData, FormEntry, Instance, Value};
}
