//! Field-agnostic error message templates.
//!
//! A rule does not know which field it validates, so its failure message is a
//! [`Message`]: literal text with slots where the field name goes. The
//! aggregator fills the slots once the field name is known. Literal text is
//! never rewritten, so a `$` inside a nested message stays a `$`.

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Text(String),
    Field,
}

/// Error message template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Message {
    segments: Vec<Segment>,
}

impl Message {
    /// `"<field> {text}"`, the shape of every simple rule failure.
    ///
    /// ```
    /// use doz::Message;
    ///
    /// let msg = Message::field("must be string");
    /// assert_eq!(msg.resolve("name"), "name must be string");
    /// ```
    pub fn field(text: impl AsRef<str>) -> Self {
        let mut message = Self::default();
        message.push_field();
        message.push_text(" ");
        message.push_text(text.as_ref());
        message
    }

    /// Literal text without a slot.
    pub fn text(text: impl Into<String>) -> Self {
        let mut message = Self::default();
        message.push_text(text.into());
        message
    }

    /// Parse a caller-supplied template where the first `$` marks the field
    /// slot. Any later `$` is kept as text.
    pub fn parse(template: &str) -> Self {
        let mut message = Self::default();
        match template.split_once('$') {
            Some((before, after)) => {
                message.push_text(before);
                message.push_field();
                message.push_text(after);
            }
            None => message.push_text(template),
        }
        message
    }

    /// Prepend literal text, keeping the slots of `self`.
    pub fn prefixed(self, prefix: impl Into<String>) -> Self {
        let mut message = Self::text(prefix);
        message.extend(self);
        message
    }

    /// Fill every slot with `name`. The result has no slots left.
    pub fn bind(&self, name: &str) -> Self {
        Self::text(self.resolve(name))
    }

    /// Concatenate messages with a literal separator.
    pub fn join(messages: impl IntoIterator<Item = Message>, separator: &str) -> Self {
        let mut joined = Self::default();
        for (i, message) in messages.into_iter().enumerate() {
            if i > 0 {
                joined.push_text(separator);
            }
            joined.extend(message);
        }
        joined
    }

    /// Render the final string with every slot replaced by `field`.
    pub fn resolve(&self, field: &str) -> String {
        self.render(field)
    }

    /// Render with slots written as `$`, the conventional placeholder.
    pub fn template(&self) -> String {
        self.render("$")
    }

    pub fn has_slot(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Field))
    }

    fn render(&self, field: &str) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.as_str(),
                Segment::Field => field,
            })
            .collect()
    }

    fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(Segment::Text(last)) => last.push_str(&text),
            _ => self.segments.push(Segment::Text(text)),
        }
    }

    fn push_field(&mut self) {
        self.segments.push(Segment::Field);
    }

    fn extend(&mut self, other: Message) {
        for segment in other.segments {
            match segment {
                Segment::Text(text) => self.push_text(text),
                Segment::Field => self.push_field(),
            }
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template())
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.template())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_message_resolves() {
        let msg = Message::field("must be less than 100");
        assert_eq!(msg.resolve("age"), "age must be less than 100");
        assert_eq!(msg.template(), "$ must be less than 100");
        assert!(msg.has_slot());
    }

    #[test]
    fn parse_uses_first_dollar_only() {
        let msg = Message::parse("$ costs $5");
        assert_eq!(msg.resolve("item"), "item costs $5");
    }

    #[test]
    fn parse_without_dollar_is_literal() {
        let msg = Message::parse("Bad input");
        assert!(!msg.has_slot());
        assert_eq!(msg.resolve("x"), "Bad input");
    }

    #[test]
    fn literal_dollar_is_never_substituted() {
        let msg = Message::text("price must include $");
        assert_eq!(msg.resolve("total"), "price must include $");
    }

    #[test]
    fn prefixed_keeps_slot() {
        let msg = Message::field("must be number").prefixed("Item at index 1: ");
        assert_eq!(msg.resolve("numbers"), "Item at index 1: numbers must be number");
    }

    #[test]
    fn bind_removes_slot() {
        let msg = Message::field("must be string").bind("name");
        assert!(!msg.has_slot());
        assert_eq!(msg.resolve("user"), "name must be string");
    }

    #[test]
    fn join_with_separator() {
        let joined = Message::join(
            [Message::text("a: first"), Message::text("b: second")],
            "; ",
        );
        assert_eq!(joined.resolve("ignored"), "a: first; b: second");
    }

    #[test]
    fn adjacent_text_is_merged() {
        let msg = Message::text("a").prefixed("b");
        assert_eq!(msg, Message::text("ba"));
    }
}
