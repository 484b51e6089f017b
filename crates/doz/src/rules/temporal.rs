//! Date rules.
//!
//! Accepted inputs are a [`Value::Date`], a number of milliseconds since the
//! Unix epoch, or a string in one of the common layouts: RFC 3339, RFC 2822,
//! `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS[.fff]]`, `YYYY-MM` and `YYYY`. Layouts
//! without an offset are read as UTC.

use crate::message::Message;
use crate::outcome::Outcome;
use crate::traits::Rule;
use crate::value::{iso_timestamp, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

const NAIVE_DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a value into an instant, `None` when it is not a date.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Date(date) => Some(*date),
        Value::Number(millis) if millis.is_finite() => {
            DateTime::from_timestamp_millis(millis.trunc() as i64)
        }
        Value::String(text) => parse_date_str(text.trim()),
        _ => None,
    }
}

fn parse_date_str(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(text) {
        return Some(date.with_timezone(&Utc));
    }
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(date) = NaiveDateTime::parse_from_str(text, format) {
            return Some(date.and_utc());
        }
    }

    let day = match text.len() {
        10 => NaiveDate::parse_from_str(text, "%Y-%m-%d").ok(),
        7 => NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d").ok(),
        4 if text.bytes().all(|b| b.is_ascii_digit()) => {
            text.parse().ok().and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
        }
        _ => None,
    }?;
    day.and_hms_opt(0, 0, 0).map(|midnight| midnight.and_utc())
}

/// Any parseable date. The output is a [`Value::Date`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRule;

impl Rule for DateRule {
    fn check(&self, value: &Value) -> Outcome {
        match parse_date(value) {
            Some(date) => Outcome::valid(date),
            None => Outcome::invalid(value.clone(), Message::field("must be valid date")),
        }
    }

    fn rule_name(&self) -> &'static str {
        "date"
    }
}

/// Check `value` against [`DateRule`].
pub fn date(value: &Value) -> Outcome {
    DateRule.check(value)
}

/// Date inside an inclusive `[start, end]` window.
///
/// Bounds take the same inputs as the value. An input that is not a date
/// fails with the plain date rule outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateBetweenRule {
    pub start: Value,
    pub end: Value,
}

impl DateBetweenRule {
    /// Inclusive range; either end may be any date-like value.
    pub fn new(start: impl Into<Value>, end: impl Into<Value>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

impl Rule for DateBetweenRule {
    fn check(&self, value: &Value) -> Outcome {
        let date = match DateRule.check(value) {
            Outcome::Valid {
                value: Value::Date(date),
            } => date,
            other => return other,
        };

        let (Some(start), Some(end)) = (parse_date(&self.start), parse_date(&self.end)) else {
            return Outcome::invalid(
                value.clone(),
                Message::text("Invalid start or end date provided"),
            );
        };

        if date < start || date > end {
            return Outcome::invalid(
                value.clone(),
                Message::field(format!(
                    "must be between {} and {}",
                    iso_timestamp(&start),
                    iso_timestamp(&end)
                )),
            );
        }

        Outcome::valid(date)
    }

    fn rule_name(&self) -> &'static str {
        "date_between"
    }
}

/// Check `value` against a [`DateBetweenRule`].
pub fn date_between(value: &Value, rule: &DateBetweenRule) -> Outcome {
    rule.check(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn template(outcome: &Outcome) -> String {
        outcome.message().map(Message::template).unwrap_or_default()
    }

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn parses_common_layouts() {
        assert_eq!(parse_date(&"2000-01-01".into()), Some(utc(2000, 1, 1)));
        assert_eq!(
            parse_date(&"2022-03-04T05:06:07Z".into()),
            Some(Utc.with_ymd_and_hms(2022, 3, 4, 5, 6, 7).unwrap())
        );
        assert_eq!(
            parse_date(&"2022-03-04T07:06:07+02:00".into()),
            Some(Utc.with_ymd_and_hms(2022, 3, 4, 5, 6, 7).unwrap())
        );
        assert_eq!(
            parse_date(&"2022-03-04T05:06".into()),
            Some(Utc.with_ymd_and_hms(2022, 3, 4, 5, 6, 0).unwrap())
        );
        assert_eq!(parse_date(&"2022-03".into()), Some(utc(2022, 3, 1)));
        assert_eq!(parse_date(&"1999".into()), Some(utc(1999, 1, 1)));
        assert_eq!(
            parse_date(&"Tue, 1 Jul 2003 10:52:37 +0200".into()),
            Some(Utc.with_ymd_and_hms(2003, 7, 1, 8, 52, 37).unwrap())
        );
    }

    #[test]
    fn parses_epoch_millis_and_dates() {
        assert_eq!(parse_date(&Value::from(0)), Some(utc(1970, 1, 1)));
        let now = Utc::now();
        assert_eq!(parse_date(&Value::Date(now)), Some(now));
    }

    #[test]
    fn rejects_non_dates() {
        for input in [
            Value::from("invalid-date"),
            Value::from("2022-13-01"),
            Value::from(""),
            Value::Null,
            Value::Bool(true),
            Value::Number(f64::NAN),
            Value::array([2022]),
        ] {
            assert_eq!(template(&date(&input)), "$ must be valid date", "{input:?}");
        }
    }

    #[test]
    fn date_output_is_parsed() {
        let outcome = date(&"2000-01-01".into());
        assert_eq!(outcome.value(), Some(&Value::Date(utc(2000, 1, 1))));
    }

    #[test]
    fn between_is_inclusive() {
        let rule = DateBetweenRule::new("2022-01-01", "2022-12-31");
        assert_eq!(
            date_between(&"2022-01-15".into(), &rule).value(),
            Some(&Value::Date(utc(2022, 1, 15)))
        );
        assert!(date_between(&"2022-01-01".into(), &rule).is_valid());
        assert!(date_between(&"2022-12-31".into(), &rule).is_valid());
    }

    #[test]
    fn between_reports_iso_bounds() {
        let rule = DateBetweenRule::new("2022-01-01", "2022-12-31");
        assert_eq!(
            template(&date_between(&"2023-01-15".into(), &rule)),
            "$ must be between 2022-01-01T00:00:00.000Z and 2022-12-31T00:00:00.000Z"
        );
    }

    #[test]
    fn between_passes_date_failure_through() {
        let rule = DateBetweenRule::new("2022-01-01", "2022-12-31");
        let input = Value::from("garbage");
        assert_eq!(date_between(&input, &rule), date(&input));
    }

    #[test]
    fn between_with_bad_bounds() {
        let rule = DateBetweenRule::new("nope", "2022-12-31");
        let outcome = date_between(&"2022-06-01".into(), &rule);
        let message = outcome.message().unwrap();
        assert!(!message.has_slot());
        assert_eq!(message.resolve("when"), "Invalid start or end date provided");
    }

    #[test]
    fn between_accepts_date_bounds() {
        let rule = DateBetweenRule::new(utc(2020, 1, 1), utc(2020, 12, 31));
        assert!(date_between(&Value::Date(utc(2020, 6, 1)), &rule).is_valid());
    }
}
