//! End-to-end tests: rules evaluated per field, folded by the aggregator,
//! compared through their JSON form.

use doz::prelude::*;
use doz::{AggregatorConfig, Map};
use regex::Regex;
use serde_json::{json, Value as Json};

fn run(request: ValidationRequest) -> Json {
    serde_json::to_value(Validation::new(&request).result).unwrap()
}

fn single(field: &str, outcome: Outcome) -> Json {
    run(ValidationRequest::new().field(field, outcome))
}

// form entries arrive as text
fn parsed_number(value: &Value) -> Outcome {
    let parsed = value
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .map_or_else(|| value.clone(), Value::Number);
    rules::number(&parsed, &NumberRule::new())
}

#[test]
fn string_field() {
    assert_eq!(
        single("name", rules::string(&"John".into())),
        json!({"valid": true, "data": {"name": "John"}})
    );
}

#[test]
fn number_field() {
    let bounds = NumberRule::between(0.0, 100.0);
    assert_eq!(
        single("age", rules::number(&25.into(), &bounds)),
        json!({"valid": true, "data": {"age": 25}})
    );
    assert_eq!(
        single("age", rules::number(&150.into(), &bounds)),
        json!({"valid": false, "exception": {"age": "age must be less than 100"}})
    );
}

#[test]
fn mixed_request_follows_last_field() {
    let request = ValidationRequest::new()
        .field("a", rules::string(&"ok".into()))
        .field("b", rules::number(&200.into(), &NumberRule::at_most(100.0)));
    assert_eq!(
        run(request),
        json!({"valid": false, "exception": {"b": "b must be less than 100"}})
    );

    let request = ValidationRequest::new()
        .field("b", rules::number(&200.into(), &NumberRule::at_most(100.0)))
        .field("a", rules::string(&"ok".into()));
    assert_eq!(run(request), json!({"valid": true, "data": {"a": "ok"}}));
}

#[test]
fn mixed_request_under_all_valid() {
    let request = ValidationRequest::new()
        .field("b", rules::number(&200.into(), &NumberRule::at_most(100.0)))
        .field("a", rules::string(&"ok".into()));
    let config: AggregatorConfig = serde_json::from_value(json!({"policy": "all_valid"})).unwrap();
    let result = Aggregator::with_config(config).aggregate(&request);
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"valid": false, "exception": {"b": "b must be less than 100"}})
    );
}

#[test]
fn boolean_and_array_fields() {
    assert_eq!(
        single("isActive", rules::boolean(&true.into())),
        json!({"valid": true, "data": {"isActive": true}})
    );

    let bounds = ArrayRule::between(1, 3);
    assert_eq!(
        single("tags", rules::array(&Value::array(["one", "two"]), &bounds)),
        json!({"valid": true, "data": {"tags": ["one", "two"]}})
    );
    assert_eq!(
        single(
            "tags",
            rules::array(&Value::array(["one", "two", "three", "four"]), &bounds)
        ),
        json!({"valid": false, "exception": {"tags": "tags length must be at most 3"}})
    );
}

#[test]
fn email_field() {
    assert_eq!(
        single("email", rules::email(&"test@example.com".into())),
        json!({"valid": true, "data": {"email": "test@example.com"}})
    );
    assert_eq!(
        single("email", rules::email(&"invalid-email".into())),
        json!({"valid": false, "exception": {"email": "email must be valid email address"}})
    );
}

#[test]
fn object_field() {
    let address = json!({"street": "123 Main St", "city": "Anytown", "state": "CA", "zip": "12345"});
    assert_eq!(
        single("address", rules::object(&address.clone().into())),
        json!({"valid": true, "data": {"address": address}})
    );
}

#[test]
fn date_fields() {
    assert_eq!(
        single("birthdate", rules::date(&"2000-01-01".into())),
        json!({"valid": true, "data": {"birthdate": "2000-01-01T00:00:00.000Z"}})
    );
    assert_eq!(
        single("birthdate", rules::date(&"invalid-date".into())),
        json!({"valid": false, "exception": {"birthdate": "birthdate must be valid date"}})
    );

    let window = DateBetweenRule::new("2022-01-01", "2022-12-31");
    assert_eq!(
        single("eventDate", rules::date_between(&"2022-01-15".into(), &window)),
        json!({"valid": true, "data": {"eventDate": "2022-01-15T00:00:00.000Z"}})
    );
    assert_eq!(
        single("eventDate", rules::date_between(&"2023-01-15".into(), &window)),
        json!({
            "valid": false,
            "exception": {
                "eventDate": "eventDate must be between 2022-01-01T00:00:00.000Z and 2022-12-31T00:00:00.000Z"
            }
        })
    );
}

#[test]
fn password_field() {
    let strict = PasswordRule::new().min_length(6).max_length(20);
    assert_eq!(
        single("password", rules::password(&"Test123!".into(), &strict)),
        json!({"valid": true, "data": {"password": "Test123!"}})
    );
    assert!(rules::password(&"Test123!".into(), &PasswordRule::default()).is_valid());

    let weak = PasswordRule::new().min_length(6).require_uppercase(true);
    assert_eq!(
        single("password", rules::password(&"weak".into(), &weak)),
        json!({"valid": false, "exception": {"password": "password must be at least 6 characters"}})
    );
}

#[test]
fn regex_field() {
    let phone = Regex::new(r"^\d{3}-\d{3}-\d{4}$").unwrap();
    assert_eq!(
        single("phone", rules::regex(&"123-456-7890".into(), &phone, None)),
        json!({"valid": true, "data": {"phone": "123-456-7890"}})
    );
    assert_eq!(
        single("phone", rules::regex(&"12345".into(), &phone, None)),
        json!({"valid": false, "exception": {"phone": "phone does not match required pattern"}})
    );
}

#[test]
fn url_field() {
    let https = UrlRule::protocols(["https"]);
    assert_eq!(
        single("website", rules::url(&"https://example.com".into(), &https)),
        json!({"valid": true, "data": {"website": "https://example.com/"}})
    );
    assert_eq!(
        single("website", rules::url(&"ftp://example.com".into(), &https)),
        json!({"valid": false, "exception": {"website": "website must use one of these protocols: https"}})
    );
}

#[test]
fn array_includes_field() {
    let required = [Value::from("red"), Value::from("blue")];
    assert_eq!(
        single(
            "colors",
            rules::array_includes(&Value::array(["red", "blue", "green"]), &required)
        ),
        json!({"valid": true, "data": {"colors": ["red", "blue", "green"]}})
    );
    assert_eq!(
        single(
            "colors",
            rules::array_includes(&Value::array(["yellow", "orange"]), &required)
        ),
        json!({"valid": false, "exception": {"colors": "colors must include all of these items: red, blue"}})
    );
}

#[test]
fn array_of_field() {
    let numbers = NumberRule::new();
    assert_eq!(
        single("numbers", rules::array_of(&Value::array([1, 2, 3]), &numbers)),
        json!({"valid": true, "data": {"numbers": [1, 2, 3]}})
    );

    let input = Value::array([Value::from(1), Value::from("2"), Value::from(3)]);
    assert_eq!(
        single("numbers", rules::array_of(&input, &numbers)),
        json!({"valid": false, "exception": {"numbers": "Item at index 1: numbers must be number"}})
    );
}

#[test]
fn has_properties_field() {
    let user = Value::from(json!({"name": "John", "age": 25, "email": "john@example.com"}));
    assert_eq!(
        single("user", rules::has_properties(&user, &["name", "email"])),
        json!({"valid": true, "data": {"user": {"name": "John", "age": 25, "email": "john@example.com"}}})
    );
    assert_eq!(
        single(
            "user",
            rules::has_properties(&Value::object([("name", "John")]), &["name", "email"])
        ),
        json!({"valid": false, "exception": {"user": "user must have all of these properties: email"}})
    );
}

#[test]
fn shape_field() {
    let rule = ShapeRule::new()
        .field("name", StringRule)
        .field("age", NumberRule::new());

    let user = Value::from(json!({"name": "123", "age": 25}));
    assert_eq!(
        single("user", rule.check(&user)),
        json!({"valid": true, "data": {"user": {"name": "123", "age": 25}}})
    );

    let user = Value::from(json!({"name": "", "age": "old"}));
    assert_eq!(
        single("user", rule.check(&user)),
        json!({
            "valid": false,
            "exception": {"user": "name: name cannot be empty; age: age must be number"}
        })
    );
}

struct CustomDate;

#[test]
fn instance_of_field() {
    let custom = Value::from(Instance::new(CustomDate).extends(Class::DATE));

    let result = Validation::new(
        &ValidationRequest::new().field("field", rules::instance_of(&custom, &[Class::DATE])),
    )
    .result;
    assert_eq!(result.data().map(|d| &d["field"]), Some(&custom));

    assert_eq!(
        single("field", rules::instance_of(&42.into(), &[Class::NUMBER])),
        json!({"valid": true, "data": {"field": 42}})
    );
    assert_eq!(
        single("field", rules::instance_of(&"42".into(), &[Class::NUMBER])),
        json!({"valid": false, "exception": {"field": "field must be instance of Number"}})
    );
    assert!(rules::instance_of(&custom, &[Class::DATE, Class::of::<CustomDate>()]).is_valid());
}

#[test]
fn uuidv4_field() {
    assert_eq!(
        single("field", rules::uuidv4(&"123e4567-e89b-4d3c-8456-426614174000".into())),
        json!({"valid": true, "data": {"field": "123e4567-e89b-4d3c-8456-426614174000"}})
    );
    for input in ["123e4567-e89b-5d3c-8456-426614174000", "not-a-uuid"] {
        assert_eq!(
            single("field", rules::uuidv4(&input.into())),
            json!({"valid": false, "exception": {"field": "field must be a valid UUIDv4"}})
        );
    }
    assert_eq!(
        single("field", rules::uuidv4(&123.into())),
        json!({"valid": false, "exception": {"field": "field must be string"}})
    );
}

#[test]
fn form_data_field() {
    let rule = FormDataRule::new()
        .field("name", StringRule)
        .field("age", parsed_number)
        .field("email", EmailRule);

    let form = FormData::new()
        .with("name", "John Doe")
        .with("age", "25")
        .with("email", "john@example.com");
    assert_eq!(
        single("user", rule.check(&form.into())),
        json!({
            "valid": true,
            "data": {"user": {"name": "John Doe", "age": 25, "email": "john@example.com"}}
        })
    );

    let form = FormData::new()
        .with("name", "")
        .with("age", "not a number")
        .with("email", "invalid-email");
    assert_eq!(
        single("user", rule.check(&form.into())),
        json!({
            "valid": false,
            "exception": {
                "user": "name cannot be empty; age must be number; email must be valid email address"
            }
        })
    );

    assert_eq!(
        single("user", rule.check(&Value::object([("name", "John Doe")]))),
        json!({"valid": false, "exception": {"user": "user must be FormData"}})
    );
}

#[test]
fn form_data_missing_entries() {
    let rule = FormDataRule::new()
        .field("name", StringRule)
        .field("age", NumberRule::new())
        .field("email", EmailRule);

    let form = FormData::new().with("name", "John Doe");
    assert_eq!(
        single("user", rule.check(&form.into())),
        json!({
            "valid": false,
            "exception": {"user": "age must be number; email must be valid email address"}
        })
    );
}

#[test]
fn file_fields() {
    let upload = Value::from(FileInfo::new("test.jpg", 1024).with_content_type("image/jpeg"));
    let images = FileRule::new()
        .max_size_in_bytes(5 * 1024 * 1024)
        .allowed_extensions(["jpg", "png"]);

    let request = ValidationRequest::new()
        .field("avatar", rules::file(&upload, &images))
        .field("avatarType", rules::mime(&upload, &["image/jpeg", "image/png"]));
    assert_eq!(
        run(request),
        json!({
            "valid": true,
            "data": {
                "avatar": {"name": "test.jpg", "size": 1024, "type": "image/jpeg"},
                "avatarType": {"name": "test.jpg", "size": 1024, "type": "image/jpeg"}
            }
        })
    );

    assert_eq!(
        single("avatar", rules::mime(&upload, &["application/pdf"])),
        json!({"valid": false, "exception": {"avatar": "avatar must be one of these MIME types: application/pdf"}})
    );
}

#[test]
fn aggregate_is_idempotent() {
    let request = ValidationRequest::new()
        .field("name", rules::string(&"John".into()))
        .field("age", rules::number(&"abc".into(), &NumberRule::new()));
    let first = aggregate(&request);
    assert_eq!(first, aggregate(&request));
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&aggregate(&request)).unwrap()
    );
}

#[test]
fn into_result_renders_api_error() {
    let request = ValidationRequest::new()
        .field("email", rules::email(&"nope".into()))
        .field("age", rules::number(&"abc".into(), &NumberRule::new()));
    let result = Aggregator::new()
        .policy(FlagPolicy::AllValid)
        .aggregate(&request);

    let err = result.into_result().unwrap_err();
    assert_eq!(err.to_string(), "Validation failed: 2 field error(s)");
    assert_eq!(
        serde_json::to_value(err.to_api_error()).unwrap(),
        json!({
            "error": {
                "type": "validation_error",
                "message": "Validation failed",
                "fields": [
                    {"field": "email", "message": "email must be valid email address"},
                    {"field": "age", "message": "age must be number"}
                ]
            }
        })
    );

    let ok: Map = aggregate(&ValidationRequest::new().field("n", rules::number(&7.into(), &NumberRule::new())))
        .into_result()
        .unwrap();
    assert_eq!(ok["n"], Value::from(7));
}

#[test]
fn closures_are_rules() {
    let even = |v: &Value| match v.as_f64() {
        Some(n) if n % 2.0 == 0.0 => Outcome::valid(n),
        _ => Outcome::invalid(v.clone(), Message::field("must be even")),
    };
    assert_eq!(
        single("ids", rules::array_of(&Value::array([2, 4, 5]), &even)),
        json!({"valid": false, "exception": {"ids": "Item at index 2: ids must be even"}})
    );
}
