//! Doz Showcase
//!
//! Validates a sample signup payload with every rule in the catalog and
//! prints the aggregated result under both flag policies:
//! - scalar rules (string, number, boolean, regex)
//! - web rules (email, url, uuidv4)
//! - dates, passwords and uploads
//! - composites (arrayOf, shape, formData)
//!
//! Run with `RUST_LOG=doz=trace` to see per-field decisions.

use anyhow::Context;
use doz::prelude::*;
use doz::AggregatorConfig;
use regex::Regex;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct Invoice;

fn signup_payload() -> Value {
    Value::from(json!({
        "id": "123e4567-e89b-4d3c-8456-426614174000",
        "name": "Ada",
        "email": "ada@example",
        "age": 36,
        "newsletter": true,
        "phone": "555-0100",
        "website": "http://ada.dev",
        "birthdate": "1815-12-10",
        "password": "Analytical1!",
        "tags": ["math", "engines"],
        "scores": [9, 8, "ten"],
        "roles": ["admin", "editor"],
        "address": {"street": "12 St James's Sq", "zip": ""},
    }))
}

fn build_request(payload: &Value, form: &FormData) -> anyhow::Result<ValidationRequest> {
    let input = payload.as_object().context("payload must be an object")?;
    let field = |key: &str| input.get(key).cloned().unwrap_or_default();

    let phone = Regex::new(r"^\d{3}-\d{3}-\d{4}$")?;
    let avatar = Value::from(FileInfo::new("portrait.PNG", 420_000).with_content_type("image/png"));
    let address = ShapeRule::new()
        .field("street", StringRule)
        .field("zip", StringRule)
        .field("city", StringRule);
    let profile = FormDataRule::new()
        .field("display_name", StringRule)
        .field("age", |entry: &Value| {
            // form entries are text
            let age = entry
                .as_str()
                .and_then(|s| s.parse::<f64>().ok())
                .map_or_else(|| entry.clone(), Value::Number);
            rules::number(&age, &NumberRule::between(13.0, 130.0))
        })
        .field("cv", MimeRule::new(["application/pdf"]));

    Ok(ValidationRequest::new()
        .field("id", rules::uuidv4(&field("id")))
        .field("name", rules::string(&field("name")))
        .field("email", rules::email(&field("email")))
        .field("age", rules::number(&field("age"), &NumberRule::between(18.0, 120.0)))
        .field("newsletter", rules::boolean(&field("newsletter")))
        .field(
            "phone",
            rules::regex(&field("phone"), &phone, Some("$ must look like 555-555-5555")),
        )
        .field("website", rules::url(&field("website"), &UrlRule::protocols(["https"])))
        .field("birthdate", rules::date(&field("birthdate")))
        .field(
            "signupDate",
            rules::date_between(
                &Value::from("2024-06-01"),
                &DateBetweenRule::new("2024-01-01", "2024-12-31"),
            ),
        )
        .field("password", rules::password(&field("password"), &PasswordRule::default()))
        .field("tags", rules::array(&field("tags"), &ArrayRule::between(1, 5)))
        .field(
            "roles",
            rules::array_includes(&field("roles"), &[Value::from("admin")]),
        )
        .field("scores", rules::array_of(&field("scores"), &NumberRule::new()))
        .field("address", address.check(&field("address")))
        .field("payload", rules::has_properties(payload, &["id", "email"]))
        .field("raw", rules::object(payload))
        .field(
            "avatar",
            rules::file(
                &avatar,
                &FileRule::new()
                    .max_size_in_bytes(1024 * 1024)
                    .allowed_extensions(["png", "jpg"]),
            ),
        )
        .field("profile", profile.check(&form.clone().into()))
        .field(
            "invoice",
            rules::instance_of(&Instance::new(Invoice).into(), &[Class::of::<Invoice>()]),
        ))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let form = FormData::new()
        .with("display_name", "Ada L.")
        .with("age", "36")
        .with("cv", FileInfo::new("cv.pdf", 80_000).with_content_type("application/pdf"));
    let request = build_request(&signup_payload(), &form)?;
    info!(fields = request.len(), "request built");

    let last_wins = aggregate(&request);
    println!("last-wins policy:\n{}", serde_json::to_string_pretty(&last_wins)?);

    let config: AggregatorConfig = serde_json::from_value(json!({"policy": "all_valid"}))?;
    let strict = Aggregator::with_config(config).aggregate(&request);
    println!("all-valid policy:\n{}", serde_json::to_string_pretty(&strict)?);

    if let Err(failed) = strict.into_result() {
        info!(failed = failed.len(), "signup rejected");
        println!(
            "API error body:\n{}",
            serde_json::to_string_pretty(&failed.to_api_error())?
        );
    }

    Ok(())
}
