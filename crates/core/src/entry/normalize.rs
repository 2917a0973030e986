//! Entry payload canonicalization.
//!
//! Runs on every write, before title derivation and persistence. Two
//! passes over a fresh copy of the payload: key canonicalization
//! (camelCase aliases move to their snake_case keys) and best-effort
//! value canonicalization for email/phone/url/address fields. A failed
//! canonicalizer keeps the raw value; normalization never blocks a write.

use serde_json::{Map, Value};

use crate::repeater;
use crate::schema::normalize::{camel_alias, parse_repeater_config};
use crate::schema::{FieldDefinition, FieldType};

/// Produce the canonical form of a raw entry payload against a schema.
/// Pure: the input is not mutated. Idempotent.
pub fn normalize_entry(fields: &[FieldDefinition], data: &Value) -> Value {
    let Some(raw) = data.as_object() else {
        return data.clone();
    };
    let mut out = canonicalize_keys(fields, raw);

    for field in fields {
        let Some(value) = out.get(&field.key) else {
            continue;
        };
        let canonical = match field.field_type {
            FieldType::Email => canonical_email(value),
            FieldType::Phone => canonical_phone(value),
            FieldType::Url => canonical_url(value),
            FieldType::Address => canonical_address(value),
            FieldType::Repeater => {
                let config = parse_repeater_config(&field.config);
                Some(repeater::strip_inert(&config, value, 1))
            }
            _ => None,
        };
        if let Some(canonical) = canonical {
            out.insert(field.key.clone(), canonical);
        }
    }

    Value::Object(out)
}

/// Move camelCase-aliased values onto their canonical snake_case keys.
/// The alias only moves when the canonical key is absent; keys outside
/// the schema pass through untouched.
pub fn canonicalize_keys(fields: &[FieldDefinition], raw: &Map<String, Value>) -> Map<String, Value> {
    let mut out = raw.clone();
    for field in fields {
        let alias = camel_alias(&field.key);
        if alias == field.key || out.contains_key(&field.key) {
            continue;
        }
        if let Some(value) = out.remove(&alias) {
            out.insert(field.key.clone(), value);
        }
    }
    out
}

/// Lowercased, trimmed email. Non-strings and strings without an `@`
/// are left alone.
fn canonical_email(value: &Value) -> Option<Value> {
    let s = value.as_str()?.trim();
    if !s.contains('@') {
        return None;
    }
    Some(Value::String(s.to_lowercase()))
}

/// Best-effort E.164 phone formatting. Only rewrites when the digits
/// resolve unambiguously; anything else keeps the raw value.
fn canonical_phone(value: &Value) -> Option<Value> {
    let s = value.as_str()?.trim();
    let had_plus = s.starts_with('+');
    let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
    let formatted = if had_plus && digits.len() >= 8 && digits.len() <= 15 {
        format!("+{digits}")
    } else if digits.len() == 10 {
        format!("+1{digits}")
    } else if digits.len() == 11 && digits.starts_with('1') {
        format!("+{digits}")
    } else {
        return None;
    };
    Some(Value::String(formatted))
}

/// Scheme-normalized URL: trims, lowercases the scheme, and prepends
/// `https://` when a bare host is given.
fn canonical_url(value: &Value) -> Option<Value> {
    let s = value.as_str()?.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(pos) = s.find("://") {
        let (scheme, rest) = s.split_at(pos);
        if scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.') {
            return Some(Value::String(format!("{}{rest}", scheme.to_ascii_lowercase())));
        }
        return None;
    }
    if s.contains('.') && !s.contains(char::is_whitespace) {
        return Some(Value::String(format!("https://{s}")));
    }
    None
}

/// Trim whitespace on every string subvalue of an address object.
fn canonical_address(value: &Value) -> Option<Value> {
    let map = value.as_object()?;
    let trimmed: Map<String, Value> = map
        .iter()
        .map(|(k, v)| match v {
            Value::String(s) => (k.clone(), Value::String(s.trim().to_string())),
            other => (k.clone(), other.clone()),
        })
        .collect();
    Some(Value::Object(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn field(key: &str, field_type: FieldType) -> FieldDefinition {
        FieldDefinition {
            id: Uuid::nil(),
            key: key.to_string(),
            label: key.to_string(),
            field_type,
            required: false,
            help_text: String::new(),
            order_index: 0,
            config: json!({}),
        }
    }

    #[test]
    fn camel_alias_moves_to_canonical_key() {
        let fields = vec![field("first_name", FieldType::Text)];
        let out = normalize_entry(&fields, &json!({"firstName": "Ada"}));
        assert_eq!(out, json!({"first_name": "Ada"}));
    }

    #[test]
    fn canonical_key_wins_over_alias() {
        let fields = vec![field("first_name", FieldType::Text)];
        let out = normalize_entry(&fields, &json!({"firstName": "x", "first_name": "Ada"}));
        assert_eq!(out["first_name"], "Ada");
        // The losing alias is left in place, not merged.
        assert_eq!(out["firstName"], "x");
    }

    #[test]
    fn unknown_keys_pass_through() {
        let fields = vec![field("a", FieldType::Text)];
        let out = normalize_entry(&fields, &json!({"mystery": 1}));
        assert_eq!(out["mystery"], 1);
    }

    #[test]
    fn email_is_lowercased_and_trimmed() {
        let fields = vec![field("contact", FieldType::Email)];
        let out = normalize_entry(&fields, &json!({"contact": "  Ada@Example.COM "}));
        assert_eq!(out["contact"], "ada@example.com");
    }

    #[test]
    fn malformed_email_keeps_raw_value() {
        let fields = vec![field("contact", FieldType::Email)];
        let out = normalize_entry(&fields, &json!({"contact": "not-an-email"}));
        assert_eq!(out["contact"], "not-an-email");
        let out = normalize_entry(&fields, &json!({"contact": 42}));
        assert_eq!(out["contact"], 42);
    }

    #[test]
    fn phone_formats_to_e164() {
        let fields = vec![field("phone", FieldType::Phone)];
        let out = normalize_entry(&fields, &json!({"phone": "(555) 123-4567"}));
        assert_eq!(out["phone"], "+15551234567");
        let out = normalize_entry(&fields, &json!({"phone": "+44 20 7946 0958"}));
        assert_eq!(out["phone"], "+442079460958");
    }

    #[test]
    fn ambiguous_phone_keeps_raw_value() {
        let fields = vec![field("phone", FieldType::Phone)];
        let out = normalize_entry(&fields, &json!({"phone": "12345"}));
        assert_eq!(out["phone"], "12345");
    }

    #[test]
    fn url_gets_scheme() {
        let fields = vec![field("site", FieldType::Url)];
        let out = normalize_entry(&fields, &json!({"site": "example.com/page"}));
        assert_eq!(out["site"], "https://example.com/page");
        let out = normalize_entry(&fields, &json!({"site": "HTTPS://example.com"}));
        assert_eq!(out["site"], "https://example.com");
    }

    #[test]
    fn address_subvalues_are_trimmed() {
        let fields = vec![field("addr", FieldType::Address)];
        let out = normalize_entry(&fields, &json!({"addr": {"city": " Oslo ", "zip": 1234}}));
        assert_eq!(out["addr"], json!({"city": "Oslo", "zip": 1234}));
    }

    #[test]
    fn normalization_is_idempotent() {
        let fields = vec![
            field("first_name", FieldType::Text),
            field("contact", FieldType::Email),
            field("phone", FieldType::Phone),
            field("site", FieldType::Url),
        ];
        let raw = json!({
            "firstName": "Ada",
            "contact": " Ada@X.io",
            "phone": "555 123 4567",
            "site": "x.io"
        });
        let once = normalize_entry(&fields, &raw);
        let twice = normalize_entry(&fields, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn non_object_payload_is_returned_as_is() {
        let fields = vec![field("a", FieldType::Text)];
        assert_eq!(normalize_entry(&fields, &json!(null)), json!(null));
    }
}
