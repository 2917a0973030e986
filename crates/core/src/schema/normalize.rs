//! The single normalization boundary for stored field configs.
//!
//! Stored configs are loosely shaped: legacy rows use camelCase keys and
//! the old `options` alias for choice lists. Everything is rewritten to
//! canonical shape here, once, at read time; the rest of the core only
//! ever sees canonical configs.

use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::types::{
    FieldDefinition, FieldType, RepeaterConfig, RepeaterLayout, SubfieldConfig, SubfieldSchema,
    VisibilityRule,
};

/// Rewrite a camelCase key to snake_case. Keys already in snake_case
/// pass through unchanged.
pub fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// The camelCase alias of a canonical snake_case key.
pub fn camel_alias(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Default label for a key: snake_case to Title Case.
pub fn humanize(key: &str) -> String {
    key.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Known subkeys of a composite type, in display order.
pub fn known_subkeys(field_type: FieldType) -> &'static [&'static str] {
    match field_type {
        FieldType::Name => &["title", "first", "middle", "last", "suffix"],
        FieldType::Address => &["street", "street2", "city", "state", "zip", "country"],
        FieldType::Image | FieldType::File | FieldType::Video => &["alt", "caption", "credit"],
        _ => &[],
    }
}

/// Read a config key accepting its camelCase alias.
fn config_get<'a>(config: &'a Value, key: &str) -> Option<&'a Value> {
    config
        .get(key)
        .or_else(|| config.get(camel_alias(key)))
}

/// Build the canonical subfield schema for a composite type: unknown
/// subkeys are pruned, missing ones default to shown with a humanized
/// label.
pub fn normalize_subfield_schema(field_type: FieldType, raw: &Value) -> SubfieldSchema {
    let mut schema = SubfieldSchema::new();
    for subkey in known_subkeys(field_type) {
        let stored = raw.get(*subkey);
        let show = stored
            .and_then(|v| v.get("show"))
            .and_then(Value::as_bool)
            .unwrap_or(true);
        let label = stored
            .and_then(|v| v.get("label"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| humanize(subkey));
        schema.insert(subkey.to_string(), SubfieldConfig { show, label });
    }
    schema
}

/// Normalize a stored config payload into its canonical shape for the
/// given field type. Never fails; malformed payloads degrade to
/// type-appropriate defaults.
pub fn normalize_config(field_type: FieldType, raw: &Value) -> Value {
    let base = match raw {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    let raw = Value::Object(base.clone());

    if field_type.is_choice() {
        let mut out = base;
        let stored = out.remove("choices");
        let legacy = out.remove("options");
        let choices = stored
            .or(legacy)
            .and_then(|v| v.as_array().cloned())
            .unwrap_or_default();
        out.insert("choices".to_string(), Value::Array(choices));
        return Value::Object(out);
    }

    if field_type.is_composite() {
        let mut out = base;
        let stored = out
            .remove("subfields")
            .or_else(|| out.remove("subfieldSchema"))
            .or_else(|| out.remove("subfield_schema"))
            .unwrap_or(Value::Null);
        let schema = normalize_subfield_schema(field_type, &stored);
        out.insert(
            "subfields".to_string(),
            serde_json::to_value(schema).unwrap_or(Value::Null),
        );
        return Value::Object(out);
    }

    if field_type == FieldType::Repeater {
        let config = parse_repeater_config(&raw);
        return serde_json::to_value(config).unwrap_or_else(|_| json!({}));
    }

    Value::Object(base)
}

/// Parse a repeater field's config, accepting legacy camelCase keys and
/// recursing into nested subfields. `max_depth` is clamped to at least 1.
pub fn parse_repeater_config(raw: &Value) -> RepeaterConfig {
    let defaults = RepeaterConfig::default();

    let min_rows = config_get(raw, "min_rows")
        .and_then(Value::as_u64)
        .unwrap_or(0) as usize;
    let max_rows = config_get(raw, "max_rows")
        .and_then(Value::as_u64)
        .map(|n| n as usize);
    let add_label = config_get(raw, "add_label")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or(defaults.add_label);
    let layout = match config_get(raw, "layout").and_then(Value::as_str) {
        Some("table") => RepeaterLayout::Table,
        _ => RepeaterLayout::Cards,
    };
    let max_depth = config_get(raw, "max_depth")
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .unwrap_or(defaults.max_depth)
        .max(1);
    let row_label_template = config_get(raw, "row_label_template")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default();

    let subfields = config_get(raw, "subfields")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| parse_subfield(item, i as i32))
                .collect()
        })
        .unwrap_or_default();

    let rules = config_get(raw, "rules")
        .or_else(|| config_get(raw, "visibility_rules"))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match serde_json::from_value::<VisibilityRule>(item.clone()) {
                    Ok(rule) => Some(rule),
                    Err(err) => {
                        tracing::warn!(%err, "skipping malformed visibility rule");
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    RepeaterConfig {
        min_rows,
        max_rows,
        add_label,
        layout,
        max_depth,
        row_label_template,
        subfields,
        rules,
    }
}

/// Parse one repeater subfield declaration into a full definition with a
/// normalized config. Declarations without a key are dropped.
fn parse_subfield(raw: &Value, order_index: i32) -> Option<FieldDefinition> {
    let key = to_snake_case(raw.get("key").and_then(Value::as_str)?.trim());
    if key.is_empty() {
        return None;
    }
    let field_type = raw
        .get("type")
        .and_then(Value::as_str)
        .map(FieldType::parse)
        .unwrap_or(FieldType::Text);
    let label = raw
        .get("label")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| humanize(&key));
    let config = raw.get("config").cloned().unwrap_or(Value::Null);
    Some(FieldDefinition {
        id: raw
            .get("id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or(Uuid::nil()),
        key,
        label,
        field_type,
        required: raw.get("required").and_then(Value::as_bool).unwrap_or(false),
        help_text: raw
            .get("help_text")
            .or_else(|| raw.get("helpText"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        order_index,
        config: normalize_config(field_type, &config),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldframe_template::RuleOperator;
    use serde_json::json;

    #[test]
    fn snake_and_camel_round_trip() {
        assert_eq!(to_snake_case("firstName"), "first_name");
        assert_eq!(to_snake_case("first_name"), "first_name");
        assert_eq!(camel_alias("first_name"), "firstName");
        assert_eq!(camel_alias("name"), "name");
    }

    #[test]
    fn humanize_keys() {
        assert_eq!(humanize("first_name"), "First Name");
        assert_eq!(humanize("zip"), "Zip");
    }

    #[test]
    fn choice_config_exposes_choices() {
        let out = normalize_config(FieldType::Dropdown, &json!({}));
        assert_eq!(out["choices"], json!([]));
    }

    #[test]
    fn legacy_options_alias_becomes_choices() {
        let out = normalize_config(FieldType::Radio, &json!({"options": ["a", "b"]}));
        assert_eq!(out["choices"], json!(["a", "b"]));
        assert!(out.get("options").is_none());
    }

    #[test]
    fn subfield_schema_prunes_unknown_and_defaults_missing() {
        let raw = json!({
            "first": {"show": false, "label": "Given name"},
            "bogus": {"show": true}
        });
        let schema = normalize_subfield_schema(FieldType::Name, &raw);
        assert!(!schema.contains_key("bogus"));
        assert!(!schema["first"].show);
        assert_eq!(schema["first"].label, "Given name");
        assert!(schema["last"].show);
        assert_eq!(schema["last"].label, "Last");
        assert_eq!(schema.len(), 5);
    }

    #[test]
    fn repeater_config_accepts_camel_case_keys() {
        let raw = json!({
            "minRows": 1,
            "maxRows": 4,
            "maxDepth": 2,
            "rowLabelTemplate": "{#}: {city}",
            "subfields": [
                {"key": "city", "type": "text"},
                {"key": "zipCode", "type": "text"}
            ],
            "rules": [
                {"ifKey": "city", "operator": "truthy", "action": "show", "targetKeys": ["zip_code"]}
            ]
        });
        let config = parse_repeater_config(&raw);
        assert_eq!(config.min_rows, 1);
        assert_eq!(config.max_rows, Some(4));
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.row_label_template, "{#}: {city}");
        assert_eq!(config.subfields.len(), 2);
        // Subfield keys canonicalize to snake_case on parse.
        assert_eq!(config.subfields[1].key, "zip_code");
        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.rules[0].operator, RuleOperator::Truthy);
        assert_eq!(config.rules[0].target_keys, vec!["zip_code"]);
    }

    #[test]
    fn repeater_max_depth_clamped_to_one() {
        let config = parse_repeater_config(&json!({"max_depth": 0}));
        assert_eq!(config.max_depth, 1);
    }

    #[test]
    fn malformed_rule_is_skipped() {
        let raw = json!({"rules": [{"operator": "nonsense"}, 42]});
        let config = parse_repeater_config(&raw);
        assert!(config.rules.is_empty());
    }

    #[test]
    fn normalize_config_is_idempotent() {
        let raw = json!({"options": ["x"], "placeholder": "pick"});
        let once = normalize_config(FieldType::Multiselect, &raw);
        let twice = normalize_config(FieldType::Multiselect, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn non_object_config_degrades_to_defaults() {
        let out = normalize_config(FieldType::Checkbox, &json!("garbage"));
        assert_eq!(out["choices"], json!([]));
        let repeater = parse_repeater_config(&json!(null));
        assert_eq!(repeater.max_depth, 1);
        assert!(repeater.subfields.is_empty());
    }
}
