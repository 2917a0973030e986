//! Conditional visibility and depth gating.
//!
//! Depth starts at 1 for the outermost repeater. A subfield of type
//! `repeater` whose would-be depth reaches the parent's `max_depth` is
//! inert: never evaluated for visibility, never persisted.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::schema::normalize::parse_repeater_config;
use crate::schema::{FieldType, RepeaterConfig, RuleAction};

/// Evaluate the visibility of every declared subfield for one row.
///
/// All subfields start visible. Rules run in declared order; a matching
/// rule applies its action to each of its targets, so the last matching
/// rule wins per target. Targets outside the declared subfields are
/// dropped. Hidden subfields keep whatever value the row stores.
pub fn evaluate_row(config: &RepeaterConfig, row: &Map<String, Value>) -> BTreeMap<String, bool> {
    let mut visible: BTreeMap<String, bool> = config
        .subfields
        .iter()
        .map(|field| (field.key.clone(), true))
        .collect();

    for rule in &config.rules {
        if !rule
            .operator
            .matches(row.get(&rule.if_key), &rule.comparison_value)
        {
            continue;
        }
        for target in &rule.target_keys {
            if let Some(slot) = visible.get_mut(target) {
                *slot = rule.action == RuleAction::Show;
            }
        }
    }

    visible
}

/// Keys of subfields that are inert at the given depth. `max_depth`
/// counts live nesting levels, so a repeater subfield goes inert when
/// its rows would land at level `depth + 1` past that bound:
/// `max_depth = 1` renders every nested repeater as a placeholder,
/// `max_depth = 2` allows exactly one live nested level, and so on.
pub fn inert_subfield_keys(config: &RepeaterConfig, depth: usize) -> Vec<String> {
    config
        .subfields
        .iter()
        .filter(|field| field.field_type == FieldType::Repeater && depth + 1 > config.max_depth)
        .map(|field| field.key.clone())
        .collect()
}

/// Strip inert repeater keys out of a stored row list before
/// persistence, recursing into live nested repeaters. Non-array values
/// pass through unchanged.
pub fn strip_inert(config: &RepeaterConfig, value: &Value, depth: usize) -> Value {
    let Some(rows) = value.as_array() else {
        return value.clone();
    };
    let inert = inert_subfield_keys(config, depth);

    let stripped: Vec<Value> = rows
        .iter()
        .map(|row| {
            let Some(map) = row.as_object() else {
                return row.clone();
            };
            let mut out = map.clone();
            for key in &inert {
                out.remove(key);
            }
            for field in &config.subfields {
                if field.field_type != FieldType::Repeater || inert.contains(&field.key) {
                    continue;
                }
                if let Some(nested) = out.get(&field.key) {
                    let nested_config = parse_repeater_config(&field.config);
                    let cleaned = strip_inert(&nested_config, nested, depth + 1);
                    out.insert(field.key.clone(), cleaned);
                }
            }
            Value::Object(out)
        })
        .collect();

    Value::Array(stripped)
}
