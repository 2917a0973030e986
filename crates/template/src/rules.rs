//! Operator semantics for conditional-visibility rules.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operator of a visibility rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    Gt,
    Gte,
    Lt,
    Lte,
    Truthy,
    Falsy,
}

impl RuleOperator {
    /// Apply the operator to a row value and the rule's comparison value.
    ///
    /// `actual` is the row's current value for the rule's `if_key`;
    /// `None` means the key is absent from the row.
    pub fn matches(self, actual: Option<&Value>, expected: &Value) -> bool {
        match self {
            RuleOperator::Equals => value_string(actual) == scalar_string(expected),
            RuleOperator::NotEquals => value_string(actual) != scalar_string(expected),
            RuleOperator::Contains => value_string(actual)
                .to_lowercase()
                .contains(&scalar_string(expected).to_lowercase()),
            RuleOperator::NotContains => !value_string(actual)
                .to_lowercase()
                .contains(&scalar_string(expected).to_lowercase()),
            RuleOperator::Gt => compare(actual, expected, |o| o == std::cmp::Ordering::Greater),
            RuleOperator::Gte => compare(actual, expected, |o| o != std::cmp::Ordering::Less),
            RuleOperator::Lt => compare(actual, expected, |o| o == std::cmp::Ordering::Less),
            RuleOperator::Lte => compare(actual, expected, |o| o != std::cmp::Ordering::Greater),
            RuleOperator::Truthy => is_truthy(actual),
            RuleOperator::Falsy => !is_truthy(actual),
        }
    }
}

/// Ordered comparison: numeric when both sides parse as numbers,
/// lexicographic on string forms otherwise.
fn compare(actual: Option<&Value>, expected: &Value, check: fn(std::cmp::Ordering) -> bool) -> bool {
    let left = value_string(actual);
    let right = scalar_string(expected);
    let ordering = match (left.trim().parse::<f64>(), right.trim().parse::<f64>()) {
        (Ok(l), Ok(r)) => l.partial_cmp(&r),
        _ => Some(left.cmp(&right)),
    };
    ordering.is_some_and(check)
}

/// Emptiness test shared by `truthy`/`falsy`: null, absent, blank or
/// whitespace-only strings, empty arrays, and empty objects are falsy.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Number(_)) => true,
    }
}

/// String form of a row value for comparisons. Absent and null are empty.
fn value_string(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(v) => scalar_string(v),
    }
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equals_on_string_form() {
        assert!(RuleOperator::Equals.matches(Some(&json!(5)), &json!("5")));
        assert!(!RuleOperator::Equals.matches(Some(&json!("a")), &json!("b")));
        assert!(RuleOperator::NotEquals.matches(Some(&json!("a")), &json!("b")));
    }

    #[test]
    fn absent_value_equals_empty_string() {
        assert!(RuleOperator::Equals.matches(None, &json!("")));
    }

    #[test]
    fn contains_is_case_insensitive() {
        assert!(RuleOperator::Contains.matches(Some(&json!("Hello World")), &json!("world")));
        assert!(RuleOperator::NotContains.matches(Some(&json!("abc")), &json!("xyz")));
    }

    #[test]
    fn numeric_coercion_in_ordered_compare() {
        // "20" >= 18 must compare numerically, not as "20" < "18".
        assert!(RuleOperator::Gte.matches(Some(&json!("20")), &json!(18)));
        assert!(RuleOperator::Lt.matches(Some(&json!("9")), &json!("10")));
    }

    #[test]
    fn lexicographic_fallback_when_not_numeric() {
        assert!(RuleOperator::Lt.matches(Some(&json!("apple")), &json!("banana")));
        assert!(RuleOperator::Gt.matches(Some(&json!("b")), &json!("a")));
    }

    #[test]
    fn truthy_and_falsy() {
        assert!(RuleOperator::Truthy.matches(Some(&json!("x")), &json!(null)));
        assert!(RuleOperator::Falsy.matches(Some(&json!("   ")), &json!(null)));
        assert!(RuleOperator::Falsy.matches(Some(&json!([])), &json!(null)));
        assert!(RuleOperator::Falsy.matches(Some(&json!({})), &json!(null)));
        assert!(RuleOperator::Falsy.matches(None, &json!(null)));
        assert!(RuleOperator::Truthy.matches(Some(&json!(0)), &json!(null)));
        assert!(RuleOperator::Falsy.matches(Some(&json!(false)), &json!(null)));
    }

    #[test]
    fn operator_serde_forms() {
        assert_eq!(
            serde_json::from_str::<RuleOperator>("\"not_contains\"").unwrap(),
            RuleOperator::NotContains
        );
        assert_eq!(
            serde_json::to_string(&RuleOperator::Gte).unwrap(),
            "\"gte\""
        );
    }
}
