use serde_json::Value;

use crate::token::{parse_template, Segment};

/// Subkeys that mark an object as a person name, in render order.
const NAME_PARTS: [&str; 5] = ["title", "first", "middle", "last", "suffix"];

/// Walk a dot-path into nested maps and arrays.
///
/// Array steps accept numeric indices (`items.0.label`). A missing or
/// mismatched step resolves to `None`, never an error.
pub fn resolve_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = data;
    for step in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(step)?,
            Value::Array(items) => items.get(step.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Render a resolved value as a single display line.
///
/// Scalars render as their string form, arrays as a comma-joined list of
/// their non-empty parts, person-name objects as "title first middle last
/// suffix" with empty parts dropped, and anything else as compact JSON.
pub fn pretty_inline(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .map(pretty_inline)
                .filter(|s| !s.is_empty())
                .collect();
            parts.join(", ")
        }
        Value::Object(map) => {
            if NAME_PARTS.iter().any(|k| map.contains_key(*k)) {
                let joined = NAME_PARTS
                    .iter()
                    .filter_map(|k| map.get(*k))
                    .map(pretty_inline)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                collapse_whitespace(&joined)
            } else {
                serde_json::to_string(value).unwrap_or_default()
            }
        }
    }
}

/// Derive a display title from a template and entry data.
///
/// Unresolvable tokens contribute nothing; the result is always
/// whitespace-collapsed and trimmed.
pub fn derive_title(template: &str, data: &Value) -> String {
    let mut out = String::new();
    for segment in parse_template(template) {
        match segment {
            Segment::Literal(text) => out.push_str(&text),
            Segment::Token(path) => {
                if let Some(value) = resolve_path(data, &path) {
                    out.push_str(&pretty_inline(value));
                }
            }
            // `{#}` only means something inside a repeater row label.
            Segment::RowIndex => {}
        }
    }
    collapse_whitespace(&out)
}

/// Render a repeater row label: `{#}` becomes the 1-based row index and
/// `{subfield}` becomes that subfield's current value.
pub fn render_row_label(template: &str, row: &Value, index: usize) -> String {
    let mut out = String::new();
    for segment in parse_template(template) {
        match segment {
            Segment::Literal(text) => out.push_str(&text),
            Segment::RowIndex => out.push_str(&(index + 1).to_string()),
            Segment::Token(path) => {
                if let Some(value) = resolve_path(row, &path) {
                    out.push_str(&pretty_inline(value));
                }
            }
        }
    }
    collapse_whitespace(&out)
}

/// Collapse runs of whitespace to single spaces and trim the ends.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn derive_name_template() {
        let data = json!({"name": {"first": "Ada", "last": "Lovelace"}});
        assert_eq!(derive_title("{name.first} {name.last}", &data), "Ada Lovelace");
    }

    #[test]
    fn missing_token_renders_empty() {
        let data = json!({"name": {"first": "Ada"}});
        assert_eq!(derive_title("{name.first} {name.last}", &data), "Ada");
    }

    #[test]
    fn derive_is_whitespace_normalized() {
        let data = json!({"a": "  x ", "b": "y"});
        assert_eq!(derive_title("  {a}   {b}  ", &data), "x y");
    }

    #[test]
    fn resolve_array_index_step() {
        let data = json!({"tags": ["alpha", "beta"]});
        assert_eq!(derive_title("{tags.1}", &data), "beta");
    }

    #[test]
    fn pretty_scalars() {
        assert_eq!(pretty_inline(&json!("hi")), "hi");
        assert_eq!(pretty_inline(&json!(42)), "42");
        assert_eq!(pretty_inline(&json!(true)), "true");
        assert_eq!(pretty_inline(&json!(null)), "");
    }

    #[test]
    fn pretty_array_joins_non_empty() {
        assert_eq!(pretty_inline(&json!(["a", "", "b", null])), "a, b");
    }

    #[test]
    fn pretty_name_object() {
        let v = json!({"title": "Dr.", "first": "Grace", "last": "Hopper", "suffix": "PhD"});
        assert_eq!(pretty_inline(&v), "Dr. Grace Hopper PhD");
    }

    #[test]
    fn pretty_name_object_omits_empty_parts() {
        let v = json!({"first": "Grace", "middle": "", "last": "Hopper"});
        assert_eq!(pretty_inline(&v), "Grace Hopper");
    }

    #[test]
    fn pretty_other_object_falls_back_to_json() {
        assert_eq!(pretty_inline(&json!({"lat": 1})), r#"{"lat":1}"#);
    }

    #[test]
    fn row_label_with_index_and_subfield() {
        let row = json!({"city": "Oslo"});
        assert_eq!(render_row_label("{#}. {city}", &row, 2), "3. Oslo");
    }

    #[test]
    fn blank_row_label_parts_collapse() {
        let row = json!({});
        assert_eq!(render_row_label("Stop {#} {city}", &row, 0), "Stop 1");
    }

    #[test]
    fn derive_is_deterministic() {
        let data = json!({"a": [1, {"first": "X"}]});
        let first = derive_title("{a}", &data);
        assert_eq!(derive_title("{a}", &data), first);
    }
}
