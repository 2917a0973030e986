//! The view-layout compiler: schema + section config in, renderable
//! sections out.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::schema::normalize::humanize;
use crate::schema::FieldDefinition;

/// Built-in keys that resolve to a placeholder when the schema does not
/// declare them as fields.
const BUILTIN_KEYS: [&str; 3] = ["title", "slug", "status"];

/// One compiled field row within a section.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledField {
    pub key: String,
    pub label: String,
    /// The field's type key, or `builtin` for placeholder rows.
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<FieldDefinition>,
}

/// One compiled section of the editor layout.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledSection {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub columns: u32,
    pub fields: Vec<CompiledField>,
}

/// Compile a view's section config against a content type's fields.
///
/// Fallback policy: when the view has no sections collection at all,
/// synthesize one section carrying every declared field in order. When a
/// sections collection exists but yields zero usable field rows, the
/// layout is empty; substituting "all fields" there would mask a broken
/// view config as if it worked.
pub fn compile_layout(
    fields: &[FieldDefinition],
    sections: Option<&Value>,
) -> Vec<CompiledSection> {
    let Some(sections) = sections else {
        return vec![synthesize_all_fields(fields)];
    };

    let by_key: BTreeMap<&str, &FieldDefinition> =
        fields.iter().map(|field| (field.key.as_str(), field)).collect();

    let configured = match sections.as_array() {
        Some(items) => items,
        // A present but non-array collection is a misconfiguration.
        None => return Vec::new(),
    };

    configured
        .iter()
        .enumerate()
        .filter_map(|(index, section)| compile_section(section, index, &by_key))
        .collect()
}

fn synthesize_all_fields(fields: &[FieldDefinition]) -> CompiledSection {
    CompiledSection {
        id: "main".to_string(),
        title: String::new(),
        description: String::new(),
        columns: 1,
        fields: fields
            .iter()
            .map(|field| CompiledField {
                key: field.key.clone(),
                label: field.label.clone(),
                field_type: field.field_type.as_key().to_string(),
                width: None,
                definition: Some(field.clone()),
            })
            .collect(),
    }
}

fn compile_section(
    section: &Value,
    index: usize,
    by_key: &BTreeMap<&str, &FieldDefinition>,
) -> Option<CompiledSection> {
    let refs = section.get("fields").and_then(Value::as_array)?;
    let compiled: Vec<CompiledField> = refs
        .iter()
        .filter_map(|field_ref| compile_field_ref(field_ref, by_key))
        .collect();
    if compiled.is_empty() {
        return None;
    }

    Some(CompiledSection {
        id: section
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("section-{index}")),
        title: section
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        description: section
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        columns: section_columns(section),
        fields: compiled,
    })
}

/// Column count from an explicit `columns` integer or a `layout` keyword.
fn section_columns(section: &Value) -> u32 {
    if let Some(n) = section.get("columns").and_then(Value::as_u64) {
        return (n as u32).max(1);
    }
    match section.get("layout").and_then(Value::as_str) {
        Some("two") => 2,
        Some("three") => 3,
        _ => 1,
    }
}

/// A field reference is a bare key string or an object exposing the key
/// under one of several legacy names, plus optional width and visible
/// flags. Unresolvable non-built-in keys are skipped.
fn compile_field_ref(
    field_ref: &Value,
    by_key: &BTreeMap<&str, &FieldDefinition>,
) -> Option<CompiledField> {
    let (key, width, visible) = match field_ref {
        Value::String(key) => (key.clone(), None, true),
        Value::Object(map) => {
            let key = ["key", "field_key", "fieldKey", "field", "id"]
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_str))?
                .to_string();
            let width = map
                .get("width")
                .or_else(|| map.get("colSpan"))
                .or_else(|| map.get("col_span"))
                .and_then(Value::as_u64)
                .map(|n| n as u32);
            let visible = map.get("visible").and_then(Value::as_bool).unwrap_or(true);
            (key, width, visible)
        }
        _ => return None,
    };
    if !visible || key.trim().is_empty() {
        return None;
    }

    if let Some(field) = by_key.get(key.as_str()) {
        return Some(CompiledField {
            key: field.key.clone(),
            label: field.label.clone(),
            field_type: field.field_type.as_key().to_string(),
            width,
            definition: Some((*field).clone()),
        });
    }

    if BUILTIN_KEYS.contains(&key.as_str()) {
        return Some(CompiledField {
            label: humanize(&key),
            key,
            field_type: "builtin".to_string(),
            width,
            definition: None,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;
    use serde_json::json;
    use uuid::Uuid;

    fn field(key: &str) -> FieldDefinition {
        FieldDefinition {
            id: Uuid::nil(),
            key: key.to_string(),
            label: humanize(key),
            field_type: FieldType::Text,
            required: false,
            help_text: String::new(),
            order_index: 0,
            config: json!({}),
        }
    }

    #[test]
    fn missing_sections_synthesizes_all_fields() {
        let fields = vec![field("a"), field("b")];
        let layout = compile_layout(&fields, None);
        assert_eq!(layout.len(), 1);
        let keys: Vec<&str> = layout[0].fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn present_but_empty_sections_compile_to_empty_layout() {
        let fields = vec![field("a")];
        let layout = compile_layout(&fields, Some(&json!([])));
        assert!(layout.is_empty());
    }

    #[test]
    fn sections_with_only_unresolvable_refs_compile_to_empty_layout() {
        let fields = vec![field("a")];
        let sections = json!([{"title": "Broken", "fields": ["ghost", "phantom"]}]);
        assert!(compile_layout(&fields, Some(&sections)).is_empty());
    }

    #[test]
    fn non_array_sections_value_is_misconfiguration() {
        let fields = vec![field("a")];
        assert!(compile_layout(&fields, Some(&json!({"oops": true}))).is_empty());
    }

    #[test]
    fn layout_keywords_map_to_columns() {
        let fields = vec![field("a")];
        let sections = json!([
            {"layout": "two", "fields": ["a"]},
            {"layout": "three", "fields": ["a"]},
            {"layout": "anything", "fields": ["a"]},
            {"columns": 4, "fields": ["a"]}
        ]);
        let layout = compile_layout(&fields, Some(&sections));
        let columns: Vec<u32> = layout.iter().map(|s| s.columns).collect();
        assert_eq!(columns, vec![2, 3, 1, 4]);
    }

    #[test]
    fn object_refs_expose_key_under_legacy_names() {
        let fields = vec![field("a"), field("b"), field("c")];
        let sections = json!([{
            "fields": [
                {"key": "a", "width": 6},
                {"field_key": "b", "colSpan": 3},
                {"field": "c"}
            ]
        }]);
        let layout = compile_layout(&fields, Some(&sections));
        let compiled = &layout[0].fields;
        assert_eq!(compiled.len(), 3);
        assert_eq!(compiled[0].width, Some(6));
        assert_eq!(compiled[1].width, Some(3));
        assert_eq!(compiled[2].key, "c");
    }

    #[test]
    fn invisible_refs_are_skipped() {
        let fields = vec![field("a"), field("b")];
        let sections = json!([{"fields": [{"key": "a", "visible": false}, "b"]}]);
        let layout = compile_layout(&fields, Some(&sections));
        assert_eq!(layout[0].fields.len(), 1);
        assert_eq!(layout[0].fields[0].key, "b");
    }

    #[test]
    fn builtin_keys_resolve_to_placeholders() {
        let fields = vec![field("a")];
        let sections = json!([{"fields": ["title", "status", "a"]}]);
        let layout = compile_layout(&fields, Some(&sections));
        let compiled = &layout[0].fields;
        assert_eq!(compiled[0].field_type, "builtin");
        assert_eq!(compiled[0].label, "Title");
        assert!(compiled[0].definition.is_none());
        assert_eq!(compiled[2].field_type, "text");
    }

    #[test]
    fn schema_fields_shadow_builtin_placeholders() {
        let fields = vec![field("title")];
        let sections = json!([{"fields": ["title"]}]);
        let layout = compile_layout(&fields, Some(&sections));
        assert_eq!(layout[0].fields[0].field_type, "text");
        assert!(layout[0].fields[0].definition.is_some());
    }

    #[test]
    fn empty_sections_are_dropped_but_usable_ones_kept() {
        let fields = vec![field("a")];
        let sections = json!([
            {"title": "Empty", "fields": []},
            {"title": "Main", "fields": ["a"]}
        ]);
        let layout = compile_layout(&fields, Some(&sections));
        assert_eq!(layout.len(), 1);
        assert_eq!(layout[0].title, "Main");
    }
}
