use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use fieldframe_template::RuleOperator;

/// Kind of a content type: free-form content or a taxonomy vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentTypeKind {
    Content,
    Taxonomy,
}

impl ContentTypeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentTypeKind::Content => "content",
            ContentTypeKind::Taxonomy => "taxonomy",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "taxonomy" => ContentTypeKind::Taxonomy,
            _ => ContentTypeKind::Content,
        }
    }
}

/// The closed set of field types an operator can attach to a content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Boolean,
    Date,
    Datetime,
    Time,
    Daterange,
    Email,
    Phone,
    Url,
    Address,
    Name,
    RichText,
    Image,
    File,
    Video,
    Color,
    Tags,
    Radio,
    Dropdown,
    Multiselect,
    Checkbox,
    Relation,
    RelationUser,
    Taxonomy,
    Repeater,
    Json,
    Embeds,
}

impl FieldType {
    /// Canonical storage key for this type.
    pub fn as_key(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            FieldType::Time => "time",
            FieldType::Daterange => "daterange",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Url => "url",
            FieldType::Address => "address",
            FieldType::Name => "name",
            FieldType::RichText => "rich_text",
            FieldType::Image => "image",
            FieldType::File => "file",
            FieldType::Video => "video",
            FieldType::Color => "color",
            FieldType::Tags => "tags",
            FieldType::Radio => "radio",
            FieldType::Dropdown => "dropdown",
            FieldType::Multiselect => "multiselect",
            FieldType::Checkbox => "checkbox",
            FieldType::Relation => "relation",
            FieldType::RelationUser => "relation_user",
            FieldType::Taxonomy => "taxonomy",
            FieldType::Repeater => "repeater",
            FieldType::Json => "json",
            FieldType::Embeds => "embeds",
        }
    }

    /// Parse a stored type key. Unknown keys fall back to `text` so a
    /// schema row written by a newer version still loads.
    pub fn parse(key: &str) -> Self {
        serde_json::from_value(Value::String(key.to_string())).unwrap_or_else(|_| {
            tracing::warn!(key, "unknown field type, falling back to text");
            FieldType::Text
        })
    }

    /// Choice types always expose a `choices` array in their config.
    pub fn is_choice(self) -> bool {
        matches!(
            self,
            FieldType::Radio | FieldType::Dropdown | FieldType::Multiselect | FieldType::Checkbox
        )
    }

    /// Composite types carry a per-subkey subfield schema.
    pub fn is_composite(self) -> bool {
        matches!(
            self,
            FieldType::Name
                | FieldType::Address
                | FieldType::Image
                | FieldType::File
                | FieldType::Video
        )
    }

    /// Types whose values pass through a dedicated canonicalizer on write.
    pub fn is_canonicalized(self) -> bool {
        matches!(
            self,
            FieldType::Email | FieldType::Phone | FieldType::Url | FieldType::Address
        )
    }
}

/// One typed, configurable slot within a content type's schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: Uuid,
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    #[serde(default)]
    pub help_text: String,
    pub order_index: i32,
    /// Type-specific configuration, normalized to canonical shape.
    pub config: Value,
}

/// Caller-supplied field description for `replace_fields`. Order comes
/// from list position; stable ids are preserved by key.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldInput {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub help_text: String,
    #[serde(default)]
    pub config: Value,
}

/// A user-defined schema with an ordered field list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentType {
    pub id: Uuid,
    pub slug: String,
    pub kind: ContentTypeKind,
    pub label_singular: String,
    pub label_plural: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

/// Per-subkey display config of a composite field (name/address/media).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubfieldConfig {
    pub show: bool,
    pub label: String,
}

/// Ordered map of subkey to its config; keys follow the type's known
/// subkey list, unknown keys are pruned during normalization.
pub type SubfieldSchema = std::collections::BTreeMap<String, SubfieldConfig>;

/// Layout of a repeater's rows in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeaterLayout {
    Cards,
    Table,
}

/// What a matching visibility rule does to its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    Show,
    Hide,
}

/// One conditional-visibility rule over a repeater row's subfields.
///
/// Rules run in declared order; the last matching rule wins per target.
/// Targets that are not sibling subfields are no-ops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityRule {
    #[serde(alias = "ifKey")]
    pub if_key: String,
    pub operator: RuleOperator,
    #[serde(default, alias = "comparisonValue", alias = "value")]
    pub comparison_value: Value,
    pub action: RuleAction,
    #[serde(default, alias = "targetKeys")]
    pub target_keys: Vec<String>,
}

/// Parsed configuration of a `repeater` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepeaterConfig {
    pub min_rows: usize,
    /// `None` means unbounded.
    pub max_rows: Option<usize>,
    pub add_label: String,
    pub layout: RepeaterLayout,
    /// Deepest nesting level that is still live; always at least 1.
    pub max_depth: usize,
    pub row_label_template: String,
    /// Ordered nested schema; may itself contain repeater subfields.
    pub subfields: Vec<FieldDefinition>,
    pub rules: Vec<VisibilityRule>,
}

impl Default for RepeaterConfig {
    fn default() -> Self {
        Self {
            min_rows: 0,
            max_rows: None,
            add_label: "Add row".to_string(),
            layout: RepeaterLayout::Cards,
            max_depth: 1,
            row_label_template: String::new(),
            subfields: Vec::new(),
            rules: Vec::new(),
        }
    }
}
