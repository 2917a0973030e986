use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// How an entry's title is produced under a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleMode {
    Manual,
    Template,
}

/// Core-section configuration of a view: the built-in title/slug/status
/// row above the schema-driven sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreSectionConfig {
    pub title_label: String,
    pub slug_label: String,
    pub status_label: String,
    pub show_title: bool,
    pub show_slug: bool,
    pub show_status: bool,
    #[serde(alias = "titleMode")]
    pub title_mode: TitleMode,
    #[serde(alias = "titleTemplate")]
    pub title_template: String,
    #[serde(alias = "autoSlugFromTitleIfEmpty")]
    pub auto_slug_from_title: bool,
}

impl Default for CoreSectionConfig {
    fn default() -> Self {
        Self {
            title_label: "Title".to_string(),
            slug_label: "Slug".to_string(),
            status_label: "Status".to_string(),
            show_title: true,
            show_slug: true,
            show_status: true,
            title_mode: TitleMode::Manual,
            title_template: String::new(),
            auto_slug_from_title: true,
        }
    }
}

/// A role-scoped presentation layout over one content type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorView {
    pub id: Uuid,
    pub content_type_id: Uuid,
    pub slug: String,
    pub label: String,
    pub roles: Vec<String>,
    pub default_roles: Vec<String>,
    pub priority: i32,
    pub is_default: bool,
    pub core: CoreSectionConfig,
    /// Raw section configuration; compiled on demand against the
    /// content type's fields. `None` means no sections were configured.
    pub sections: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller payload for upserting a view.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewInput {
    pub label: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, alias = "defaultRoles")]
    pub default_roles: Vec<String>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default, alias = "isDefault")]
    pub is_default: bool,
    #[serde(default)]
    pub core: Option<CoreSectionConfig>,
    #[serde(default)]
    pub sections: Option<Value>,
}
