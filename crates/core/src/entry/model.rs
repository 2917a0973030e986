use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::relation::ResolutionContext;

/// Lifecycle status of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Draft,
    Published,
    Archived,
}

impl EntryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryStatus::Draft => "draft",
            EntryStatus::Published => "published",
            EntryStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "published" => EntryStatus::Published,
            "archived" => EntryStatus::Archived,
            _ => EntryStatus::Draft,
        }
    }
}

/// One record conforming to a content type's schema.
///
/// `relations` is the per-request resolution context; it is attached on
/// every read path, possibly empty, never absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: Uuid,
    pub content_type_id: Uuid,
    pub title: String,
    pub slug: String,
    pub status: EntryStatus,
    /// Field key to value, shape dependent on field type.
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub relations: ResolutionContext,
}

/// Caller payload for create/update. All parts optional; the write
/// pipeline fills in derived title and slug.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub status: Option<EntryStatus>,
    pub data: Option<Value>,
}
