//! Relation resolution: batched expansion of stored user references
//! into displayable records, attached to every entry a read returns.
//!
//! The pure pieces (config extraction, id collection, context assembly)
//! are separated from the single batched store lookup so the read path
//! can degrade to an empty context when the lookup fails.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entry::Entry;
use crate::error::CoreResult;
use crate::schema::{FieldDefinition, FieldType};

/// How a resolved user is displayed by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserDisplay {
    NameEmail,
    Name,
    Email,
}

/// Per-field configuration of a `relation_user` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFieldConfig {
    pub multiple: bool,
    pub display: UserDisplay,
    pub role_filter: Option<String>,
    pub only_active: bool,
}

/// Shape of the external user record source.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub status: String,
}

/// Ephemeral per-entry lookup context. Always present on read paths,
/// possibly with empty maps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolutionContext {
    pub user_fields: BTreeMap<String, UserFieldConfig>,
    pub users_by_id: BTreeMap<Uuid, UserRecord>,
}

/// An id/title pair for lazily resolving generic `relation` fields.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RelationTarget {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
}

/// Extract the user-reference field configs from a schema.
pub fn user_field_configs(fields: &[FieldDefinition]) -> BTreeMap<String, UserFieldConfig> {
    fields
        .iter()
        .filter(|field| field.field_type == FieldType::RelationUser)
        .map(|field| {
            let config = &field.config;
            let display = match config
                .get("display")
                .and_then(Value::as_str)
                .unwrap_or("name_email")
            {
                "name" => UserDisplay::Name,
                "email" => UserDisplay::Email,
                _ => UserDisplay::NameEmail,
            };
            let parsed = UserFieldConfig {
                multiple: config
                    .get("multiple")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                display,
                role_filter: config
                    .get("role_filter")
                    .or_else(|| config.get("roleFilter"))
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
                only_active: config
                    .get("only_active")
                    .or_else(|| config.get("onlyActive"))
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            };
            (field.key.clone(), parsed)
        })
        .collect()
}

/// Collect every referenced user id across all entries. Scalar and
/// array values are accepted; anything that does not parse as a UUID is
/// ignored.
pub fn collect_user_ids<'a>(
    field_keys: impl IntoIterator<Item = &'a String>,
    entries: &[Entry],
) -> BTreeSet<Uuid> {
    let keys: Vec<&String> = field_keys.into_iter().collect();
    let mut ids = BTreeSet::new();
    for entry in entries {
        for key in &keys {
            match entry.data.get(key.as_str()) {
                Some(Value::String(s)) => {
                    if let Ok(id) = Uuid::parse_str(s) {
                        ids.insert(id);
                    }
                }
                Some(Value::Array(items)) => {
                    for item in items {
                        if let Some(id) = item.as_str().and_then(|s| Uuid::parse_str(s).ok()) {
                            ids.insert(id);
                        }
                    }
                }
                _ => {}
            }
        }
    }
    ids
}

/// Batched user-reference resolver backed by the users table.
#[derive(Clone)]
pub struct RelationResolver {
    pool: PgPool,
}

impl RelationResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach a resolution context to every entry in the batch.
    ///
    /// One batched lookup per call. A failed lookup degrades to an empty
    /// user map rather than failing the read.
    pub async fn resolve(&self, fields: &[FieldDefinition], entries: &mut [Entry]) {
        let configs = user_field_configs(fields);
        let ids: Vec<Uuid> = collect_user_ids(configs.keys(), entries).into_iter().collect();

        let users_by_id = if ids.is_empty() {
            BTreeMap::new()
        } else {
            match self.fetch_users(&ids).await {
                Ok(users) => users.into_iter().map(|u| (u.id, u)).collect(),
                Err(err) => {
                    tracing::warn!(%err, "user reference lookup failed, returning empty context");
                    BTreeMap::new()
                }
            }
        };

        for entry in entries {
            entry.relations = ResolutionContext {
                user_fields: configs.clone(),
                users_by_id: users_by_id.clone(),
            };
        }
    }

    async fn fetch_users(&self, ids: &[Uuid]) -> Result<Vec<UserRecord>, sqlx::Error> {
        sqlx::query_as("SELECT id, email, name, role, status FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
    }

    /// Id/title pairs for a content type's entries, for the presentation
    /// layer to resolve generic `relation` fields lazily.
    pub async fn list_relation_targets(
        &self,
        content_type_id: Uuid,
    ) -> CoreResult<Vec<RelationTarget>> {
        let targets = sqlx::query_as(
            "SELECT id, title, slug FROM entries WHERE content_type_id = $1 ORDER BY title",
        )
        .bind(content_type_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn user_field(key: &str, config: Value) -> FieldDefinition {
        FieldDefinition {
            id: Uuid::nil(),
            key: key.to_string(),
            label: key.to_string(),
            field_type: FieldType::RelationUser,
            required: false,
            help_text: String::new(),
            order_index: 0,
            config,
        }
    }

    fn entry(data: Value) -> Entry {
        Entry {
            id: Uuid::nil(),
            content_type_id: Uuid::nil(),
            title: String::new(),
            slug: String::new(),
            status: crate::entry::EntryStatus::Draft,
            data,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            relations: ResolutionContext::default(),
        }
    }

    #[test]
    fn config_defaults_and_aliases() {
        let fields = vec![user_field(
            "owner",
            json!({"roleFilter": "ADMIN", "onlyActive": true}),
        )];
        let configs = user_field_configs(&fields);
        let config = &configs["owner"];
        assert!(!config.multiple);
        assert_eq!(config.display, UserDisplay::NameEmail);
        assert_eq!(config.role_filter.as_deref(), Some("ADMIN"));
        assert!(config.only_active);
    }

    #[test]
    fn non_user_fields_are_ignored() {
        let mut field = user_field("plain", json!({}));
        field.field_type = FieldType::Relation;
        assert!(user_field_configs(&[field]).is_empty());
    }

    #[test]
    fn collects_scalar_and_array_ids() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let fields = vec![user_field("owner", json!({})), user_field("reviewers", json!({}))];
        let configs = user_field_configs(&fields);
        let entries = vec![
            entry(json!({"owner": a.to_string()})),
            entry(json!({"reviewers": [b.to_string(), "not-a-uuid", 7]})),
        ];
        let ids = collect_user_ids(configs.keys(), &entries);
        assert!(ids.contains(&a));
        assert!(ids.contains(&b));
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn ignores_values_outside_user_fields() {
        let fields = vec![user_field("owner", json!({}))];
        let configs = user_field_configs(&fields);
        let entries = vec![entry(json!({"other": Uuid::now_v7().to_string()}))];
        assert!(collect_user_ids(configs.keys(), &entries).is_empty());
    }
}
