use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

use super::model::{CoreSectionConfig, EditorView, ViewInput};
use super::select::select_effective;

#[derive(Debug, sqlx::FromRow)]
struct ViewRow {
    id: Uuid,
    content_type_id: Uuid,
    slug: String,
    label: String,
    roles: Value,
    default_roles: Value,
    priority: i32,
    is_default: bool,
    config: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ViewRow {
    fn into_view(self) -> EditorView {
        let core = self
            .config
            .get("core")
            .cloned()
            .map(|raw| serde_json::from_value(raw).unwrap_or_default())
            .unwrap_or_default();
        EditorView {
            id: self.id,
            content_type_id: self.content_type_id,
            slug: self.slug,
            label: self.label,
            roles: string_list(&self.roles),
            default_roles: string_list(&self.default_roles),
            priority: self.priority,
            is_default: self.is_default,
            core,
            // A stored null means "no sections configured", not an
            // empty collection.
            sections: self
                .config
                .get("sections")
                .filter(|v| !v.is_null())
                .cloned(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Editor-view storage and effective-view selection.
#[derive(Clone)]
pub struct ViewStore {
    pool: PgPool,
}

impl ViewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_type(&self, content_type_id: Uuid) -> CoreResult<Vec<EditorView>> {
        let rows: Vec<ViewRow> = sqlx::query_as(
            "SELECT id, content_type_id, slug, label, roles, default_roles, priority, is_default, \
             config, created_at, updated_at \
             FROM editor_views WHERE content_type_id = $1 ORDER BY priority DESC, slug",
        )
        .bind(content_type_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ViewRow::into_view).collect())
    }

    /// The effective view for a content type and acting role, or
    /// NotFound when the type has no views at all.
    pub async fn effective(&self, content_type_id: Uuid, role: &str) -> CoreResult<EditorView> {
        let views = self.list_for_type(content_type_id).await?;
        select_effective(&views, role)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("editor view for role {role}")))
    }

    /// Core config used by the write pipeline: the effective view's, or
    /// defaults when the content type has no views configured.
    pub async fn core_config_for(
        &self,
        content_type_id: Uuid,
        role: &str,
    ) -> CoreResult<CoreSectionConfig> {
        match self.effective(content_type_id, role).await {
            Ok(view) => Ok(view.core),
            Err(CoreError::NotFound(_)) => Ok(CoreSectionConfig::default()),
            Err(err) => Err(err),
        }
    }

    /// Insert or update the view at (content type, slug).
    pub async fn upsert(
        &self,
        content_type_id: Uuid,
        slug: &str,
        input: ViewInput,
    ) -> CoreResult<EditorView> {
        if slug.trim().is_empty() {
            return Err(CoreError::Validation("view slug is required".into()));
        }
        if input.label.trim().is_empty() {
            return Err(CoreError::Validation("view label is required".into()));
        }

        let config = json!({
            "core": input.core.unwrap_or_default(),
            "sections": input.sections,
        });

        let row: ViewRow = sqlx::query_as(
            r#"
            INSERT INTO editor_views
                (id, content_type_id, slug, label, roles, default_roles, priority, is_default, config)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (content_type_id, slug) DO UPDATE SET
                label = EXCLUDED.label,
                roles = EXCLUDED.roles,
                default_roles = EXCLUDED.default_roles,
                priority = EXCLUDED.priority,
                is_default = EXCLUDED.is_default,
                config = EXCLUDED.config,
                updated_at = now()
            RETURNING id, content_type_id, slug, label, roles, default_roles, priority, is_default,
                      config, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(content_type_id)
        .bind(slug.trim())
        .bind(input.label.trim())
        .bind(json!(input.roles))
        .bind(json!(input.default_roles))
        .bind(input.priority)
        .bind(input.is_default)
        .bind(&config)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_view())
    }
}
