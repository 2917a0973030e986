use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

use super::normalize::{humanize, normalize_config, to_snake_case};
use super::types::{ContentType, ContentTypeKind, FieldDefinition, FieldInput, FieldType};

/// Caller-supplied description of a new content type.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewContentType {
    pub slug: String,
    #[serde(default = "default_kind")]
    pub kind: ContentTypeKind,
    pub label_singular: String,
    pub label_plural: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

fn default_kind() -> ContentTypeKind {
    ContentTypeKind::Content
}

/// Row shape of the `fields` table.
#[derive(Debug, sqlx::FromRow)]
struct FieldRow {
    id: Uuid,
    key: String,
    label: String,
    field_type: String,
    required: bool,
    help_text: String,
    order_index: i32,
    config: Value,
}

impl FieldRow {
    fn into_definition(self) -> FieldDefinition {
        let field_type = FieldType::parse(&self.field_type);
        FieldDefinition {
            id: self.id,
            key: self.key,
            label: self.label,
            field_type,
            required: self.required,
            help_text: self.help_text,
            order_index: self.order_index,
            config: normalize_config(field_type, &self.config),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ContentTypeRow {
    id: Uuid,
    slug: String,
    kind: String,
    label_singular: String,
    label_plural: String,
    description: String,
    icon: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContentTypeRow {
    fn into_content_type(self, fields: Vec<FieldDefinition>) -> ContentType {
        ContentType {
            id: self.id,
            slug: self.slug,
            kind: ContentTypeKind::parse(&self.kind),
            label_singular: self.label_singular,
            label_plural: self.label_plural,
            description: self.description,
            icon: self.icon,
            created_at: self.created_at,
            updated_at: self.updated_at,
            fields,
        }
    }
}

/// The single writer of schema. Owns content-type and field rows and is
/// the only place stored field configs are read in raw form.
#[derive(Clone)]
pub struct SchemaRegistry {
    pool: PgPool,
}

impl SchemaRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_content_type(&self, input: NewContentType) -> CoreResult<ContentType> {
        let slug = input.slug.trim().to_string();
        if slug.is_empty() {
            return Err(CoreError::Validation("content type slug is required".into()));
        }
        if input.label_singular.trim().is_empty() || input.label_plural.trim().is_empty() {
            return Err(CoreError::Validation(
                "content type labels are required".into(),
            ));
        }

        let row: ContentTypeRow = sqlx::query_as(
            r#"
            INSERT INTO content_types (id, slug, kind, label_singular, label_plural, description, icon)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, slug, kind, label_singular, label_plural, description, icon, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&slug)
        .bind(input.kind.as_str())
        .bind(input.label_singular.trim())
        .bind(input.label_plural.trim())
        .bind(&input.description)
        .bind(&input.icon)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if CoreError::is_unique_violation(&err) {
                CoreError::Conflict(format!("content type slug already exists: {slug}"))
            } else {
                err.into()
            }
        })?;

        Ok(row.into_content_type(Vec::new()))
    }

    pub async fn list_content_types(&self) -> CoreResult<Vec<ContentType>> {
        let rows: Vec<ContentTypeRow> = sqlx::query_as(
            "SELECT id, slug, kind, label_singular, label_plural, description, icon, created_at, updated_at \
             FROM content_types ORDER BY slug",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_content_type(Vec::new()))
            .collect())
    }

    /// Fetch a content type by slug, with its ordered, normalized fields.
    pub async fn get_content_type(&self, slug: &str) -> CoreResult<ContentType> {
        let row: ContentTypeRow = sqlx::query_as(
            "SELECT id, slug, kind, label_singular, label_plural, description, icon, created_at, updated_at \
             FROM content_types WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("content type: {slug}")))?;

        let fields = self.get_fields(row.id).await?;
        Ok(row.into_content_type(fields))
    }

    /// Ordered field list for a content type, configs normalized.
    pub async fn get_fields(&self, content_type_id: Uuid) -> CoreResult<Vec<FieldDefinition>> {
        let rows: Vec<FieldRow> = sqlx::query_as(
            "SELECT id, key, label, field_type, required, help_text, order_index, config \
             FROM fields WHERE content_type_id = $1 ORDER BY order_index",
        )
        .bind(content_type_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(FieldRow::into_definition).collect())
    }

    /// Replace a content type's field list as a single ordered set.
    ///
    /// Full-replace semantics: the caller supplies the complete list. The
    /// registry diffs against storage by canonical key so unchanged keys
    /// keep their row ids; missing keys are deleted, order indexes are
    /// rewritten from list position.
    pub async fn replace_fields(
        &self,
        content_type_id: Uuid,
        inputs: Vec<FieldInput>,
    ) -> CoreResult<Vec<FieldDefinition>> {
        let mut seen = std::collections::BTreeSet::new();
        let mut canonical = Vec::with_capacity(inputs.len());
        for input in inputs {
            let key = to_snake_case(input.key.trim());
            if key.is_empty() {
                return Err(CoreError::Validation("field key is required".into()));
            }
            if !seen.insert(key.clone()) {
                return Err(CoreError::Validation(format!("duplicate field key: {key}")));
            }
            canonical.push((key, input));
        }

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT id, key FROM fields WHERE content_type_id = $1")
            .bind(content_type_id)
            .fetch_all(&mut *tx)
            .await?;
        let mut existing_by_key: std::collections::BTreeMap<String, Uuid> = existing
            .iter()
            .map(|row| (row.get::<String, _>("key"), row.get::<Uuid, _>("id")))
            .collect();

        for (index, (key, input)) in canonical.iter().enumerate() {
            let label = if input.label.trim().is_empty() {
                humanize(key)
            } else {
                input.label.trim().to_string()
            };
            match existing_by_key.remove(key) {
                Some(id) => {
                    sqlx::query(
                        "UPDATE fields SET label = $2, field_type = $3, required = $4, \
                         help_text = $5, order_index = $6, config = $7 WHERE id = $1",
                    )
                    .bind(id)
                    .bind(&label)
                    .bind(input.field_type.as_key())
                    .bind(input.required)
                    .bind(&input.help_text)
                    .bind(index as i32)
                    .bind(&input.config)
                    .execute(&mut *tx)
                    .await?;
                }
                None => {
                    sqlx::query(
                        "INSERT INTO fields \
                         (id, content_type_id, key, label, field_type, required, help_text, order_index, config) \
                         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                    )
                    .bind(Uuid::now_v7())
                    .bind(content_type_id)
                    .bind(key)
                    .bind(&label)
                    .bind(input.field_type.as_key())
                    .bind(input.required)
                    .bind(&input.help_text)
                    .bind(index as i32)
                    .bind(&input.config)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        // Whatever was not re-supplied is gone.
        let removed: Vec<Uuid> = existing_by_key.into_values().collect();
        if !removed.is_empty() {
            sqlx::query("DELETE FROM fields WHERE id = ANY($1)")
                .bind(&removed)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        self.get_fields(content_type_id).await
    }
}
