use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::relation::ResolutionContext;

use super::model::{Entry, EntryStatus};
use super::pipeline::PreparedEntry;

#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    id: Uuid,
    content_type_id: Uuid,
    title: String,
    slug: String,
    status: String,
    data: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EntryRow {
    fn into_entry(self) -> Entry {
        Entry {
            id: self.id,
            content_type_id: self.content_type_id,
            title: self.title,
            slug: self.slug,
            status: EntryStatus::parse(&self.status),
            data: self.data,
            created_at: self.created_at,
            updated_at: self.updated_at,
            relations: ResolutionContext::default(),
        }
    }
}

const ENTRY_COLUMNS: &str =
    "id, content_type_id, title, slug, status, data, created_at, updated_at";

/// Entry persistence. The unique constraint on (content_type_id, slug)
/// is the sole concurrency guard; collisions surface as Conflict.
#[derive(Clone)]
pub struct EntryStore {
    pool: PgPool,
}

impl EntryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, content_type_id: Uuid) -> CoreResult<Vec<Entry>> {
        let rows: Vec<EntryRow> = sqlx::query_as(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE content_type_id = $1 ORDER BY updated_at DESC",
        ))
        .bind(content_type_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(EntryRow::into_entry).collect())
    }

    /// Fetch by id when the reference parses as a UUID, by slug
    /// otherwise.
    pub async fn get(&self, content_type_id: Uuid, id_or_slug: &str) -> CoreResult<Entry> {
        let row: Option<EntryRow> = match Uuid::parse_str(id_or_slug) {
            Ok(id) => {
                sqlx::query_as(&format!(
                    "SELECT {ENTRY_COLUMNS} FROM entries WHERE content_type_id = $1 AND id = $2",
                ))
                .bind(content_type_id)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
            }
            Err(_) => {
                sqlx::query_as(&format!(
                    "SELECT {ENTRY_COLUMNS} FROM entries WHERE content_type_id = $1 AND slug = $2",
                ))
                .bind(content_type_id)
                .bind(id_or_slug)
                .fetch_optional(&self.pool)
                .await?
            }
        };
        row.map(EntryRow::into_entry)
            .ok_or_else(|| CoreError::NotFound(format!("entry: {id_or_slug}")))
    }

    pub async fn insert(
        &self,
        content_type_id: Uuid,
        prepared: PreparedEntry,
    ) -> CoreResult<Entry> {
        let row: EntryRow = sqlx::query_as(&format!(
            "INSERT INTO entries (id, content_type_id, title, slug, status, data) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {ENTRY_COLUMNS}",
        ))
        .bind(Uuid::now_v7())
        .bind(content_type_id)
        .bind(&prepared.title)
        .bind(&prepared.slug)
        .bind(prepared.status.as_str())
        .bind(&prepared.data)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| Self::map_slug_conflict(err, &prepared.slug))?;
        Ok(row.into_entry())
    }

    /// Update in place, snapshotting the previous state into the
    /// version history first.
    pub async fn update(&self, current: &Entry, prepared: PreparedEntry) -> CoreResult<Entry> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO entry_versions (id, entry_id, title, slug, status, data) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(Uuid::now_v7())
        .bind(current.id)
        .bind(&current.title)
        .bind(&current.slug)
        .bind(current.status.as_str())
        .bind(&current.data)
        .execute(&mut *tx)
        .await?;

        let row: EntryRow = sqlx::query_as(&format!(
            "UPDATE entries SET title = $2, slug = $3, status = $4, data = $5, updated_at = now() \
             WHERE id = $1 RETURNING {ENTRY_COLUMNS}",
        ))
        .bind(current.id)
        .bind(&prepared.title)
        .bind(&prepared.slug)
        .bind(prepared.status.as_str())
        .bind(&prepared.data)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| Self::map_slug_conflict(err, &prepared.slug))?;

        tx.commit().await?;
        Ok(row.into_entry())
    }

    /// Delete an entry and its version history.
    pub async fn delete(&self, entry_id: Uuid) -> CoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM entry_versions WHERE entry_id = $1")
            .bind(entry_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM entries WHERE id = $1")
            .bind(entry_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    fn map_slug_conflict(err: sqlx::Error, slug: &str) -> CoreError {
        if CoreError::is_unique_violation(&err) {
            CoreError::Conflict(format!("entry slug already exists: {slug}"))
        } else {
            err.into()
        }
    }
}
