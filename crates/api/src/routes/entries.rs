use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use fieldframe_core::entry::{prepare_entry_write, Entry, EntryInput};
use fieldframe_core::relation::RelationTarget;
use fieldframe_core::schema::ContentType;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::middleware::auth::ActingRole;
use crate::state::AppState;

/// Entry CRUD routes. Writes run the normalization and title-derivation
/// pipeline before persistence; reads attach a relation-resolution
/// context to every entry.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/types/{type}/entries",
            get(list_entries).post(create_entry),
        )
        .route(
            "/v1/types/{type}/entries/{id_or_slug}",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .route("/v1/types/{type}/relation-targets", get(relation_targets))
}

async fn load_type(state: &AppState, slug: &str) -> ApiResult<ContentType> {
    Ok(state.registry().get_content_type(slug).await?)
}

async fn list_entries(
    State(state): State<AppState>,
    Path(type_slug): Path<String>,
) -> ApiResult<Json<Vec<Entry>>> {
    let content_type = load_type(&state, &type_slug).await?;
    let mut entries = state.entries().list(content_type.id).await?;
    state
        .resolver()
        .resolve(&content_type.fields, &mut entries)
        .await;
    Ok(Json(entries))
}

async fn get_entry(
    State(state): State<AppState>,
    Path((type_slug, id_or_slug)): Path<(String, String)>,
) -> ApiResult<Json<Entry>> {
    let content_type = load_type(&state, &type_slug).await?;
    let entry = state.entries().get(content_type.id, &id_or_slug).await?;
    let mut batch = vec![entry];
    state
        .resolver()
        .resolve(&content_type.fields, &mut batch)
        .await;
    Ok(Json(batch.remove(0)))
}

async fn create_entry(
    State(state): State<AppState>,
    Path(type_slug): Path<String>,
    ActingRole(role): ActingRole,
    Json(input): Json<EntryInput>,
) -> ApiResult<Json<Entry>> {
    let content_type = load_type(&state, &type_slug).await?;
    let core = state.views().core_config_for(content_type.id, &role).await?;
    let prepared = prepare_entry_write(&content_type.fields, &core, &input, None)?;
    let entry = state.entries().insert(content_type.id, prepared).await?;
    Ok(Json(entry))
}

async fn update_entry(
    State(state): State<AppState>,
    Path((type_slug, id_or_slug)): Path<(String, String)>,
    ActingRole(role): ActingRole,
    Json(input): Json<EntryInput>,
) -> ApiResult<Json<Entry>> {
    let content_type = load_type(&state, &type_slug).await?;
    let current = state.entries().get(content_type.id, &id_or_slug).await?;
    let core = state.views().core_config_for(content_type.id, &role).await?;
    let prepared = prepare_entry_write(&content_type.fields, &core, &input, Some(&current))?;
    let entry = state.entries().update(&current, prepared).await?;
    Ok(Json(entry))
}

async fn delete_entry(
    State(state): State<AppState>,
    Path((type_slug, id_or_slug)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let content_type = load_type(&state, &type_slug).await?;
    let entry = state.entries().get(content_type.id, &id_or_slug).await?;
    state.entries().delete(entry.id).await?;
    Ok(Json(json!({ "ok": true })))
}

/// Id/title pairs for the presentation layer to resolve generic
/// `relation` fields lazily, one content type at a time.
async fn relation_targets(
    State(state): State<AppState>,
    Path(type_slug): Path<String>,
) -> ApiResult<Json<Vec<RelationTarget>>> {
    let content_type = load_type(&state, &type_slug).await?;
    Ok(Json(
        state.resolver().list_relation_targets(content_type.id).await?,
    ))
}
