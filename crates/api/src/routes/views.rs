use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use fieldframe_core::view::model::ViewInput;
use fieldframe_core::view::{compile_layout, CompiledSection, EditorView};

use crate::error::ApiResult;
use crate::middleware::auth::ActingRole;
use crate::state::AppState;

/// Editor-view routes: effective-view selection, compiled layouts, and
/// view upserts.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/types/{type}/views", get(list_views))
        .route("/v1/types/{type}/views/effective", get(effective_view))
        .route(
            "/v1/types/{type}/views/effective/layout",
            get(effective_layout),
        )
        .route("/v1/types/{type}/views/{slug}", put(upsert_view))
}

async fn list_views(
    State(state): State<AppState>,
    Path(type_slug): Path<String>,
) -> ApiResult<Json<Vec<EditorView>>> {
    let content_type = state.registry().get_content_type(&type_slug).await?;
    Ok(Json(state.views().list_for_type(content_type.id).await?))
}

async fn effective_view(
    State(state): State<AppState>,
    Path(type_slug): Path<String>,
    ActingRole(role): ActingRole,
) -> ApiResult<Json<EditorView>> {
    let content_type = state.registry().get_content_type(&type_slug).await?;
    Ok(Json(state.views().effective(content_type.id, &role).await?))
}

/// The effective view's layout, compiled against the current schema.
/// An empty array here with sections configured signals a broken view
/// config, deliberately not papered over with "all fields".
async fn effective_layout(
    State(state): State<AppState>,
    Path(type_slug): Path<String>,
    ActingRole(role): ActingRole,
) -> ApiResult<Json<Vec<CompiledSection>>> {
    let content_type = state.registry().get_content_type(&type_slug).await?;
    let view = state.views().effective(content_type.id, &role).await?;
    let layout = compile_layout(&content_type.fields, view.sections.as_ref());
    Ok(Json(layout))
}

async fn upsert_view(
    State(state): State<AppState>,
    Path((type_slug, view_slug)): Path<(String, String)>,
    Json(input): Json<ViewInput>,
) -> ApiResult<Json<EditorView>> {
    let content_type = state.registry().get_content_type(&type_slug).await?;
    Ok(Json(
        state.views().upsert(content_type.id, &view_slug, input).await?,
    ))
}
