use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use fieldframe_core::schema::registry::NewContentType;
use fieldframe_core::schema::{ContentType, FieldDefinition, FieldInput};

use crate::error::ApiResult;
use crate::state::AppState;

/// Schema registry routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/types", get(list_types).post(create_type))
        .route("/v1/types/{type}", get(get_type))
        .route("/v1/types/{type}/fields", get(get_fields).put(replace_fields))
}

async fn list_types(State(state): State<AppState>) -> ApiResult<Json<Vec<ContentType>>> {
    Ok(Json(state.registry().list_content_types().await?))
}

async fn create_type(
    State(state): State<AppState>,
    Json(input): Json<NewContentType>,
) -> ApiResult<Json<ContentType>> {
    Ok(Json(state.registry().create_content_type(input).await?))
}

async fn get_type(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ContentType>> {
    Ok(Json(state.registry().get_content_type(&slug).await?))
}

async fn get_fields(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Vec<FieldDefinition>>> {
    let content_type = state.registry().get_content_type(&slug).await?;
    Ok(Json(content_type.fields))
}

/// Full-replace of the type's ordered field list.
async fn replace_fields(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(inputs): Json<Vec<FieldInput>>,
) -> ApiResult<Json<Vec<FieldDefinition>>> {
    let content_type = state.registry().get_content_type(&slug).await?;
    let fields = state
        .registry()
        .replace_fields(content_type.id, inputs)
        .await?;
    Ok(Json(fields))
}
