pub mod content_types;
pub mod entries;
pub mod health;
pub mod views;

use axum::Router;

use crate::state::AppState;

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(content_types::routes())
        .merge(entries::routes())
        .merge(views::routes())
        .with_state(state)
}
