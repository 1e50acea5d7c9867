pub mod construction_stage;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the resource route tree.
///
/// ```text
/// /construction-stages                 list, create
/// /construction-stages/{id}            get, update (PUT, PATCH), soft delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/construction-stages", construction_stage::router())
}
