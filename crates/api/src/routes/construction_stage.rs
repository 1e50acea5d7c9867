//! Route definitions for the `/construction-stages` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::construction_stage;
use crate::state::AppState;

/// Routes mounted at `/construction-stages`.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> create
/// GET    /{id}    -> get_by_id
/// PUT    /{id}    -> update
/// PATCH  /{id}    -> update
/// DELETE /{id}    -> delete (soft)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(construction_stage::list).post(construction_stage::create),
        )
        .route(
            "/{id}",
            get(construction_stage::get_by_id)
                .put(construction_stage::update)
                .patch(construction_stage::update)
                .delete(construction_stage::delete),
        )
}
