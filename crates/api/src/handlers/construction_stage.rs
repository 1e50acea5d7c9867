//! Handlers for the `/construction-stages` resource.
//!
//! Bodies are read as generic JSON and mapped into [`StageInput`]; creates run
//! the full rule set, updates only check the status before merging over the
//! stored row.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;
use stages_core::construction_stage::StageInput;
use stages_core::error::CoreError;
use stages_core::types::DbId;
use stages_db::models::construction_stage::ConstructionStage;
use stages_db::repositories::ConstructionStageRepo;

use crate::error::{AppError, AppResult};
use crate::response::ApiResponse;
use crate::state::AppState;

pub const UPDATED_MESSAGE: &str = "Record updated successfully.";
pub const DELETED_MESSAGE: &str = "Record deleted successfully.";

type StagesResponse = Json<ApiResponse<Vec<ConstructionStage>>>;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "ConstructionStage",
        id,
    })
}

/// GET /construction-stages
pub async fn list(State(state): State<AppState>) -> AppResult<StagesResponse> {
    let stages = ConstructionStageRepo::list(&state.pool).await?;
    Ok(Json(ApiResponse::with_data(stages)))
}

/// GET /construction-stages/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<StagesResponse> {
    let Path(id) = path?;
    let stage = ConstructionStageRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ApiResponse::with_data(vec![stage])))
}

/// POST /construction-stages
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, StagesResponse)> {
    let Json(body) = body?;
    let stage = StageInput::from_value(&body)?.validate()?;

    let created = ConstructionStageRepo::create(&state.pool, &stage).await?;
    tracing::info!(
        stage_id = created.id,
        status = %created.status,
        "Construction stage created"
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::with_data(vec![created]))))
}

/// PUT | PATCH /construction-stages/{id}
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<StagesResponse> {
    let Path(id) = path?;
    let Json(body) = body?;
    let input = StageInput::from_value(&body)?;
    input.validate_status_only()?;

    let existing = ConstructionStageRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let patch = input.resolve_patch(&existing.schedule())?;

    let updated = ConstructionStageRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        stage_id = id,
        status = %updated.status,
        "Construction stage updated"
    );

    Ok(Json(ApiResponse::with_message_and_data(
        UPDATED_MESSAGE,
        vec![updated],
    )))
}

/// DELETE /construction-stages/{id}
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<Json<ApiResponse>> {
    let Path(id) = path?;
    if !ConstructionStageRepo::soft_delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(stage_id = id, "Construction stage soft-deleted");
    Ok(Json(ApiResponse::message(DELETED_MESSAGE)))
}
