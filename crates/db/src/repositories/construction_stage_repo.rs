//! Repository for the `construction_stages` table.

use sqlx::SqlitePool;
use stages_core::construction_stage::{NewStage, StagePatch, StageStatus};
use stages_core::types::{DbId, Timestamp};

use crate::models::construction_stage::ConstructionStage;

/// Column list shared across queries. Timestamps are shaped into ISO-8601
/// UTC with a trailing `Z` on the way out.
const COLUMNS: &str = "ID AS id, \
     name, \
     strftime('%Y-%m-%dT%H:%M:%SZ', start_date) AS start_date, \
     strftime('%Y-%m-%dT%H:%M:%SZ', end_date) AS end_date, \
     duration, \
     durationUnit AS duration_unit, \
     color, \
     externalId AS external_id, \
     status";

/// Layout timestamps are written in.
const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn to_storage(ts: Timestamp) -> String {
    ts.format(STORAGE_FORMAT).to_string()
}

/// Provides list, fetch, insert, partial update and soft delete for stages.
pub struct ConstructionStageRepo;

impl ConstructionStageRepo {
    /// List every stage in insertion order, soft-deleted ones included.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<ConstructionStage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM construction_stages");
        sqlx::query_as::<_, ConstructionStage>(&query)
            .fetch_all(pool)
            .await
    }

    /// Find a stage by ID, whatever its status.
    pub async fn find_by_id(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<ConstructionStage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM construction_stages WHERE ID = ?1");
        sqlx::query_as::<_, ConstructionStage>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a validated stage and return it as re-read from the table.
    pub async fn create(
        pool: &SqlitePool,
        input: &NewStage,
    ) -> Result<ConstructionStage, sqlx::Error> {
        let id = sqlx::query(
            "INSERT INTO construction_stages
                (name, start_date, end_date, duration, durationUnit, color, externalId, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&input.name)
        .bind(to_storage(input.start_date))
        .bind(input.end_date.map(to_storage))
        .bind(input.duration())
        .bind(input.duration_unit.as_str())
        .bind(&input.color)
        .bind(&input.external_id)
        .bind(input.status.as_str())
        .execute(pool)
        .await?
        .last_insert_rowid();

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Apply a partial update. `None` fields keep their stored value.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        patch: &StagePatch,
    ) -> Result<Option<ConstructionStage>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE construction_stages SET
                name = IFNULL(?2, name),
                start_date = IFNULL(?3, start_date),
                end_date = IFNULL(?4, end_date),
                duration = IFNULL(?5, duration),
                durationUnit = IFNULL(?6, durationUnit),
                color = IFNULL(?7, color),
                externalId = IFNULL(?8, externalId),
                status = IFNULL(?9, status)
             WHERE ID = ?1",
        )
        .bind(id)
        .bind(&patch.name)
        .bind(patch.start_date.map(to_storage))
        .bind(patch.end_date.map(to_storage))
        .bind(patch.duration)
        .bind(patch.duration_unit.map(|unit| unit.as_str()))
        .bind(&patch.color)
        .bind(&patch.external_id)
        .bind(patch.status.map(|status| status.as_str()))
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    /// Mark a stage as `DELETED`. Returns `true` if the row exists, including
    /// when it was already deleted.
    pub async fn soft_delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE construction_stages SET status = ?2 WHERE ID = ?1")
            .bind(id)
            .bind(StageStatus::Deleted.as_str())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
