//! Construction stage row model.

use serde::Serialize;
use sqlx::FromRow;
use stages_core::construction_stage::{DurationUnit, StageSchedule, StageStatus};
use stages_core::types::{DbId, Timestamp};

/// A row from `construction_stages`, read with ISO-8601 `Z` timestamps.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructionStage {
    pub id: DbId,
    pub name: String,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub duration: Option<f64>,
    #[sqlx(try_from = "String")]
    pub duration_unit: DurationUnit,
    pub color: Option<String>,
    pub external_id: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: StageStatus,
}

impl ConstructionStage {
    /// The stored fields the derived duration depends on.
    pub fn schedule(&self) -> StageSchedule {
        StageSchedule {
            start_date: self.start_date,
            end_date: self.end_date,
            duration_unit: self.duration_unit,
        }
    }
}
