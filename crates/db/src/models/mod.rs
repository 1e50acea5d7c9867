//! Row models.
//!
//! Each submodule holds a `FromRow` + `Serialize` struct matching the JSON
//! shape the API returns. Write-side inputs come from `stages_core`.

pub mod construction_stage;
