//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async functions that
//! accept `&SqlitePool` as the first argument.

pub mod construction_stage_repo;

pub use construction_stage_repo::ConstructionStageRepo;
