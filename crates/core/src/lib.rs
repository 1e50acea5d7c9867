//! Domain logic for the construction stage service.
//!
//! Nothing in this crate touches the database or HTTP; the `db` and `api`
//! crates depend on it for shared types, errors and validation.

pub mod construction_stage;
pub mod error;
pub mod types;
