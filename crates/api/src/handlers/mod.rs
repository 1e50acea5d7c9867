pub mod construction_stage;
