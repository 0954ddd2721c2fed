//! Progressive-overload training blocks
//!
//! Generates multi-week blocks from a base week, copies blocks with scaled
//! loads, and stores blocks and logged workouts in SQLite.

pub mod commands;
pub mod config;
pub mod copy;
pub mod csv;
pub mod db;
pub mod error;
pub mod models;
pub mod normalize;
pub mod payload;
pub mod progression;
pub mod rounding;
pub mod store;

#[cfg(test)]
mod test_utils;

pub use config::AppConfig;
pub use copy::{build_copy_block_payload, build_copy_block_payload_from};
pub use csv::parse_block_csv;
pub use db::{initialize_db, AppState};
pub use error::{BlockError, BlockResult};
pub use normalize::{normalize_block, normalize_days, sort_days};
pub use payload::build_block_payload;
pub use progression::{compute_week_load, generate_block_weeks, week_type, ProgressionSettings};
pub use rounding::{round_to_fine_increment, round_to_training_increment};
