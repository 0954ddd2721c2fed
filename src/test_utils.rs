//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock base weeks and block payloads
//! - Helper assertions

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::db::AppState;
use crate::models::{BaseExercise, BaseWeek, BlockPayload, Category, Tempo, TrainingBlock};
use crate::payload::build_block_payload;
use crate::progression::ProgressionSettings;
use crate::store;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// App state over a fresh in-memory database with default settings
pub async fn setup_test_state() -> AppState {
  AppState {
    db: setup_test_db().await,
    config: AppConfig {
      database_url: "sqlite::memory:".to_string(),
      ..AppConfig::default()
    },
  }
}

/// Store the mock block and return its id
pub async fn seed_test_block(pool: &SqlitePool) -> i64 {
  store::create_block(pool, &mock_block_payload())
    .await
    .expect("Failed to seed block")
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

pub fn mock_exercise(
  name: &str,
  category: Category,
  sets: u32,
  reps: u32,
  loads: (Option<f64>, Option<f64>),
) -> BaseExercise {
  BaseExercise {
    name: name.to_string(),
    category,
    sets,
    reps,
    base_load_min: loads.0,
    base_load_max: loads.1,
    rpe: None,
    tempo: Tempo::Controlled,
  }
}

/// Two training days (1 and 3), two exercises each
pub fn mock_base_week() -> BaseWeek {
  let mut week = BaseWeek::new();

  week.push_exercise(
    1,
    BaseExercise {
      rpe: Some(7.0),
      ..mock_exercise("Back Squat", Category::Squat, 4, 5, (Some(100.0), Some(110.0)))
    },
  );
  week.push_exercise(
    1,
    mock_exercise("Romanian Deadlift", Category::Accessory, 3, 8, (Some(60.0), None)),
  );
  week.push_exercise(
    3,
    BaseExercise {
      rpe: Some(8.0),
      tempo: Tempo::Explosive,
      ..mock_exercise("Bench Press", Category::Bench, 5, 3, (Some(80.0), Some(85.0)))
    },
  );
  week.push_exercise(3, mock_exercise("Plank", Category::Accessory, 3, 1, (None, None)));

  week
}

pub fn mock_start_date() -> NaiveDate {
  NaiveDate::from_ymd_opt(2026, 1, 5).expect("valid date")
}

/// Default five-week block generated from `mock_base_week`
pub fn mock_block_payload() -> BlockPayload {
  let block = TrainingBlock::generate(&mock_base_week(), &ProgressionSettings::default())
    .expect("Failed to generate mock block");
  build_block_payload(&block, mock_start_date())
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('training_blocks', 'weeks', 'workout_days', 'exercises', 'prescribed_sets', 'actual_sets')",
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 6, "Expected 6 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_block_writes_sets() {
    let pool = setup_test_db().await;
    seed_test_block(&pool).await;

    // 5 weeks x (4 + 3 + 5 + 3) sets
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM prescribed_sets")
      .fetch_one(&pool)
      .await
      .expect("Failed to count sets");
    assert_eq!(count, 75);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let week = mock_base_week();
    assert_eq!(week.days.len(), 2);
    assert_eq!(week.exercise_count(), 4);

    let payload = mock_block_payload();
    assert_eq!(payload.weeks.len(), 5);
    assert_eq!(payload.weeks[0].start_date, mock_start_date());
  }
}
