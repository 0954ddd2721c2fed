//! Workout logging commands

use crate::db::AppState;
use crate::error::BlockResult;
use crate::models::{ActualSet, LogWorkoutRequest, NewActualSet, WorkoutSummary};
use crate::store;

/// Log performed sets against one day of a block
pub async fn log_workout(
  state: &AppState,
  request: LogWorkoutRequest,
) -> BlockResult<WorkoutSummary> {
  store::log_workout(&state.db, &request).await
}

pub async fn get_workout(
  state: &AppState,
  block_id: i64,
  week_number: u32,
  day_number: u32,
) -> BlockResult<WorkoutSummary> {
  store::get_workout(&state.db, block_id, week_number, day_number).await
}

/// Returns the number of sets removed
pub async fn delete_workout(
  state: &AppState,
  block_id: i64,
  week_number: u32,
  day_number: u32,
) -> BlockResult<u64> {
  store::delete_workout(&state.db, block_id, week_number, day_number).await
}

/// All logged sessions of a block, in week then day order
pub async fn get_block_progress(
  state: &AppState,
  block_id: i64,
) -> BlockResult<Vec<WorkoutSummary>> {
  store::get_block_progress(&state.db, block_id).await
}

/// Sets logged against one exercise across every session
pub async fn list_actual_sets(state: &AppState, exercise_id: i64) -> BlockResult<Vec<ActualSet>> {
  store::list_actual_sets(&state.db, exercise_id).await
}

pub async fn get_actual_set(state: &AppState, set_id: i64) -> BlockResult<ActualSet> {
  store::get_actual_set(&state.db, set_id).await
}

/// Correct a single logged set without touching the rest of the session
pub async fn update_actual_set(
  state: &AppState,
  set_id: i64,
  update: NewActualSet,
) -> BlockResult<ActualSet> {
  store::update_actual_set(&state.db, set_id, &update).await
}

pub async fn delete_actual_set(state: &AppState, set_id: i64) -> BlockResult<()> {
  store::delete_actual_set(&state.db, set_id).await
}
