//! Block commands: generate, import, copy, browse and delete

use chrono::NaiveDate;
use serde_json::Value;
use tracing::info;

use super::start_or_today;
use crate::copy::build_copy_block_payload_from;
use crate::csv::parse_block_csv;
use crate::db::AppState;
use crate::error::BlockResult;
use crate::models::{BaseWeek, BlockPayload, BlockSummary, StoredBlock, TrainingBlock};
use crate::normalize::normalize_block;
use crate::payload::build_block_payload;
use crate::progression::ProgressionSettings;
use crate::store;

/// Generate a block without storing it. Missing settings fall back to the
/// configured defaults.
pub fn preview_block(
  state: &AppState,
  base_week: &BaseWeek,
  settings: Option<ProgressionSettings>,
  start_date: Option<NaiveDate>,
) -> BlockResult<BlockPayload> {
  let settings = settings.unwrap_or(state.config.defaults);
  let block = TrainingBlock::generate(base_week, &settings)?;
  Ok(build_block_payload(&block, start_or_today(start_date)))
}

pub async fn create_block_from_base_week(
  state: &AppState,
  base_week: &BaseWeek,
  settings: Option<ProgressionSettings>,
  start_date: Option<NaiveDate>,
) -> BlockResult<StoredBlock> {
  let payload = preview_block(state, base_week, settings, start_date)?;
  let id = store::create_block(&state.db, &payload).await?;
  store::load_block(&state.db, id).await
}

/// Parse a base-week CSV and store the generated block
pub async fn create_block_from_csv(
  state: &AppState,
  csv_text: &str,
  settings: Option<ProgressionSettings>,
  start_date: Option<NaiveDate>,
) -> BlockResult<StoredBlock> {
  let base_week = parse_block_csv(csv_text)?;
  info!(
    "Creating block from CSV ({} days, {} exercises)",
    base_week.days.len(),
    base_week.exercise_count()
  );
  create_block_from_base_week(state, &base_week, settings, start_date).await
}

/// Copy a stored block with every load scaled by `load_increase_percent`
pub async fn copy_block(
  state: &AppState,
  block_id: i64,
  load_increase_percent: f64,
  start_date: Option<NaiveDate>,
) -> BlockResult<StoredBlock> {
  let source = store::load_block(&state.db, block_id).await?;
  let payload =
    build_copy_block_payload_from(&source.payload, load_increase_percent, start_or_today(start_date))?;
  let id = store::create_block(&state.db, &payload).await?;
  info!("Copied block {} into block {}", block_id, id);
  store::load_block(&state.db, id).await
}

/// Copy a block supplied as JSON, accepting either day layout
pub async fn copy_block_from_json(
  state: &AppState,
  source: &Value,
  load_increase_percent: f64,
  start_date: Option<NaiveDate>,
) -> BlockResult<StoredBlock> {
  let source = normalize_block(source)?;
  let payload =
    build_copy_block_payload_from(&source, load_increase_percent, start_or_today(start_date))?;
  let id = store::create_block(&state.db, &payload).await?;
  store::load_block(&state.db, id).await
}

pub async fn list_blocks(state: &AppState) -> BlockResult<Vec<BlockSummary>> {
  store::list_blocks(&state.db).await
}

pub async fn get_block(state: &AppState, block_id: i64) -> BlockResult<StoredBlock> {
  store::load_block(&state.db, block_id).await
}

pub async fn delete_block(state: &AppState, block_id: i64) -> BlockResult<()> {
  store::delete_block(&state.db, block_id).await
}

pub async fn delete_exercise(state: &AppState, exercise_id: i64) -> BlockResult<()> {
  store::delete_exercise(&state.db, exercise_id).await
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::BlockError;
  use crate::models::WeekType;
  use crate::test_utils::*;
  use serde_json::json;

  const CSV: &str = "\
Day,Exercise,Sets,Reps,BaseLoadMin,BaseLoadMax,RPE,Category
1,Back Squat,4,5,100,110,7,Squat
2,Bench Press,3,5,80,,8,Bench
";

  #[tokio::test]
  async fn test_preview_uses_configured_defaults() {
    let mut state = setup_test_state().await;
    state.config.defaults.block_length = 3;

    let payload = preview_block(&state, &mock_base_week(), None, Some(mock_start_date())).unwrap();
    assert_eq!(payload.block_length, 3);
    assert_eq!(payload.weeks.len(), 3);
    assert_eq!(payload.weeks[2].week_type, WeekType::Deload);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM training_blocks")
      .fetch_one(&state.db)
      .await
      .unwrap();
    assert_eq!(count, 0, "Preview must not store anything");

    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  async fn test_preview_rejects_invalid_settings() {
    let state = setup_test_state().await;
    let settings = ProgressionSettings {
      block_length: 0,
      ..ProgressionSettings::default()
    };
    let result = preview_block(&state, &mock_base_week(), Some(settings), None);
    assert!(matches!(result, Err(BlockError::InvalidArgument(_))));
    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  async fn test_create_from_csv() {
    let state = setup_test_state().await;
    let block = create_block_from_csv(&state, CSV, None, Some(mock_start_date()))
      .await
      .expect("Should create block");

    assert_eq!(block.payload.weeks.len(), 5);
    let week_two = &block.payload.weeks[1];
    assert_eq!(week_two.days.len(), 2);
    let bench = &week_two.days[1].exercises[0];
    assert_eq!(bench.name, "Bench Press");
    // 80 * 1.075 = 86 -> 85
    assert_eq!(bench.prescribed_sets[0].target_load_min, Some(85.0));
    assert_eq!(bench.prescribed_sets[0].target_load_max, None);

    let listed = list_blocks(&state).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, block.id);

    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  async fn test_create_from_bad_csv_stores_nothing() {
    let state = setup_test_state().await;
    let result = create_block_from_csv(&state, "Day,Exercise\n1,Squat\n", None, None).await;
    assert!(matches!(result, Err(BlockError::Csv(_))));
    assert!(list_blocks(&state).await.unwrap().is_empty());
    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  async fn test_copy_block_scales_loads() {
    let state = setup_test_state().await;
    let source_id = seed_test_block(&state.db).await;

    let copy = copy_block(&state, source_id, 10.0, Some(mock_start_date()))
      .await
      .expect("Should copy");
    assert_ne!(copy.id, source_id);

    // week 2 squat 107.5 / 117.5 scaled by 1.1
    let squat = &copy.payload.weeks[1].days[0].exercises[0];
    assert_eq!(squat.prescribed_sets.len(), 4);
    crate::assert_approx_eq!(squat.prescribed_sets[0].target_load_min.unwrap(), 118.5, 1e-9);
    crate::assert_approx_eq!(squat.prescribed_sets[0].target_load_max.unwrap(), 129.5, 1e-9);

    assert_eq!(list_blocks(&state).await.unwrap().len(), 2);

    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  async fn test_copy_missing_block() {
    let state = setup_test_state().await;
    let result = copy_block(&state, 77, 5.0, None).await;
    assert!(matches!(result, Err(BlockError::NotFound(_))));
    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  async fn test_copy_block_from_json_map_days() {
    let state = setup_test_state().await;
    let source = json!({
      "blockLength": 1,
      "weeks": [{
        "weekNumber": 1,
        "weekType": "BASE",
        "days": {"2": [{"Exercise": "Front Squat", "Sets": 3, "Reps": 5, "LoadMin": 70}]}
      }]
    });

    let copy = copy_block_from_json(&state, &source, 5.0, Some(mock_start_date()))
      .await
      .unwrap();
    let exercise = &copy.payload.weeks[0].days[0].exercises[0];
    assert_eq!(copy.payload.weeks[0].days[0].day_number, 2);
    // 70 * 1.05 = 73.5
    assert_eq!(exercise.prescribed_sets[0].target_load_min, Some(73.5));
    assert_eq!(exercise.prescribed_sets.len(), 3);

    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  async fn test_get_and_delete_block() {
    let state = setup_test_state().await;
    let id = seed_test_block(&state.db).await;

    let block = get_block(&state, id).await.unwrap();
    let exercise_id = block.payload.weeks[0].days[0].exercises[1].id.unwrap();
    delete_exercise(&state, exercise_id).await.unwrap();
    let block = get_block(&state, id).await.unwrap();
    assert_eq!(block.payload.weeks[0].days[0].exercises.len(), 1);

    delete_block(&state, id).await.unwrap();
    assert!(matches!(get_block(&state, id).await, Err(BlockError::NotFound(_))));

    teardown_test_db(state.db).await;
  }
}
