//! SQLite persistence for training blocks and logged workouts
//!
//! A block is stored fully materialized: weeks -> days -> exercises ->
//! prescribed sets, cascading on delete. Logged sets hang off exercises.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::{BlockError, BlockResult};
use crate::models::{
  ActualSet, BlockDay, BlockExercise, BlockPayload, BlockSummary, Category, LogWorkoutRequest,
  NewActualSet, PayloadWeek, PrescribedSet, StoredBlock, Tempo, WeekType, WorkoutExerciseSummary,
  WorkoutSummary,
};

fn db_err(context: &str) -> impl Fn(sqlx::Error) -> BlockError + '_ {
  move |e| BlockError::Database(format!("{}: {}", context, e))
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// Insert a whole block in one transaction, returning its id
pub async fn create_block(pool: &SqlitePool, payload: &BlockPayload) -> BlockResult<i64> {
  let mut tx = pool.begin().await.map_err(db_err("Failed to begin transaction"))?;

  let block_id = sqlx::query(
    r#"
    INSERT INTO training_blocks (block_length, progression_rate, deload_rate, created_at)
    VALUES (?1, ?2, ?3, ?4)
    "#,
  )
  .bind(payload.block_length as i64)
  .bind(payload.progression_rate)
  .bind(payload.deload_rate)
  .bind(Utc::now())
  .execute(&mut *tx)
  .await
  .map_err(db_err("Failed to insert block"))?
  .last_insert_rowid();

  for week in &payload.weeks {
    let week_id = sqlx::query(
      r#"
      INSERT INTO weeks (block_id, week_number, week_type, start_date, end_date)
      VALUES (?1, ?2, ?3, ?4, ?5)
      "#,
    )
    .bind(block_id)
    .bind(week.week_number as i64)
    .bind(week.week_type.to_string())
    .bind(week.start_date)
    .bind(week.end_date())
    .execute(&mut *tx)
    .await
    .map_err(db_err("Failed to insert week"))?
    .last_insert_rowid();

    for day in &week.days {
      let day_id = sqlx::query(
        "INSERT INTO workout_days (week_id, day_number, day_name, rest_day) VALUES (?1, ?2, ?3, ?4)",
      )
      .bind(week_id)
      .bind(day.day_number as i64)
      .bind(&day.day_name)
      .bind(day.rest_day)
      .execute(&mut *tx)
      .await
      .map_err(db_err("Failed to insert day"))?
      .last_insert_rowid();

      for exercise in &day.exercises {
        let exercise_id = sqlx::query(
          "INSERT INTO exercises (day_id, name, category, order_in_workout) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(day_id)
        .bind(&exercise.name)
        .bind(exercise.category.to_string())
        .bind(exercise.order_in_workout as i64)
        .execute(&mut *tx)
        .await
        .map_err(db_err("Failed to insert exercise"))?
        .last_insert_rowid();

        for set in &exercise.prescribed_sets {
          sqlx::query(
            r#"
            INSERT INTO prescribed_sets (
              exercise_id, set_number, target_sets, target_reps,
              target_load_min, target_load_max, target_rpe, tempo, video_required
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
          )
          .bind(exercise_id)
          .bind(set.set_number as i64)
          .bind(set.target_sets as i64)
          .bind(set.target_reps as i64)
          .bind(set.target_load_min)
          .bind(set.target_load_max)
          .bind(set.target_rpe)
          .bind(set.tempo.to_string())
          .bind(set.video_required)
          .execute(&mut *tx)
          .await
          .map_err(db_err("Failed to insert prescribed set"))?;
        }
      }
    }
  }

  tx.commit().await.map_err(db_err("Failed to commit block"))?;

  info!(
    "Created block {} ({} weeks, {} exercises)",
    block_id,
    payload.weeks.len(),
    payload.exercise_count()
  );

  Ok(block_id)
}

/// All blocks, newest first
pub async fn list_blocks(pool: &SqlitePool) -> BlockResult<Vec<BlockSummary>> {
  sqlx::query_as::<_, BlockSummary>(
    r#"
    SELECT id, block_length, progression_rate, deload_rate, created_at
    FROM training_blocks
    ORDER BY created_at DESC, id DESC
    "#,
  )
  .fetch_all(pool)
  .await
  .map_err(db_err("Failed to list blocks"))
}

async fn load_prescribed_sets(pool: &SqlitePool, exercise_id: i64) -> BlockResult<Vec<PrescribedSet>> {
  let rows: Vec<(i64, i64, i64, i64, Option<f64>, Option<f64>, Option<f64>, String, bool)> =
    sqlx::query_as(
      r#"
      SELECT id, set_number, target_sets, target_reps,
             target_load_min, target_load_max, target_rpe, tempo, video_required
      FROM prescribed_sets
      WHERE exercise_id = ?1
      ORDER BY set_number, id
      "#,
    )
    .bind(exercise_id)
    .fetch_all(pool)
    .await
    .map_err(db_err("Failed to load prescribed sets"))?;

  rows
    .into_iter()
    .map(|(id, set_number, target_sets, target_reps, min, max, rpe, tempo, video)| {
      Ok(PrescribedSet {
        id: Some(id),
        set_number: set_number as u32,
        target_sets: target_sets as u32,
        target_reps: target_reps as u32,
        target_load_min: min,
        target_load_max: max,
        target_rpe: rpe,
        tempo: tempo.parse::<Tempo>().map_err(BlockError::Database)?,
        video_required: video,
      })
    })
    .collect()
}

async fn load_exercises(pool: &SqlitePool, day_id: i64) -> BlockResult<Vec<BlockExercise>> {
  let rows: Vec<(i64, String, String, i64)> = sqlx::query_as(
    r#"
    SELECT id, name, category, order_in_workout
    FROM exercises
    WHERE day_id = ?1
    ORDER BY order_in_workout, id
    "#,
  )
  .bind(day_id)
  .fetch_all(pool)
  .await
  .map_err(db_err("Failed to load exercises"))?;

  let mut exercises = Vec::with_capacity(rows.len());
  for (id, name, category, order) in rows {
    exercises.push(BlockExercise {
      id: Some(id),
      name,
      category: category.parse::<Category>().map_err(BlockError::Database)?,
      order_in_workout: order as u32,
      prescribed_sets: load_prescribed_sets(pool, id).await?,
    });
  }
  Ok(exercises)
}

async fn load_days(pool: &SqlitePool, week_id: i64) -> BlockResult<Vec<BlockDay>> {
  let rows: Vec<(i64, i64, Option<String>, Option<bool>)> = sqlx::query_as(
    r#"
    SELECT id, day_number, day_name, rest_day
    FROM workout_days
    WHERE week_id = ?1
    ORDER BY day_number, id
    "#,
  )
  .bind(week_id)
  .fetch_all(pool)
  .await
  .map_err(db_err("Failed to load days"))?;

  let mut days = Vec::with_capacity(rows.len());
  for (id, day_number, day_name, rest_day) in rows {
    days.push(BlockDay {
      day_number: day_number as u32,
      day_name,
      rest_day,
      exercises: load_exercises(pool, id).await?,
    });
  }
  Ok(days)
}

/// Load a block with its full week/day/exercise/set tree
pub async fn load_block(pool: &SqlitePool, block_id: i64) -> BlockResult<StoredBlock> {
  let row: Option<(i64, i64, f64, f64, DateTime<Utc>)> = sqlx::query_as(
    r#"
    SELECT id, block_length, progression_rate, deload_rate, created_at
    FROM training_blocks
    WHERE id = ?1
    "#,
  )
  .bind(block_id)
  .fetch_optional(pool)
  .await
  .map_err(db_err("Failed to load block"))?;

  let (id, block_length, progression_rate, deload_rate, created_at) =
    row.ok_or_else(|| BlockError::NotFound(format!("Training block {}", block_id)))?;

  let week_rows: Vec<(i64, i64, String, NaiveDate)> = sqlx::query_as(
    r#"
    SELECT id, week_number, week_type, start_date
    FROM weeks
    WHERE block_id = ?1
    ORDER BY week_number
    "#,
  )
  .bind(block_id)
  .fetch_all(pool)
  .await
  .map_err(db_err("Failed to load weeks"))?;

  let mut weeks = Vec::with_capacity(week_rows.len());
  for (week_id, week_number, week_type, start_date) in week_rows {
    weeks.push(PayloadWeek {
      week_number: week_number as u32,
      week_type: week_type.parse::<WeekType>().map_err(BlockError::Database)?,
      start_date,
      days: load_days(pool, week_id).await?,
    });
  }

  debug!("Loaded block {} ({} weeks)", id, weeks.len());

  Ok(StoredBlock {
    id,
    created_at,
    payload: BlockPayload {
      block_length: block_length as u32,
      progression_rate,
      deload_rate,
      weeks,
    },
  })
}

pub async fn delete_block(pool: &SqlitePool, block_id: i64) -> BlockResult<()> {
  let result = sqlx::query("DELETE FROM training_blocks WHERE id = ?1")
    .bind(block_id)
    .execute(pool)
    .await
    .map_err(db_err("Failed to delete block"))?;

  if result.rows_affected() == 0 {
    return Err(BlockError::NotFound(format!("Training block {}", block_id)));
  }
  info!("Deleted block {}", block_id);
  Ok(())
}

/// Remove one exercise (and its prescribed and logged sets) from a stored block
pub async fn delete_exercise(pool: &SqlitePool, exercise_id: i64) -> BlockResult<()> {
  let result = sqlx::query("DELETE FROM exercises WHERE id = ?1")
    .bind(exercise_id)
    .execute(pool)
    .await
    .map_err(db_err("Failed to delete exercise"))?;

  if result.rows_affected() == 0 {
    return Err(BlockError::NotFound(format!("Exercise {}", exercise_id)));
  }
  Ok(())
}

// ---------------------------------------------------------------------------
// Workouts
// ---------------------------------------------------------------------------

#[derive(Debug, sqlx::FromRow)]
struct ActualSetRow {
  id: i64,
  exercise_id: i64,
  prescribed_set_id: Option<i64>,
  set_number: i64,
  actual_weight: Option<f64>,
  actual_reps: Option<i64>,
  actual_rpe: Option<f64>,
  tempo_used: Option<String>,
  video_recorded: bool,
  feedback: Option<String>,
  completed_at: Option<DateTime<Utc>>,
  exercise_name: String,
  week_number: i64,
  day_number: i64,
}

impl ActualSetRow {
  fn to_actual_set(&self) -> ActualSet {
    ActualSet {
      id: self.id,
      exercise_id: self.exercise_id,
      prescribed_set_id: self.prescribed_set_id,
      set_number: self.set_number as u32,
      actual_weight: self.actual_weight,
      actual_reps: self.actual_reps.map(|r| r as u32),
      actual_rpe: self.actual_rpe,
      tempo_used: self.tempo_used.as_deref().and_then(|t| t.parse::<Tempo>().ok()),
      video_recorded: self.video_recorded,
      feedback: self.feedback.clone(),
      completed_at: self.completed_at,
    }
  }
}

const ACTUAL_SET_SELECT: &str = r#"
  SELECT a.id, a.exercise_id, a.prescribed_set_id, a.set_number, a.actual_weight,
         a.actual_reps, a.actual_rpe, a.tempo_used, a.video_recorded, a.feedback,
         a.completed_at, e.name AS exercise_name, w.week_number, d.day_number
  FROM actual_sets a
  JOIN exercises e ON a.exercise_id = e.id
  JOIN workout_days d ON e.day_id = d.id
  JOIN weeks w ON d.week_id = w.id
"#;

/// Group rows already ordered by week, day, exercise into per-day summaries
fn summarize(block_id: i64, rows: &[ActualSetRow]) -> Vec<WorkoutSummary> {
  let mut summaries: Vec<WorkoutSummary> = Vec::new();

  for row in rows {
    let week_number = row.week_number as u32;
    let day_number = row.day_number as u32;

    let starts_new_day = summaries
      .last()
      .map_or(true, |s| s.week_number != week_number || s.day_number != day_number);
    if starts_new_day {
      summaries.push(WorkoutSummary {
        block_id,
        week_number,
        day_number,
        completed_at: None,
        exercises: Vec::new(),
      });
    }
    let Some(summary) = summaries.last_mut() else {
      continue;
    };

    summary.completed_at = match (summary.completed_at, row.completed_at) {
      (Some(a), Some(b)) => Some(a.max(b)),
      (a, b) => a.or(b),
    };

    let starts_new_exercise = summary
      .exercises
      .last()
      .map_or(true, |e| e.exercise_id != row.exercise_id);
    if starts_new_exercise {
      summary.exercises.push(WorkoutExerciseSummary {
        exercise_id: row.exercise_id,
        exercise_name: row.exercise_name.clone(),
        actual_sets: Vec::new(),
      });
    }
    if let Some(exercise) = summary.exercises.last_mut() {
      exercise.actual_sets.push(row.to_actual_set());
    }
  }

  summaries
}

async fn find_workout_day<'e, E>(
  executor: E,
  block_id: i64,
  week_number: u32,
  day_number: u32,
) -> BlockResult<i64>
where
  E: Executor<'e, Database = Sqlite>,
{
  let day_id: Option<i64> = sqlx::query_scalar(
    r#"
    SELECT d.id
    FROM workout_days d
    JOIN weeks w ON d.week_id = w.id
    WHERE w.block_id = ?1 AND w.week_number = ?2 AND d.day_number = ?3
    ORDER BY d.id
    LIMIT 1
    "#,
  )
  .bind(block_id)
  .bind(week_number as i64)
  .bind(day_number as i64)
  .fetch_optional(executor)
  .await
  .map_err(db_err("Failed to find workout day"))?;

  day_id.ok_or_else(|| {
    BlockError::NotFound(format!(
      "Workout day for block {}, week {}, day {}",
      block_id, week_number, day_number
    ))
  })
}

async fn check_prescribed_set<'e, E>(
  executor: E,
  prescribed_set_id: i64,
  exercise_id: i64,
) -> BlockResult<()>
where
  E: Executor<'e, Database = Sqlite>,
{
  let owner: Option<i64> =
    sqlx::query_scalar("SELECT exercise_id FROM prescribed_sets WHERE id = ?1")
      .bind(prescribed_set_id)
      .fetch_optional(executor)
      .await
      .map_err(db_err("Failed to check prescribed set"))?;

  if owner != Some(exercise_id) {
    return Err(BlockError::InvalidArgument(format!(
      "Prescribed set {} does not belong to exercise {}",
      prescribed_set_id, exercise_id
    )));
  }
  Ok(())
}

/// Record a session. Every exercise must belong to the addressed day and
/// every referenced prescribed set to its exercise.
pub async fn log_workout(
  pool: &SqlitePool,
  request: &LogWorkoutRequest,
) -> BlockResult<WorkoutSummary> {
  let mut tx = pool.begin().await.map_err(db_err("Failed to begin transaction"))?;

  // Checks and inserts share the transaction; dropping it on error rolls back
  let day_id = find_workout_day(
    &mut *tx,
    request.block_id,
    request.week_number,
    request.day_number,
  )
  .await?;

  for exercise in &request.exercises {
    let owner: Option<i64> = sqlx::query_scalar("SELECT day_id FROM exercises WHERE id = ?1")
      .bind(exercise.exercise_id)
      .fetch_optional(&mut *tx)
      .await
      .map_err(db_err("Failed to check exercise"))?;

    if owner != Some(day_id) {
      return Err(BlockError::InvalidArgument(format!(
        "Exercise {} does not belong to the specified workout day",
        exercise.exercise_id
      )));
    }

    for set in &exercise.actual_sets {
      if let Some(prescribed_id) = set.prescribed_set_id {
        check_prescribed_set(&mut *tx, prescribed_id, exercise.exercise_id).await?;
      }
    }
  }

  let completed_at = Utc::now();

  for exercise in &request.exercises {
    for set in &exercise.actual_sets {
      sqlx::query(
        r#"
        INSERT INTO actual_sets (
          exercise_id, prescribed_set_id, set_number, actual_weight, actual_reps,
          actual_rpe, tempo_used, video_recorded, feedback, completed_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
      )
      .bind(exercise.exercise_id)
      .bind(set.prescribed_set_id)
      .bind(set.set_number as i64)
      .bind(set.actual_weight)
      .bind(set.actual_reps.map(|r| r as i64))
      .bind(set.actual_rpe)
      .bind(set.tempo_used.map(|t| t.to_string()))
      .bind(set.video_recorded)
      .bind(&set.feedback)
      .bind(completed_at)
      .execute(&mut *tx)
      .await
      .map_err(db_err("Failed to insert actual set"))?;
    }
  }

  tx.commit().await.map_err(db_err("Failed to commit workout"))?;

  info!(
    "Logged workout for block {}, week {}, day {}",
    request.block_id, request.week_number, request.day_number
  );

  get_workout(pool, request.block_id, request.week_number, request.day_number).await
}

/// Logged sets for one day. A day with nothing logged gives an empty summary.
pub async fn get_workout(
  pool: &SqlitePool,
  block_id: i64,
  week_number: u32,
  day_number: u32,
) -> BlockResult<WorkoutSummary> {
  let day_id = find_workout_day(pool, block_id, week_number, day_number).await?;

  let query = format!(
    "{} WHERE d.id = ?1 ORDER BY e.order_in_workout, e.id, a.set_number, a.id",
    ACTUAL_SET_SELECT
  );
  let rows: Vec<ActualSetRow> = sqlx::query_as(&query)
    .bind(day_id)
    .fetch_all(pool)
    .await
    .map_err(db_err("Failed to load workout"))?;

  Ok(
    summarize(block_id, &rows)
      .into_iter()
      .next()
      .unwrap_or(WorkoutSummary {
        block_id,
        week_number,
        day_number,
        completed_at: None,
        exercises: Vec::new(),
      }),
  )
}

/// Every logged day of a block, ordered by week then day
pub async fn get_block_progress(
  pool: &SqlitePool,
  block_id: i64,
) -> BlockResult<Vec<WorkoutSummary>> {
  let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM training_blocks WHERE id = ?1")
    .bind(block_id)
    .fetch_optional(pool)
    .await
    .map_err(db_err("Failed to load block"))?;
  if exists.is_none() {
    return Err(BlockError::NotFound(format!("Training block {}", block_id)));
  }

  let query = format!(
    "{} WHERE w.block_id = ?1 ORDER BY w.week_number, d.day_number, d.id, e.order_in_workout, e.id, a.set_number, a.id",
    ACTUAL_SET_SELECT
  );
  let rows: Vec<ActualSetRow> = sqlx::query_as(&query)
    .bind(block_id)
    .fetch_all(pool)
    .await
    .map_err(db_err("Failed to load block progress"))?;

  Ok(summarize(block_id, &rows))
}

/// Remove everything logged for one day, returning how many sets went
pub async fn delete_workout(
  pool: &SqlitePool,
  block_id: i64,
  week_number: u32,
  day_number: u32,
) -> BlockResult<u64> {
  let day_id = find_workout_day(pool, block_id, week_number, day_number).await?;

  let result = sqlx::query(
    "DELETE FROM actual_sets WHERE exercise_id IN (SELECT id FROM exercises WHERE day_id = ?1)",
  )
  .bind(day_id)
  .execute(pool)
  .await
  .map_err(db_err("Failed to delete workout"))?;

  Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// Single logged sets
// ---------------------------------------------------------------------------

async fn fetch_actual_set(pool: &SqlitePool, set_id: i64) -> BlockResult<Option<ActualSet>> {
  let query = format!("{} WHERE a.id = ?1", ACTUAL_SET_SELECT);
  let row: Option<ActualSetRow> = sqlx::query_as(&query)
    .bind(set_id)
    .fetch_optional(pool)
    .await
    .map_err(db_err("Failed to load actual set"))?;
  Ok(row.as_ref().map(ActualSetRow::to_actual_set))
}

pub async fn get_actual_set(pool: &SqlitePool, set_id: i64) -> BlockResult<ActualSet> {
  fetch_actual_set(pool, set_id)
    .await?
    .ok_or_else(|| BlockError::NotFound(format!("Actual set {}", set_id)))
}

/// Every set logged against one exercise, oldest session first
pub async fn list_actual_sets(pool: &SqlitePool, exercise_id: i64) -> BlockResult<Vec<ActualSet>> {
  let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM exercises WHERE id = ?1")
    .bind(exercise_id)
    .fetch_optional(pool)
    .await
    .map_err(db_err("Failed to load exercise"))?;
  if exists.is_none() {
    return Err(BlockError::NotFound(format!("Exercise {}", exercise_id)));
  }

  let query = format!(
    "{} WHERE a.exercise_id = ?1 ORDER BY a.completed_at, a.set_number, a.id",
    ACTUAL_SET_SELECT
  );
  let rows: Vec<ActualSetRow> = sqlx::query_as(&query)
    .bind(exercise_id)
    .fetch_all(pool)
    .await
    .map_err(db_err("Failed to list actual sets"))?;

  Ok(rows.iter().map(ActualSetRow::to_actual_set).collect())
}

/// Correct one logged set in place. The exercise and `completed_at` stay as logged.
pub async fn update_actual_set(
  pool: &SqlitePool,
  set_id: i64,
  update: &NewActualSet,
) -> BlockResult<ActualSet> {
  let mut tx = pool.begin().await.map_err(db_err("Failed to begin transaction"))?;

  let exercise_id: Option<i64> =
    sqlx::query_scalar("SELECT exercise_id FROM actual_sets WHERE id = ?1")
      .bind(set_id)
      .fetch_optional(&mut *tx)
      .await
      .map_err(db_err("Failed to load actual set"))?;
  let exercise_id =
    exercise_id.ok_or_else(|| BlockError::NotFound(format!("Actual set {}", set_id)))?;

  if let Some(prescribed_id) = update.prescribed_set_id {
    check_prescribed_set(&mut *tx, prescribed_id, exercise_id).await?;
  }

  sqlx::query(
    r#"
    UPDATE actual_sets
    SET prescribed_set_id = ?1, set_number = ?2, actual_weight = ?3, actual_reps = ?4,
        actual_rpe = ?5, tempo_used = ?6, video_recorded = ?7, feedback = ?8
    WHERE id = ?9
    "#,
  )
  .bind(update.prescribed_set_id)
  .bind(update.set_number as i64)
  .bind(update.actual_weight)
  .bind(update.actual_reps.map(|r| r as i64))
  .bind(update.actual_rpe)
  .bind(update.tempo_used.map(|t| t.to_string()))
  .bind(update.video_recorded)
  .bind(&update.feedback)
  .bind(set_id)
  .execute(&mut *tx)
  .await
  .map_err(db_err("Failed to update actual set"))?;

  tx.commit().await.map_err(db_err("Failed to commit actual set"))?;
  debug!("Updated actual set {}", set_id);

  get_actual_set(pool, set_id).await
}

pub async fn delete_actual_set(pool: &SqlitePool, set_id: i64) -> BlockResult<()> {
  let result = sqlx::query("DELETE FROM actual_sets WHERE id = ?1")
    .bind(set_id)
    .execute(pool)
    .await
    .map_err(db_err("Failed to delete actual set"))?;

  if result.rows_affected() == 0 {
    return Err(BlockError::NotFound(format!("Actual set {}", set_id)));
  }
  Ok(())
}
