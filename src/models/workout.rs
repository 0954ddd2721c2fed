use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::exercise::Tempo;

/// One set as actually performed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualSet {
  pub id: i64,
  pub exercise_id: i64,
  pub prescribed_set_id: Option<i64>,
  pub set_number: u32,
  pub actual_weight: Option<f64>,
  pub actual_reps: Option<u32>,
  #[serde(rename = "actualRPE")]
  pub actual_rpe: Option<f64>,
  pub tempo_used: Option<Tempo>,
  pub video_recorded: bool,
  pub feedback: Option<String>,
  pub completed_at: Option<DateTime<Utc>>,
}

/// For inserting new sets (without id, completed_at)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActualSet {
  #[serde(default)]
  pub prescribed_set_id: Option<i64>,
  pub set_number: u32,
  #[serde(default)]
  pub actual_weight: Option<f64>,
  #[serde(default)]
  pub actual_reps: Option<u32>,
  #[serde(default, rename = "actualRPE", alias = "actualRpe")]
  pub actual_rpe: Option<f64>,
  #[serde(default)]
  pub tempo_used: Option<Tempo>,
  #[serde(default)]
  pub video_recorded: bool,
  #[serde(default)]
  pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogWorkoutExercise {
  pub exercise_id: i64,
  pub actual_sets: Vec<NewActualSet>,
}

/// A session logged against one day of one week of a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogWorkoutRequest {
  pub block_id: i64,
  pub week_number: u32,
  pub day_number: u32,
  pub exercises: Vec<LogWorkoutExercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExerciseSummary {
  pub exercise_id: i64,
  pub exercise_name: String,
  pub actual_sets: Vec<ActualSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSummary {
  pub block_id: i64,
  pub week_number: u32,
  pub day_number: u32,
  pub completed_at: Option<DateTime<Utc>>,
  pub exercises: Vec<WorkoutExerciseSummary>,
}

impl WorkoutSummary {
  pub fn total_sets(&self) -> usize {
    self.exercises.iter().map(|e| e.actual_sets.len()).sum()
  }

  /// Sum of weight x reps over sets that recorded both
  pub fn tonnage(&self) -> f64 {
    self
      .exercises
      .iter()
      .flat_map(|e| e.actual_sets.iter())
      .filter_map(|s| match (s.actual_weight, s.actual_reps) {
        (Some(w), Some(r)) => Some(w * r as f64),
        _ => None,
      })
      .sum()
  }
}
