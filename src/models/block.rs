use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::exercise::{Category, Tempo, WeekExercise};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeekType {
  #[default]
  Base,
  Progression,
  Deload,
}

impl std::fmt::Display for WeekType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Base => write!(f, "BASE"),
      Self::Progression => write!(f, "PROGRESSION"),
      Self::Deload => write!(f, "DELOAD"),
    }
  }
}

impl std::str::FromStr for WeekType {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_uppercase().as_str() {
      "BASE" => Ok(Self::Base),
      "PROGRESSION" => Ok(Self::Progression),
      "DELOAD" => Ok(Self::Deload),
      _ => Err(format!("Unknown week type: {}", s)),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Generated block (engine output)
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekDay {
  pub day_number: u32,
  pub exercises: Vec<WeekExercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedWeek {
  pub week_number: u32,
  pub days: Vec<WeekDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingBlock {
  pub block_length: u32,
  pub progression_rate: f64,
  pub deload_rate: f64,
  pub created_at: DateTime<Utc>,
  pub weeks: Vec<GeneratedWeek>,
}

/// ---------------------------------------------------------------------------
/// Materialized block (persisted / transmitted shape)
/// ---------------------------------------------------------------------------

/// One planned set. A materialized exercise carries one of these per set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescribedSet {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  pub set_number: u32,
  pub target_sets: u32,
  pub target_reps: u32,
  #[serde(default)]
  pub target_load_min: Option<f64>,
  #[serde(default)]
  pub target_load_max: Option<f64>,
  #[serde(default, rename = "targetRPE", alias = "targetRpe")]
  pub target_rpe: Option<f64>,
  #[serde(default)]
  pub tempo: Tempo,
  #[serde(default)]
  pub video_required: bool,
}

/// The per-exercise targets shared by all of its prescribed sets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prescription {
  pub sets: u32,
  pub reps: u32,
  pub load_min: Option<f64>,
  pub load_max: Option<f64>,
  pub rpe: Option<f64>,
  pub tempo: Tempo,
}

impl Prescription {
  /// Expand into `sets` numbered prescribed sets carrying identical targets
  pub fn expand(&self) -> Vec<PrescribedSet> {
    (1..=self.sets)
      .map(|set_number| PrescribedSet {
        id: None,
        set_number,
        target_sets: self.sets,
        target_reps: self.reps,
        target_load_min: self.load_min,
        target_load_max: self.load_max,
        target_rpe: self.rpe,
        tempo: self.tempo,
        video_required: false,
      })
      .collect()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockExercise {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  pub name: String,
  #[serde(default)]
  pub category: Category,
  pub order_in_workout: u32,
  #[serde(default)]
  pub prescribed_sets: Vec<PrescribedSet>,
}

impl BlockExercise {
  /// Targets of the first prescribed set. `target_sets` gives the set count.
  pub fn base_prescription(&self) -> Option<Prescription> {
    self.prescribed_sets.first().map(|set| Prescription {
      sets: set.target_sets,
      reps: set.target_reps,
      load_min: set.target_load_min,
      load_max: set.target_load_max,
      rpe: set.target_rpe,
      tempo: set.tempo,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDay {
  pub day_number: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub day_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rest_day: Option<bool>,
  #[serde(default)]
  pub exercises: Vec<BlockExercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadWeek {
  pub week_number: u32,
  pub week_type: WeekType,
  pub start_date: NaiveDate,
  pub days: Vec<BlockDay>,
}

impl PayloadWeek {
  pub fn end_date(&self) -> NaiveDate {
    self.start_date + Duration::days(6)
  }
}

/// Everything needed to create a block in storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPayload {
  pub block_length: u32,
  pub progression_rate: f64,
  pub deload_rate: f64,
  pub weeks: Vec<PayloadWeek>,
}

impl BlockPayload {
  pub fn exercise_count(&self) -> usize {
    self
      .weeks
      .iter()
      .flat_map(|w| w.days.iter())
      .map(|d| d.exercises.len())
      .sum()
  }
}

/// A block as read back from storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBlock {
  pub id: i64,
  pub created_at: DateTime<Utc>,
  #[serde(flatten)]
  pub payload: BlockPayload,
}

/// Row for block listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BlockSummary {
  pub id: i64,
  pub block_length: i64,
  pub progression_rate: f64,
  pub deload_rate: f64,
  pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_expand_numbers_sets_from_one() {
    let prescription = Prescription {
      sets: 3,
      reps: 5,
      load_min: Some(100.0),
      load_max: None,
      rpe: Some(8.0),
      tempo: Tempo::Explosive,
    };
    let sets = prescription.expand();
    assert_eq!(sets.len(), 3);
    assert_eq!(
      sets.iter().map(|s| s.set_number).collect::<Vec<_>>(),
      vec![1, 2, 3]
    );
    assert!(sets.iter().all(|s| s.target_sets == 3 && s.target_load_max.is_none()));
  }

  #[test]
  fn test_base_prescription_reads_first_set() {
    let mut sets = Prescription {
      sets: 2,
      reps: 8,
      load_min: Some(60.0),
      load_max: Some(65.0),
      rpe: None,
      tempo: Tempo::Controlled,
    }
    .expand();
    sets[1].target_load_min = Some(999.0);

    let exercise = BlockExercise {
      id: None,
      name: "Row".to_string(),
      category: Category::Accessory,
      order_in_workout: 1,
      prescribed_sets: sets,
    };
    let base = exercise.base_prescription().unwrap();
    assert_eq!(base.sets, 2);
    assert_eq!(base.load_min, Some(60.0));
  }

  #[test]
  fn test_prescribed_set_uses_rest_field_names() {
    let json = serde_json::json!({
      "setNumber": 1,
      "targetSets": 3,
      "targetReps": 5,
      "targetLoadMin": 100.0,
      "targetLoadMax": null,
      "targetRPE": 8,
      "tempo": "EXPLOSIVE"
    });
    let set: PrescribedSet = serde_json::from_value(json).unwrap();
    assert_eq!(set.target_rpe, Some(8.0));
    assert_eq!(set.target_load_max, None);
    assert!(!set.video_required);

    let back = serde_json::to_value(&set).unwrap();
    assert!(back.get("targetRPE").is_some());
    assert!(back["targetLoadMax"].is_null());
  }

  #[test]
  fn test_week_end_date() {
    let week = PayloadWeek {
      week_number: 1,
      week_type: WeekType::Base,
      start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
      days: vec![],
    };
    assert_eq!(week.end_date(), NaiveDate::from_ymd_opt(2026, 1, 11).unwrap());
  }
}
