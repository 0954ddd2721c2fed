use serde::{Deserialize, Serialize};

/// Lift classification. Display only, never changes a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
  #[serde(alias = "Squat")]
  Squat,
  #[serde(alias = "Bench")]
  Bench,
  #[serde(alias = "Deadlift")]
  Deadlift,
  #[default]
  #[serde(alias = "Accessory")]
  Accessory,
}

impl std::fmt::Display for Category {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Squat => write!(f, "SQUAT"),
      Self::Bench => write!(f, "BENCH"),
      Self::Deadlift => write!(f, "DEADLIFT"),
      Self::Accessory => write!(f, "ACCESSORY"),
    }
  }
}

impl std::str::FromStr for Category {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_uppercase().as_str() {
      "SQUAT" => Ok(Self::Squat),
      "BENCH" => Ok(Self::Bench),
      "DEADLIFT" => Ok(Self::Deadlift),
      "ACCESSORY" => Ok(Self::Accessory),
      _ => Err(format!("Unknown category: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tempo {
  #[serde(alias = "Explosive")]
  Explosive,
  #[default]
  #[serde(alias = "Controlled")]
  Controlled,
}

impl std::fmt::Display for Tempo {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Explosive => write!(f, "EXPLOSIVE"),
      Self::Controlled => write!(f, "CONTROLLED"),
    }
  }
}

impl std::str::FromStr for Tempo {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_uppercase().as_str() {
      "EXPLOSIVE" => Ok(Self::Explosive),
      "CONTROLLED" => Ok(Self::Controlled),
      _ => Err(format!("Unknown tempo: {}", s)),
    }
  }
}

/// One planned exercise of the base week, loads in kg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseExercise {
  pub name: String,
  #[serde(default)]
  pub category: Category,
  pub sets: u32,
  pub reps: u32,
  #[serde(default)]
  pub base_load_min: Option<f64>,
  #[serde(default)]
  pub base_load_max: Option<f64>,
  #[serde(default)]
  pub rpe: Option<f64>,
  #[serde(default)]
  pub tempo: Tempo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseDay {
  pub day_number: u32,
  pub exercises: Vec<BaseExercise>,
}

/// The user-authored week 1. Day order is insertion order, not numeric order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BaseWeek {
  pub days: Vec<BaseDay>,
}

impl BaseWeek {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append an exercise to `day_number`, opening the day at the end if it is new
  pub fn push_exercise(&mut self, day_number: u32, exercise: BaseExercise) {
    match self.days.iter_mut().find(|d| d.day_number == day_number) {
      Some(day) => day.exercises.push(exercise),
      None => self.days.push(BaseDay {
        day_number,
        exercises: vec![exercise],
      }),
    }
  }

  pub fn exercise_count(&self) -> usize {
    self.days.iter().map(|d| d.exercises.len()).sum()
  }
}

/// An exercise as prescribed for one generated week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekExercise {
  pub name: String,
  pub category: Category,
  pub sets: u32,
  pub reps: u32,
  pub load_min: Option<f64>,
  pub load_max: Option<f64>,
  pub rpe: Option<f64>,
  pub tempo: Tempo,
}
