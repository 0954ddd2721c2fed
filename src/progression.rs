//! Progressive Overload Engine
//!
//! Expands one base week into a full training block:
//! - week 1 is the base week verbatim
//! - weeks 2..N-1 compound the base load by `(1 + progression_rate)^(week - 1)`
//! - week N deloads to `deload_rate` of the base load
//! - every derived load is snapped to 2.5 kg
//!
//! Min and max loads are computed independently. An exercise without a load
//! never gains one.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BlockError, BlockResult};
use crate::models::{
    BaseExercise, BaseWeek, GeneratedWeek, TrainingBlock, WeekDay, WeekExercise, WeekType,
};
use crate::rounding::round_to_training_increment;

pub const DEFAULT_BLOCK_LENGTH: u32 = 5;
pub const DEFAULT_PROGRESSION_RATE: f64 = 0.075;
pub const DEFAULT_DELOAD_RATE: f64 = 0.85;

// ---------------------------------------------------------------------------
/// Progression Settings: the three scalars every block is generated from
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionSettings {
    pub block_length: u32,
    pub progression_rate: f64,
    pub deload_rate: f64,
}

impl Default for ProgressionSettings {
    fn default() -> Self {
        Self {
            block_length: DEFAULT_BLOCK_LENGTH,
            progression_rate: DEFAULT_PROGRESSION_RATE,
            deload_rate: DEFAULT_DELOAD_RATE,
        }
    }
}

impl ProgressionSettings {
    /// Rejects a zero-length block and non-finite rates. Everything else
    /// (negative rates, deload above 1.0) is computed as given.
    pub fn validate(&self) -> BlockResult<()> {
        if self.block_length < 1 {
            return Err(BlockError::InvalidArgument(
                "block length must be at least 1 week".to_string(),
            ));
        }
        if !self.progression_rate.is_finite() {
            return Err(BlockError::InvalidArgument(format!(
                "progression rate must be finite, got {}",
                self.progression_rate
            )));
        }
        if !self.deload_rate.is_finite() {
            return Err(BlockError::InvalidArgument(format!(
                "deload rate must be finite, got {}",
                self.deload_rate
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
/// Week Loads
// ---------------------------------------------------------------------------

/// Classify a week by its position. Week 1 wins over deload for one-week blocks.
pub fn week_type(week_number: u32, block_length: u32) -> WeekType {
    if week_number == 1 {
        WeekType::Base
    } else if week_number == block_length {
        WeekType::Deload
    } else {
        WeekType::Progression
    }
}

/// Target load for one week, from a base (week 1) load
pub fn compute_week_load(
    base_load: f64,
    week_number: u32,
    progression_rate: f64,
    deload_rate: f64,
    block_length: u32,
) -> f64 {
    match week_type(week_number, block_length) {
        WeekType::Base => base_load,
        WeekType::Deload => round_to_training_increment(base_load * deload_rate),
        WeekType::Progression => {
            let exponent = week_number.saturating_sub(1) as i32;
            round_to_training_increment(base_load * (1.0 + progression_rate).powi(exponent))
        }
    }
}

fn derive_exercise(
    exercise: &BaseExercise,
    week_number: u32,
    settings: &ProgressionSettings,
) -> WeekExercise {
    let load_for = |base: f64| {
        compute_week_load(
            base,
            week_number,
            settings.progression_rate,
            settings.deload_rate,
            settings.block_length,
        )
    };

    WeekExercise {
        name: exercise.name.clone(),
        category: exercise.category,
        sets: exercise.sets,
        reps: exercise.reps,
        load_min: exercise.base_load_min.map(load_for),
        load_max: exercise.base_load_max.map(load_for),
        rpe: exercise.rpe,
        tempo: exercise.tempo,
    }
}

// ---------------------------------------------------------------------------
/// Block Generation
// ---------------------------------------------------------------------------

/// Expand `base_week` into `block_length` weeks.
///
/// Every week has the base week's days in the base week's order, with the same
/// exercises in the same order. The base week is only read.
pub fn generate_block_weeks(
    base_week: &BaseWeek,
    block_length: u32,
    progression_rate: f64,
    deload_rate: f64,
) -> BlockResult<Vec<GeneratedWeek>> {
    let settings = ProgressionSettings {
        block_length,
        progression_rate,
        deload_rate,
    };
    settings.validate()?;

    debug!(
        "Generating {} weeks from {} days ({} exercises), progression {}, deload {}",
        block_length,
        base_week.days.len(),
        base_week.exercise_count(),
        progression_rate,
        deload_rate
    );

    let weeks = (1..=block_length)
        .map(|week_number| GeneratedWeek {
            week_number,
            days: base_week
                .days
                .iter()
                .map(|day| WeekDay {
                    day_number: day.day_number,
                    exercises: day
                        .exercises
                        .iter()
                        .map(|ex| derive_exercise(ex, week_number, &settings))
                        .collect(),
                })
                .collect(),
        })
        .collect();

    Ok(weeks)
}

impl TrainingBlock {
    /// Generate a fresh block stamped with the current time
    pub fn generate(base_week: &BaseWeek, settings: &ProgressionSettings) -> BlockResult<Self> {
        let weeks = generate_block_weeks(
            base_week,
            settings.block_length,
            settings.progression_rate,
            settings.deload_rate,
        )?;

        Ok(Self {
            block_length: settings.block_length,
            progression_rate: settings.progression_rate,
            deload_rate: settings.deload_rate,
            created_at: Utc::now(),
            weeks,
        })
    }
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
