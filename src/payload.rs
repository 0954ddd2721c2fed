//! Generated block -> storage payload
//!
//! Flat per-week exercises become one prescribed set per planned set, weeks get
//! their type and a start date seven days after the previous one.

use chrono::{Duration, NaiveDate};

use crate::models::{
    BlockDay, BlockExercise, BlockPayload, PayloadWeek, Prescription, TrainingBlock, WeekDay,
    WeekExercise,
};
use crate::progression::week_type;

/// Start date of the week at `week_index` (0-based) in a block starting `start`
pub fn week_start_date(start: NaiveDate, week_index: usize) -> NaiveDate {
    start + Duration::days(7 * week_index as i64)
}

pub fn day_name(day_number: u32) -> String {
    format!("Day {}", day_number)
}

impl BlockExercise {
    /// Materialize a flat exercise. A zero set count still prescribes one set.
    pub fn from_week_exercise(exercise: &WeekExercise, order_in_workout: u32) -> Self {
        let prescription = Prescription {
            sets: exercise.sets.max(1),
            reps: exercise.reps,
            load_min: exercise.load_min,
            load_max: exercise.load_max,
            rpe: exercise.rpe,
            tempo: exercise.tempo,
        };

        Self {
            id: None,
            name: exercise.name.clone(),
            category: exercise.category,
            order_in_workout,
            prescribed_sets: prescription.expand(),
        }
    }
}

impl BlockDay {
    pub fn from_week_day(day: &WeekDay) -> Self {
        Self {
            day_number: day.day_number,
            day_name: Some(day_name(day.day_number)),
            rest_day: Some(day.exercises.is_empty()),
            exercises: day
                .exercises
                .iter()
                .zip(1..)
                .map(|(ex, order)| BlockExercise::from_week_exercise(ex, order))
                .collect(),
        }
    }
}

/// Build the storage payload for a freshly generated block
pub fn build_block_payload(block: &TrainingBlock, start_date: NaiveDate) -> BlockPayload {
    BlockPayload {
        block_length: block.block_length,
        progression_rate: block.progression_rate,
        deload_rate: block.deload_rate,
        weeks: block
            .weeks
            .iter()
            .enumerate()
            .map(|(index, week)| PayloadWeek {
                week_number: week.week_number,
                week_type: week_type(week.week_number, block.block_length),
                start_date: week_start_date(start_date, index),
                days: week.days.iter().map(BlockDay::from_week_day).collect(),
            })
            .collect(),
    }
}
