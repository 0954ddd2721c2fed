//! Block copy with uniform load scaling
//!
//! Rebuilds a new block payload from an existing block's structure. Every load
//! is multiplied by `1 + percent / 100` and snapped to 0.5 kg; min and max are
//! scaled independently and absent loads stay absent. Start dates are not
//! copied: week `i` of the copy starts `7 * i` days after the copy's start.

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::error::{BlockError, BlockResult};
use crate::models::{BlockDay, BlockExercise, BlockPayload, PayloadWeek, Prescription};
use crate::normalize::sort_days;
use crate::payload::week_start_date;
use crate::rounding::round_to_fine_increment;

fn scale_load(load: Option<f64>, multiplier: f64) -> Option<f64> {
    load.map(|l| round_to_fine_increment(l * multiplier))
}

fn copy_exercise(exercise: &BlockExercise, multiplier: f64) -> BlockExercise {
    let prescribed_sets = exercise
        .base_prescription()
        .map(|base| {
            Prescription {
                load_min: scale_load(base.load_min, multiplier),
                load_max: scale_load(base.load_max, multiplier),
                ..base
            }
            .expand()
        })
        .unwrap_or_default();

    BlockExercise {
        id: None,
        name: exercise.name.clone(),
        category: exercise.category,
        order_in_workout: exercise.order_in_workout,
        prescribed_sets,
    }
}

fn copy_day(day: &BlockDay, multiplier: f64) -> BlockDay {
    BlockDay {
        day_number: day.day_number,
        day_name: day.day_name.clone(),
        rest_day: day.rest_day,
        exercises: day
            .exercises
            .iter()
            .map(|ex| copy_exercise(ex, multiplier))
            .collect(),
    }
}

/// Copy `source` into a new payload with week 1 starting today (UTC)
pub fn build_copy_block_payload(
    source: &BlockPayload,
    load_increase_percent: f64,
) -> BlockResult<BlockPayload> {
    build_copy_block_payload_from(source, load_increase_percent, Utc::now().date_naive())
}

/// Copy `source` into a new payload with week 1 starting on `start_date`
pub fn build_copy_block_payload_from(
    source: &BlockPayload,
    load_increase_percent: f64,
    start_date: NaiveDate,
) -> BlockResult<BlockPayload> {
    if source.weeks.is_empty() {
        return Err(BlockError::InvalidArgument(
            "cannot copy a block without weeks".to_string(),
        ));
    }
    if !load_increase_percent.is_finite() {
        return Err(BlockError::InvalidArgument(format!(
            "load increase must be finite, got {}",
            load_increase_percent
        )));
    }

    let multiplier = 1.0 + load_increase_percent / 100.0;

    let weeks = source
        .weeks
        .iter()
        .enumerate()
        .map(|(index, week)| PayloadWeek {
            week_number: week.week_number,
            week_type: week.week_type,
            start_date: week_start_date(start_date, index),
            days: sort_days(week.days.clone())
                .iter()
                .map(|day| copy_day(day, multiplier))
                .collect(),
        })
        .collect();

    info!(
        "Copied block: {} weeks, {} exercises, loads x{:.3}",
        source.weeks.len(),
        source.exercise_count(),
        multiplier
    );

    Ok(BlockPayload {
        block_length: source.block_length,
        progression_rate: source.progression_rate,
        deload_rate: source.deload_rate,
        weeks,
    })
}
