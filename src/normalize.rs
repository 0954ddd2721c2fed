//! Translation layer for stored block JSON
//!
//! Blocks have been saved in two shapes over time:
//! - `days` as a list of `{dayNumber, dayName, restDay, exercises}` records
//! - `days` as a map of day-number strings to exercise lists
//!
//! and exercises either as `{name, prescribedSets: [...]}` or as flat
//! `{Exercise, Sets, Reps, LoadMin, LoadMax, RPE, Tempo}` rows. Everything is
//! turned into the canonical `BlockDay` list here so the copy transform only
//! ever sees one shape. Malformed pieces are dropped, never fatal.

use chrono::{NaiveDate, Utc};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{BlockError, BlockResult};
use crate::models::{
    BlockDay, BlockExercise, BlockPayload, Category, PayloadWeek, PrescribedSet, Tempo,
    WeekExercise, WeekType,
};
use crate::payload::week_start_date;
use crate::progression::{week_type, DEFAULT_DELOAD_RATE, DEFAULT_PROGRESSION_RATE};

const DEFAULT_REPS: u32 = 10;

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// First present, non-null field among `keys`
fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

/// Numbers may have been stored as JSON numbers or numeric strings
fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn as_count(value: &Value) -> Option<u32> {
    as_number(value)
        .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64)
        .map(|n| n as u32)
}

fn number_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    field(obj, keys).and_then(as_number)
}

fn count_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<u32> {
    field(obj, keys).and_then(as_count)
}

fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    field(obj, keys).and_then(Value::as_str).map(str::to_string)
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?;
    let date_part = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

// ---------------------------------------------------------------------------
// Exercises
// ---------------------------------------------------------------------------

/// Missing counts fall back to the set's position and the length of its list
fn normalize_prescribed_set(
    value: &Value,
    position: usize,
    set_count: usize,
) -> Option<PrescribedSet> {
    let obj = value.as_object()?;
    Some(PrescribedSet {
        id: field(obj, &["id"]).and_then(Value::as_i64),
        set_number: count_field(obj, &["setNumber"]).unwrap_or(position as u32 + 1),
        target_sets: count_field(obj, &["targetSets", "sets", "Sets"])
            .unwrap_or(set_count as u32),
        target_reps: count_field(obj, &["targetReps", "reps", "Reps"]).unwrap_or(DEFAULT_REPS),
        target_load_min: number_field(obj, &["targetLoadMin", "loadMin", "LoadMin"]),
        target_load_max: number_field(obj, &["targetLoadMax", "loadMax", "LoadMax"]),
        target_rpe: number_field(obj, &["targetRPE", "targetRpe", "rpe", "RPE"]),
        tempo: string_field(obj, &["tempo", "Tempo"])
            .and_then(|t| t.parse::<Tempo>().ok())
            .unwrap_or_default(),
        video_required: field(obj, &["videoRequired"])
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

fn normalize_exercise(value: &Value, position: usize) -> Option<BlockExercise> {
    let obj = value.as_object()?;
    let name = string_field(obj, &["name", "Exercise", "exerciseName"]).unwrap_or_default();
    let category = string_field(obj, &["category", "Category"])
        .and_then(|c| c.parse::<Category>().ok())
        .unwrap_or_default();
    let order_in_workout =
        count_field(obj, &["orderInWorkout"]).unwrap_or(position as u32 + 1);

    if let Some(sets) = obj.get("prescribedSets").and_then(Value::as_array) {
        let prescribed_sets = sets
            .iter()
            .enumerate()
            .filter_map(|(i, set)| {
                let parsed = normalize_prescribed_set(set, i, sets.len());
                if parsed.is_none() {
                    warn!("Dropping malformed prescribed set of '{}'", name);
                }
                parsed
            })
            .collect();

        return Some(BlockExercise {
            id: field(obj, &["id", "exerciseId"]).and_then(Value::as_i64),
            name,
            category,
            order_in_workout,
            prescribed_sets,
        });
    }

    let flat = WeekExercise {
        name,
        category,
        sets: count_field(obj, &["sets", "Sets", "targetSets"]).unwrap_or(1),
        reps: count_field(obj, &["reps", "Reps", "targetReps"]).unwrap_or(DEFAULT_REPS),
        load_min: number_field(
            obj,
            &["loadMin", "LoadMin", "targetLoadMin", "baseLoadMin", "BaseLoadMin"],
        ),
        load_max: number_field(
            obj,
            &["loadMax", "LoadMax", "targetLoadMax", "baseLoadMax", "BaseLoadMax"],
        ),
        rpe: number_field(obj, &["rpe", "RPE", "targetRPE"]),
        tempo: string_field(obj, &["tempo", "Tempo"])
            .and_then(|t| t.parse::<Tempo>().ok())
            .unwrap_or_default(),
    };

    Some(BlockExercise::from_week_exercise(&flat, order_in_workout))
}

fn normalize_exercises(value: Option<&Value>) -> Vec<BlockExercise> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| normalize_exercise(item, i))
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Days
// ---------------------------------------------------------------------------

/// Canonical day order: ascending day number, ties keep their relative order
pub fn sort_days(mut days: Vec<BlockDay>) -> Vec<BlockDay> {
    days.sort_by_key(|d| d.day_number);
    days
}

/// Turn either stored day shape into a sorted `BlockDay` list.
///
/// Anything that is neither a list nor a map gives an empty list.
pub fn normalize_days(value: &Value) -> Vec<BlockDay> {
    let days = match value {
        Value::Array(records) => records
            .iter()
            .filter_map(|record| {
                let obj = record.as_object()?;
                Some(BlockDay {
                    day_number: count_field(obj, &["dayNumber", "day", "Day"])?,
                    day_name: string_field(obj, &["dayName"]),
                    rest_day: field(obj, &["restDay"]).and_then(Value::as_bool),
                    exercises: normalize_exercises(obj.get("exercises")),
                })
            })
            .collect(),
        Value::Object(by_day) => by_day
            .iter()
            .filter_map(|(key, exercises)| {
                let day_number = key.trim().parse::<u32>().ok()?;
                Some(BlockDay {
                    day_number,
                    day_name: None,
                    rest_day: None,
                    exercises: normalize_exercises(Some(exercises)),
                })
            })
            .collect(),
        _ => Vec::new(),
    };

    sort_days(days)
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// Read a stored block of either historical shape into a `BlockPayload`.
///
/// Missing rates fall back to the defaults, a missing week number to the
/// week's position, a missing start date to today plus seven days per week.
pub fn normalize_block(value: &Value) -> BlockResult<BlockPayload> {
    let obj = value
        .as_object()
        .ok_or_else(|| BlockError::InvalidArgument("block must be a JSON object".to_string()))?;

    let weeks_json = obj
        .get("weeks")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let block_length =
        count_field(obj, &["blockLength"]).unwrap_or(weeks_json.len() as u32);
    let today = Utc::now().date_naive();

    let weeks = weeks_json
        .iter()
        .enumerate()
        .filter_map(|(index, week)| {
            let week_obj = week.as_object()?;
            let week_number = count_field(week_obj, &["weekNumber"]).unwrap_or(index as u32 + 1);
            Some(PayloadWeek {
                week_number,
                week_type: string_field(week_obj, &["weekType"])
                    .and_then(|t| t.parse::<WeekType>().ok())
                    .unwrap_or_else(|| week_type(week_number, block_length)),
                start_date: field(week_obj, &["startDate"])
                    .and_then(parse_date)
                    .unwrap_or_else(|| week_start_date(today, index)),
                days: week_obj.get("days").map(normalize_days).unwrap_or_default(),
            })
        })
        .collect();

    Ok(BlockPayload {
        block_length,
        progression_rate: number_field(obj, &["progressionRate"])
            .unwrap_or(DEFAULT_PROGRESSION_RATE),
        deload_rate: number_field(obj, &["deloadRate"]).unwrap_or(DEFAULT_DELOAD_RATE),
        weeks,
    })
}
