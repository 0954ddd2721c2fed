//! Base week CSV import
//!
//! Format: `Day,Exercise,Sets,Reps,BaseLoadMin,BaseLoadMax,RPE` with optional
//! `Category` and `Tempo` columns, any column order, no quoting.

use std::collections::HashMap;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::{BlockError, BlockResult};
use crate::models::{BaseExercise, BaseWeek, Category, Tempo};

pub const REQUIRED_HEADERS: [&str; 7] = [
  "Day",
  "Exercise",
  "Sets",
  "Reps",
  "BaseLoadMin",
  "BaseLoadMax",
  "RPE",
];

struct Row<'a> {
  line: usize,
  cells: HashMap<&'a str, &'a str>,
}

impl<'a> Row<'a> {
  fn text(&self, header: &str) -> Option<&'a str> {
    self.cells.get(header).copied().filter(|v| !v.is_empty())
  }

  fn number(&self, header: &str) -> BlockResult<Option<f64>> {
    match self.text(header) {
      None => Ok(None),
      Some(raw) => raw
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(Some)
        .ok_or_else(|| {
          BlockError::Csv(format!("Row {}: {} is not a number: '{}'", self.line, header, raw))
        }),
    }
  }

  fn count(&self, header: &str) -> BlockResult<u32> {
    let raw = self
      .text(header)
      .ok_or_else(|| BlockError::Csv(format!("Row {}: {} is required", self.line, header)))?;
    raw
      .parse::<u32>()
      .ok()
      .filter(|n| *n > 0)
      .ok_or_else(|| {
        BlockError::Csv(format!(
          "Row {}: {} must be a positive whole number, got '{}'",
          self.line, header, raw
        ))
      })
  }

  fn load(&self, header: &str) -> BlockResult<Option<f64>> {
    match self.number(header)? {
      Some(load) if load < 0.0 => Err(BlockError::Csv(format!(
        "Row {}: {} cannot be negative",
        self.line, header
      ))),
      other => Ok(other),
    }
  }

  fn parsed<T: FromStr<Err = String> + Default>(&self, header: &str) -> BlockResult<T> {
    match self.text(header) {
      None => Ok(T::default()),
      Some(raw) => raw
        .parse::<T>()
        .map_err(|e| BlockError::Csv(format!("Row {}: {}", self.line, e))),
    }
  }

  fn to_exercise(&self) -> BlockResult<(u32, BaseExercise)> {
    let day = self.count("Day")?;
    let name = self
      .text("Exercise")
      .ok_or_else(|| BlockError::Csv(format!("Row {}: Exercise is required", self.line)))?;

    let rpe = self.number("RPE")?;
    if let Some(r) = rpe {
      if !(1.0..=10.0).contains(&r) {
        return Err(BlockError::Csv(format!(
          "Row {}: RPE must be between 1 and 10, got {}",
          self.line, r
        )));
      }
    }

    Ok((
      day,
      BaseExercise {
        name: name.to_string(),
        category: self.parsed::<Category>("Category")?,
        sets: self.count("Sets")?,
        reps: self.count("Reps")?,
        base_load_min: self.load("BaseLoadMin")?,
        base_load_max: self.load("BaseLoadMax")?,
        rpe,
        tempo: self.parsed::<Tempo>("Tempo")?,
      },
    ))
  }
}

/// Parse a base week. Days keep the order they first appear in.
pub fn parse_block_csv(text: &str) -> BlockResult<BaseWeek> {
  let lines: Vec<&str> = text.trim().lines().collect();
  if lines.len() < 2 {
    return Err(BlockError::Csv(
      "CSV file must have at least a header row and one data row".to_string(),
    ));
  }

  let headers: Vec<&str> = lines[0].split(',').map(str::trim).collect();
  if !REQUIRED_HEADERS.iter().all(|h| headers.contains(h)) {
    return Err(BlockError::Csv(format!(
      "CSV must contain all required headers: {}",
      REQUIRED_HEADERS.join(", ")
    )));
  }

  let mut week = BaseWeek::new();

  for (index, line) in lines.iter().enumerate().skip(1) {
    let line = line.trim();
    if line.is_empty() {
      continue;
    }

    let values: Vec<&str> = line.split(',').map(str::trim).collect();
    if values.len() != headers.len() {
      warn!("Skipping row {}: incorrect number of columns", index + 1);
      continue;
    }

    let row = Row {
      line: index + 1,
      cells: headers.iter().copied().zip(values).collect(),
    };
    let (day, exercise) = row.to_exercise()?;
    week.push_exercise(day, exercise);
  }

  debug!(
    "Parsed base week: {} days, {} exercises",
    week.days.len(),
    week.exercise_count()
  );

  Ok(week)
}
