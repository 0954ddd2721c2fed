//! Host-facing operations over `AppState`
//!
//! Each function mirrors one endpoint of the block trainer API and returns
//! `BlockResult`, whose error serializes to a plain message for hosts.

pub mod blocks;
pub mod workouts;

use chrono::{NaiveDate, Utc};

/// Start date used when the caller does not schedule one
pub(crate) fn start_or_today(start_date: Option<NaiveDate>) -> NaiveDate {
  start_date.unwrap_or_else(|| Utc::now().date_naive())
}
