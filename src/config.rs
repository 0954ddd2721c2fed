use std::env;
use std::str::FromStr;

use crate::error::{BlockError, BlockResult};
use crate::progression::ProgressionSettings;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

pub const DATABASE_URL_VAR: &str = "BLOCK_TRAINER_DATABASE_URL";
pub const BLOCK_LENGTH_VAR: &str = "BLOCK_TRAINER_BLOCK_LENGTH";
pub const PROGRESSION_RATE_VAR: &str = "BLOCK_TRAINER_PROGRESSION_RATE";
pub const DELOAD_RATE_VAR: &str = "BLOCK_TRAINER_DELOAD_RATE";

const DEFAULT_DATABASE_URL: &str = "sqlite://block-trainer.db?mode=rwc";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
  pub database_url: String,
  /// Used whenever a block is generated without explicit scalars
  pub defaults: ProgressionSettings,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      database_url: DEFAULT_DATABASE_URL.to_string(),
      defaults: ProgressionSettings::default(),
    }
  }
}

fn parse_var<T: FromStr>(name: &str) -> BlockResult<Option<T>> {
  match env::var(name) {
    Ok(raw) if !raw.trim().is_empty() => raw
      .trim()
      .parse::<T>()
      .map(Some)
      .map_err(|_| BlockError::MissingConfig(format!("{} has an invalid value: '{}'", name, raw))),
    _ => Ok(None),
  }
}

impl AppConfig {
  /// Read configuration from the environment. Unset variables take defaults,
  /// set-but-unparseable ones are an error.
  pub fn from_env() -> BlockResult<Self> {
    let base = Self::default();

    let defaults = ProgressionSettings {
      block_length: parse_var(BLOCK_LENGTH_VAR)?.unwrap_or(base.defaults.block_length),
      progression_rate: parse_var(PROGRESSION_RATE_VAR)?
        .unwrap_or(base.defaults.progression_rate),
      deload_rate: parse_var(DELOAD_RATE_VAR)?.unwrap_or(base.defaults.deload_rate),
    };
    defaults
      .validate()
      .map_err(|e| BlockError::MissingConfig(e.to_string()))?;

    Ok(Self {
      database_url: parse_var(DATABASE_URL_VAR)?.unwrap_or(base.database_url),
      defaults,
    })
  }
}
