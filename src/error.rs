use serde::Serialize;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum BlockError {
  #[error("Invalid argument: {0}")]
  InvalidArgument(String),

  #[error("CSV error: {0}")]
  Csv(String),

  #[error("Missing configuration: {0}")]
  MissingConfig(String),

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Database error: {0}")]
  Database(String),

  #[error("Serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Serialize for BlockError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

pub type BlockResult<T> = Result<T, BlockError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_serializes_as_message() {
    let err = BlockError::NotFound("Training block 7".into());
    let json = serde_json::to_string(&err).unwrap();
    assert_eq!(json, "\"Not found: Training block 7\"");
  }

  #[test]
  fn test_serde_error_converts() {
    let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
    let err: BlockError = parse.unwrap_err().into();
    assert!(matches!(err, BlockError::Serialization(_)));
  }
}
