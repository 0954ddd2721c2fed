use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::AppConfig;
use crate::error::{BlockError, BlockResult};

pub type DbPool = SqlitePool;

/// Application state shared by every command
pub struct AppState {
  pub db: DbPool,
  pub config: AppConfig,
}

/// File path behind a `sqlite://` URL, if it names a file
fn db_file_path(database_url: &str) -> Option<&Path> {
  let rest = database_url
    .strip_prefix("sqlite://")
    .or_else(|| database_url.strip_prefix("sqlite:"))?;
  let path = rest.split('?').next().unwrap_or(rest);
  if path.is_empty() || path.starts_with(":memory:") {
    None
  } else {
    Some(Path::new(path))
  }
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(database_url: &str) -> BlockResult<DbPool> {
  // Create directory if it doesn't exist
  if let Some(parent) = db_file_path(database_url).and_then(Path::parent) {
    if !parent.as_os_str().is_empty() {
      fs::create_dir_all(parent).map_err(|e| {
        BlockError::Database(format!("Failed to create {}: {}", parent.display(), e))
      })?;
    }
  }

  info!("Initializing database at: {}", database_url);

  // Every connection to `:memory:` opens its own empty database
  let max_connections = if db_file_path(database_url).is_some() { 5 } else { 1 };

  let pool = SqlitePoolOptions::new()
    .max_connections(max_connections)
    .connect(database_url)
    .await
    .map_err(|e| BlockError::Database(format!("Failed to connect: {}", e)))?;

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .map_err(|e| BlockError::Database(format!("Failed to run migrations: {}", e)))?;

  info!("Database initialized successfully");

  Ok(pool)
}

impl AppState {
  pub async fn open(config: AppConfig) -> BlockResult<Self> {
    let db = initialize_db(&config.database_url).await?;
    Ok(Self { db, config })
  }
}
