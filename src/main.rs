//! block-trainer - generate, copy and log strength training blocks
//!
//! Every command prints JSON to stdout.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::error;

use block_trainer_lib::commands::{blocks, workouts};
use block_trainer_lib::config::DATABASE_URL_VAR;
use block_trainer_lib::models::{LogWorkoutRequest, NewActualSet, TrainingBlock};
use block_trainer_lib::{
    build_block_payload, parse_block_csv, AppConfig, AppState, BlockError, BlockResult,
    ProgressionSettings,
};

#[derive(Parser)]
#[command(name = "block-trainer")]
#[command(author, version, about = "Progressive-overload strength training blocks")]
struct Cli {
    /// SQLite database URL
    #[arg(long, global = true, env = DATABASE_URL_VAR)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the configured progression defaults
#[derive(Args)]
struct BlockOptions {
    /// Number of weeks in the block
    #[arg(long)]
    block_length: Option<u32>,

    /// Compounding weekly increase, e.g. 0.075
    #[arg(long)]
    progression_rate: Option<f64>,

    /// Multiplier for the final week, e.g. 0.85
    #[arg(long)]
    deload_rate: Option<f64>,

    /// First day of week 1 (YYYY-MM-DD), defaults to today
    #[arg(long)]
    start_date: Option<NaiveDate>,
}

impl BlockOptions {
    fn settings(&self, defaults: ProgressionSettings) -> ProgressionSettings {
        ProgressionSettings {
            block_length: self.block_length.unwrap_or(defaults.block_length),
            progression_rate: self.progression_rate.unwrap_or(defaults.progression_rate),
            deload_rate: self.deload_rate.unwrap_or(defaults.deload_rate),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a block from a base-week CSV without storing it
    Preview {
        /// Base week CSV (`-` for stdin)
        csv: PathBuf,

        #[command(flatten)]
        options: BlockOptions,
    },

    /// Generate a block from a base-week CSV and store it
    Create {
        /// Base week CSV (`-` for stdin)
        csv: PathBuf,

        #[command(flatten)]
        options: BlockOptions,
    },

    /// Copy a block with all loads scaled by a percentage
    Copy {
        /// Id of a stored block to copy
        #[arg(long, conflicts_with = "from_file", required_unless_present = "from_file")]
        block_id: Option<i64>,

        /// JSON block to copy instead of a stored one
        #[arg(long)]
        from_file: Option<PathBuf>,

        /// Load change in percent, e.g. 10 or -5
        #[arg(long, allow_hyphen_values = true)]
        percent: f64,

        /// First day of week 1 (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start_date: Option<NaiveDate>,
    },

    /// List stored blocks
    List,

    /// Show a stored block
    Show { block_id: i64 },

    /// Delete a block, or a single exercise with --exercise
    Delete {
        id: i64,

        /// Treat the id as an exercise id
        #[arg(long)]
        exercise: bool,
    },

    /// Log a workout from a JSON request (`-` for stdin)
    Log { request: PathBuf },

    /// Remove everything logged for one day of a block
    Unlog {
        block_id: i64,

        #[arg(long)]
        week: u32,

        #[arg(long)]
        day: u32,
    },

    /// List the sets logged against an exercise
    Sets { exercise_id: i64 },

    /// Replace one logged set with a JSON set (`-` for stdin)
    EditSet { set_id: i64, set: PathBuf },

    /// Delete one logged set
    DeleteSet { set_id: i64 },

    /// Show logged workouts for a block, or one day of it
    History {
        block_id: i64,

        #[arg(long, requires = "day")]
        week: Option<u32>,

        #[arg(long, requires = "week")]
        day: Option<u32>,
    },
}

fn read_input(path: &Path) -> BlockResult<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| BlockError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
        return Ok(text);
    }
    fs::read_to_string(path).map_err(|e| {
        BlockError::InvalidArgument(format!("Failed to read {}: {}", path.display(), e))
    })
}

fn print_json<T: Serialize>(value: &T) -> BlockResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Generate and print a block without opening the database
fn preview(csv: &Path, options: &BlockOptions, config: &AppConfig) -> BlockResult<()> {
    let base_week = parse_block_csv(&read_input(csv)?)?;
    let block = TrainingBlock::generate(&base_week, &options.settings(config.defaults))?;
    let start = options
        .start_date
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    print_json(&build_block_payload(&block, start))
}

async fn run(cli: Cli) -> BlockResult<()> {
    let mut config = AppConfig::from_env()?;
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }

    // Preview never opens the database
    let command = match cli.command {
        Commands::Preview { csv, options } => return preview(&csv, &options, &config),
        command => command,
    };

    let state = AppState::open(config).await?;

    match command {
        Commands::Preview { csv, options } => preview(&csv, &options, &state.config),

        Commands::Create { csv, options } => {
            let settings = options.settings(state.config.defaults);
            let csv_text = read_input(&csv)?;
            let block =
                blocks::create_block_from_csv(&state, &csv_text, Some(settings), options.start_date)
                    .await?;
            print_json(&block)
        }

        Commands::Copy {
            block_id,
            from_file,
            percent,
            start_date,
        } => {
            let block = match (block_id, from_file) {
                (Some(id), _) => blocks::copy_block(&state, id, percent, start_date).await?,
                (None, Some(path)) => {
                    let source: serde_json::Value = serde_json::from_str(&read_input(&path)?)?;
                    blocks::copy_block_from_json(&state, &source, percent, start_date).await?
                }
                (None, None) => {
                    return Err(BlockError::InvalidArgument(
                        "either --block-id or --from-file is required".to_string(),
                    ))
                }
            };
            print_json(&block)
        }

        Commands::List => print_json(&blocks::list_blocks(&state).await?),

        Commands::Show { block_id } => print_json(&blocks::get_block(&state, block_id).await?),

        Commands::Delete { id, exercise } => {
            if exercise {
                blocks::delete_exercise(&state, id).await?;
            } else {
                blocks::delete_block(&state, id).await?;
            }
            print_json(&serde_json::json!({ "deleted": id }))
        }

        Commands::Log { request } => {
            let request: LogWorkoutRequest = serde_json::from_str(&read_input(&request)?)?;
            print_json(&workouts::log_workout(&state, request).await?)
        }

        Commands::Unlog {
            block_id,
            week,
            day,
        } => {
            let removed = workouts::delete_workout(&state, block_id, week, day).await?;
            print_json(&serde_json::json!({ "deletedSets": removed }))
        }

        Commands::Sets { exercise_id } => {
            print_json(&workouts::list_actual_sets(&state, exercise_id).await?)
        }

        Commands::EditSet { set_id, set } => {
            let update: NewActualSet = serde_json::from_str(&read_input(&set)?)?;
            print_json(&workouts::update_actual_set(&state, set_id, update).await?)
        }

        Commands::DeleteSet { set_id } => {
            workouts::delete_actual_set(&state, set_id).await?;
            print_json(&serde_json::json!({ "deleted": set_id }))
        }

        Commands::History {
            block_id,
            week,
            day,
        } => match (week, day) {
            (Some(week), Some(day)) => {
                print_json(&workouts::get_workout(&state, block_id, week, day).await?)
            }
            _ => print_json(&workouts::get_block_progress(&state, block_id).await?),
        },
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
