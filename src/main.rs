/// Main entry point for the Habit Analytics MCP server
///
/// This file sets up logging, parses command line arguments, and starts the MCP server.
/// The server listens for JSON-RPC requests over stdin/stdout following the MCP protocol.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use habit_analytics_mcp::{CalendarDate, HabitAnalyticsServer, ServerConfig, DEFAULT_MAX_CONCURRENT_FETCHES};

/// Get the default database path with robust fallback strategy
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Try various locations in order of preference
    let potential_paths = [
        dirs::home_dir().map(|mut p| {
            p.push(".habit_analytics");
            p
        }),
        dirs::data_dir().map(|mut p| {
            p.push("habit_analytics");
            p
        }),
        dirs::config_dir().map(|mut p| {
            p.push("habit_analytics");
            p
        }),
        std::env::current_dir().ok().map(|mut p| {
            p.push(".habit_analytics");
            p
        }),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            // Make sure the directory is actually writable
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join("habits.db"));
            }
        }
    }

    let mut temp_path = std::env::temp_dir();
    temp_path.push("habit_analytics");
    std::fs::create_dir_all(&temp_path)?;
    temp_path.push("habits.db");

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path)
}

fn parse_date(value: &str) -> Result<CalendarDate, String> {
    CalendarDate::parse(value).map_err(|e| e.to_string())
}

fn parse_concurrency(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        Ok(_) => Err("must be at least 1".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Command line arguments for the Habit Analytics MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Fixed reference date (YYYY-MM-DD) instead of the local calendar date
    #[arg(long, value_parser = parse_date)]
    today: Option<CalendarDate>,

    /// How many habits' stats rows are computed at once
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT_FETCHES, value_parser = parse_concurrency)]
    max_concurrent_fetches: usize,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,

    /// Log filter directives (e.g. "habit_analytics_mcp=trace"); overrides --debug/--verbose
    #[arg(long)]
    log_filter: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    let filter = match &args.log_filter {
        Some(directives) => EnvFilter::try_new(directives)?,
        None => EnvFilter::new(format!("habit_analytics_mcp={}", log_level)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr) // stdout carries the JSON-RPC stream
        .init();

    info!("Starting Habit Analytics MCP server");

    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let config = ServerConfig {
        database: db_path,
        today: args.today,
        max_concurrent_fetches: args.max_concurrent_fetches,
    };

    let server = HabitAnalyticsServer::new(config).await?;
    server.run().await?;

    info!("Habit Analytics MCP server shutdown complete");
    Ok(())
}
