/// Public library interface for the Habit Analytics MCP server
///
/// This module exports the analytics engine, the storage layer and the MCP
/// server that ties them together, for use by the binary and by tests.

use std::path::PathBuf;
use thiserror::Error;

pub mod analytics;
pub mod domain;
pub mod mcp;
pub mod storage;
pub mod tools;

// Re-export the most used types
pub use analytics::{AnalyticsConfig, AnalyticsEngine, AnalyticsError, DEFAULT_MAX_CONCURRENT_FETCHES};
pub use domain::*;
pub use storage::{HabitStorage, SqliteStorage, StorageError};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings the binary passes to the server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// SQLite database file
    pub database: PathBuf,
    /// Fixed reference date; when unset the local date is read per request
    pub today: Option<CalendarDate>,
    /// Per-habit rows computed concurrently by `stats_overview`
    pub max_concurrent_fetches: usize,
}

impl ServerConfig {
    pub fn new(database: PathBuf) -> Self {
        Self {
            database,
            today: None,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

/// Habit analytics server that implements the MCP protocol
///
/// This server manages habits and check-ins through a SQLite database and
/// exposes streaks, completion rates and heatmaps as MCP tools.
pub struct HabitAnalyticsServer {
    storage: SqliteStorage,
    analytics: AnalyticsEngine,
    today_override: Option<CalendarDate>,
}

impl HabitAnalyticsServer {
    /// Create a new server from `config`
    ///
    /// This will initialize the SQLite database with the required schema
    /// if it doesn't already exist.
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        tracing::info!("Initializing Habit Analytics server with database: {:?}", config.database);

        let storage = SqliteStorage::new(config.database)?;
        let analytics = AnalyticsEngine::with_config(AnalyticsConfig {
            max_concurrent_fetches: config.max_concurrent_fetches.max(1),
        });

        if let Some(today) = config.today {
            tracing::info!("Using fixed reference date {}", today);
        }

        Ok(Self {
            storage,
            analytics,
            today_override: config.today,
        })
    }

    /// Build a server around an existing storage (useful for testing)
    pub fn with_storage(storage: SqliteStorage, analytics: AnalyticsEngine, today: Option<CalendarDate>) -> Self {
        Self {
            storage,
            analytics,
            today_override: today,
        }
    }

    /// The reference date for one request
    ///
    /// This is the only place the wall clock is consulted.
    pub fn today(&self) -> CalendarDate {
        self.today_override.unwrap_or_else(CalendarDate::today_local)
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method will block until stdin is closed or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server...");

        let habits = self.storage.list_habits(true)?;
        tracing::info!("Server started successfully, found {} existing habits", habits.len());

        let mut mcp_server = mcp::McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    /// Get a reference to the storage layer (useful for testing)
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// Get a reference to the analytics engine (useful for testing)
    pub fn analytics(&self) -> &AnalyticsEngine {
        &self.analytics
    }
}
