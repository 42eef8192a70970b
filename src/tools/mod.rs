/// MCP tools for habits, check-ins and analytics
///
/// This module contains all the MCP tools that external clients (like Claude)
/// can call. Each tool takes a parameter struct (deserialized from the call's
/// arguments, with a JSON schema published in `tools/list`) and returns a
/// serializable result. `today` is always passed in by the server.

pub mod create;
pub mod list;
pub mod log;
pub mod stats;
pub mod status;
pub mod update;

// Re-export tool functions for easy access
pub use create::*;
pub use list::*;
pub use log::*;
pub use stats::*;
pub use status::*;
pub use update::*;

use thiserror::Error;

use crate::analytics::AnalyticsError;
use crate::domain::{CalendarDate, CheckInId, DomainError, HabitId};
use crate::mcp::protocol::{error_codes, storage_error_to_json_rpc_code};
use crate::storage::StorageError;

/// Errors a tool call can end with
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error("Failed to serialize result: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// JSON-RPC error code reported to the client
    pub fn code(&self) -> i32 {
        match self {
            ToolError::InvalidParams(_) => error_codes::INVALID_PARAMS,
            ToolError::Domain(_) => error_codes::VALIDATION_ERROR,
            ToolError::Storage(e) => storage_error_to_json_rpc_code(e),
            ToolError::Analytics(AnalyticsError::Domain(_)) => error_codes::VALIDATION_ERROR,
            ToolError::Analytics(_) => error_codes::STORAGE_ERROR,
            ToolError::Serialization(_) => error_codes::INTERNAL_ERROR,
        }
    }
}

pub(crate) fn parse_habit_id(value: &str) -> Result<HabitId, ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::InvalidParams("habit_id cannot be empty".to_string()));
    }
    Ok(HabitId::parse(value.trim())?)
}

pub(crate) fn parse_check_in_id(value: &str) -> Result<CheckInId, ToolError> {
    Ok(CheckInId::parse(value.trim())?)
}

pub(crate) fn parse_optional_date(value: Option<&str>) -> Result<Option<CalendarDate>, ToolError> {
    value.map(CalendarDate::parse).transpose().map_err(ToolError::from)
}
