/// Tools for recording and browsing check-ins
///
/// This module implements the checkin_log, checkin_list and checkin_delete
/// MCP tools. Logging a day that already has a check-in updates that record.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsEngine;
use crate::domain::{CalendarDate, CheckIn};
use crate::storage::{CheckInFilter, HabitStorage};
use crate::tools::{parse_check_in_id, parse_habit_id, parse_optional_date, ToolError};

/// Largest page `checkin_list` returns
const MAX_LIST_LIMIT: u32 = 1000;

/// Parameters for logging a check-in
#[derive(Debug, Deserialize, JsonSchema)]
pub struct LogCheckInParams {
    /// ID of the habit to check in
    pub habit_id: String,
    /// Date of the check-in (YYYY-MM-DD, defaults to today)
    pub date: Option<String>,
    /// Whether the habit was done (default: true)
    pub completed: Option<bool>,
    /// Optional notes (max 500 characters)
    pub notes: Option<String>,
}

/// Parameters for listing check-ins
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListCheckInsParams {
    /// Only check-ins for this habit
    pub habit_id: Option<String>,
    /// First date to include (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// Last date to include (YYYY-MM-DD)
    pub end_date: Option<String>,
    /// Only completed (true) or missed (false) check-ins
    pub completed: Option<bool>,
    /// Maximum number of check-ins to return (default 100)
    pub limit: Option<u32>,
}

/// Parameters for deleting a check-in
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteCheckInParams {
    /// ID of the check-in to delete
    pub check_in_id: String,
}

/// Response from logging a check-in
#[derive(Debug, Serialize)]
pub struct LogCheckInResponse {
    pub check_in: CheckIn,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub message: String,
}

/// Response from listing check-ins
#[derive(Debug, Serialize)]
pub struct ListCheckInsResponse {
    pub check_ins: Vec<CheckIn>,
    pub total: usize,
}

/// Response from deleting a check-in
#[derive(Debug, Serialize)]
pub struct DeleteCheckInResponse {
    pub check_in_id: String,
    pub message: String,
}

/// Record (or overwrite) the check-in for one habit on one day
pub fn log_check_in<S: HabitStorage>(
    storage: &S,
    engine: &AnalyticsEngine,
    params: LogCheckInParams,
    today: CalendarDate,
) -> Result<LogCheckInResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let date = parse_optional_date(params.date.as_deref())?.unwrap_or(today);

    let check_in = CheckIn::new(habit_id.clone(), date, params.completed.unwrap_or(true), params.notes)?;
    let stored = storage.upsert_check_in(&check_in)?;

    let dates = storage.completed_dates_for_habit(&habit_id)?;
    let streak = engine.compute_streak(habit_id, dates.ascending().iter().copied(), today);

    let message = if stored.completed {
        format!(
            "Logged {} as completed. Current streak: {} day{}",
            stored.date,
            streak.current_streak,
            if streak.current_streak == 1 { "" } else { "s" }
        )
    } else {
        format!("Logged {} as missed", stored.date)
    };

    Ok(LogCheckInResponse {
        check_in: stored,
        current_streak: streak.current_streak,
        longest_streak: streak.longest_streak,
        message,
    })
}

/// List check-ins, newest date first
pub fn list_check_ins<S: HabitStorage>(
    storage: &S,
    params: ListCheckInsParams,
) -> Result<ListCheckInsResponse, ToolError> {
    let filter = CheckInFilter {
        habit_id: params.habit_id.as_deref().map(parse_habit_id).transpose()?,
        start: parse_optional_date(params.start_date.as_deref())?,
        end: parse_optional_date(params.end_date.as_deref())?,
        completed: params.completed,
        limit: Some(params.limit.unwrap_or(100).clamp(1, MAX_LIST_LIMIT)),
    };

    if let (Some(start), Some(end)) = (filter.start, filter.end) {
        if start > end {
            return Err(ToolError::InvalidParams(format!(
                "start_date {} is after end_date {}",
                start, end
            )));
        }
    }

    let check_ins = storage.list_check_ins(&filter)?;
    Ok(ListCheckInsResponse {
        total: check_ins.len(),
        check_ins,
    })
}

/// Delete a single check-in
pub fn delete_check_in<S: HabitStorage>(
    storage: &S,
    params: DeleteCheckInParams,
) -> Result<DeleteCheckInResponse, ToolError> {
    let check_in_id = parse_check_in_id(&params.check_in_id)?;
    let check_in = storage.get_check_in(&check_in_id)?;

    storage.delete_check_in(&check_in_id)?;
    tracing::info!("Deleted check-in {} ({})", check_in_id, check_in.date);

    Ok(DeleteCheckInResponse {
        check_in_id: check_in_id.to_string(),
        message: format!("Deleted check-in for {}", check_in.date),
    })
}
