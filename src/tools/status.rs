/// Tool for checking a habit's streaks
///
/// This module implements the habit_streak MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsEngine;
use crate::domain::{CalendarDate, StreakResult};
use crate::storage::HabitStorage;
use crate::tools::{parse_habit_id, ToolError};

/// Parameters for checking a habit's streak
#[derive(Debug, Deserialize, JsonSchema)]
pub struct StreakParams {
    /// ID of the habit
    pub habit_id: String,
}

/// Streak status for one habit
#[derive(Debug, Serialize)]
pub struct StreakResponse {
    pub habit_name: String,
    #[serde(flatten)]
    pub streak: StreakResult,
    /// Most recent completed day, if any
    pub last_completed: Option<CalendarDate>,
    /// True when the streak survives but today is not checked in yet
    pub at_risk: bool,
}

/// Current and longest streak for one habit as of `today`
pub fn habit_streak<S: HabitStorage>(
    storage: &S,
    engine: &AnalyticsEngine,
    params: StreakParams,
    today: CalendarDate,
) -> Result<StreakResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let habit = storage.get_habit(&habit_id)?;

    let dates = storage.completed_dates_for_habit(&habit_id)?;
    let last_completed = dates.most_recent();
    let streak = engine.compute_streak(habit_id, dates.ascending().iter().copied(), today);

    Ok(StreakResponse {
        habit_name: habit.name,
        at_risk: streak.current_streak > 0 && last_completed != Some(today),
        streak,
        last_completed,
    })
}
