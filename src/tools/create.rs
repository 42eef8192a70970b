/// Tool for creating new habits
///
/// This module implements the habit_create MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{CalendarDate, Habit};
use crate::storage::HabitStorage;
use crate::tools::ToolError;

/// Parameters for creating a new habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHabitParams {
    /// Name of the habit (1-100 characters)
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Optional grouping label (e.g. "health")
    pub category: Option<String>,
    /// Optional display color
    pub color: Option<String>,
    /// Optional display icon
    pub icon: Option<String>,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub habit: Habit,
    pub message: String,
}

/// Create a new habit; its completion window starts on `today`
pub fn create_habit<S: HabitStorage>(
    storage: &S,
    params: CreateHabitParams,
    today: CalendarDate,
) -> Result<CreateHabitResponse, ToolError> {
    let habit = Habit::new(
        params.name,
        params.description,
        params.category,
        params.color,
        params.icon,
        today,
    )?;

    storage.create_habit(&habit)?;
    tracing::info!("Created habit '{}' ({})", habit.name, habit.id);

    Ok(CreateHabitResponse {
        message: format!("Created habit '{}'", habit.name),
        habit,
    })
}
