/// Tools for updating and deleting existing habits
///
/// This module implements the habit_update and habit_delete MCP tools.
/// Archiving is an update: archived habits keep their history but drop out
/// of per-habit stats.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::Habit;
use crate::storage::HabitStorage;
use crate::tools::{parse_habit_id, ToolError};

/// Parameters for updating an existing habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateHabitParams {
    /// ID of the habit to update
    pub habit_id: String,
    /// New name
    pub name: Option<String>,
    /// New description; an empty string clears it
    pub description: Option<String>,
    /// New category; an empty string clears it
    pub category: Option<String>,
    /// Archive (true) or unarchive (false) the habit
    pub is_archived: Option<bool>,
}

/// Parameters for deleting a habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteHabitParams {
    /// ID of the habit to delete, together with all its check-ins
    pub habit_id: String,
}

/// Response from updating a habit
#[derive(Debug, Serialize)]
pub struct UpdateHabitResponse {
    pub habit: Habit,
    pub message: String,
}

/// Response from deleting a habit
#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub habit_id: String,
    pub message: String,
}

fn clearable(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| if v.trim().is_empty() { None } else { Some(v) })
}

/// Update an existing habit using the provided storage
pub fn update_habit<S: HabitStorage>(
    storage: &S,
    params: UpdateHabitParams,
) -> Result<UpdateHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let mut habit = storage.get_habit(&habit_id)?;

    if params.name.is_none()
        && params.description.is_none()
        && params.category.is_none()
        && params.is_archived.is_none()
    {
        return Err(ToolError::InvalidParams("No changes requested".to_string()));
    }

    habit.update(
        params.name,
        clearable(params.description),
        clearable(params.category),
        params.is_archived,
    )?;
    storage.update_habit(&habit)?;

    let message = match params.is_archived {
        Some(true) => format!("Archived habit '{}'", habit.name),
        Some(false) => format!("Restored habit '{}'", habit.name),
        None => format!("Updated habit '{}'", habit.name),
    };
    tracing::info!("{} ({})", message, habit.id);

    Ok(UpdateHabitResponse { habit, message })
}

/// Delete a habit and its check-ins
pub fn delete_habit<S: HabitStorage>(
    storage: &S,
    params: DeleteHabitParams,
) -> Result<DeleteHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let habit = storage.get_habit(&habit_id)?;

    storage.delete_habit(&habit_id)?;
    tracing::info!("Deleted habit '{}' ({})", habit.name, habit.id);

    Ok(DeleteHabitResponse {
        habit_id: habit_id.to_string(),
        message: format!("Deleted habit '{}' and its check-ins", habit.name),
    })
}
