/// Tool for listing all habits
///
/// This module implements the habit_list MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsEngine;
use crate::domain::{CalendarDate, Habit};
use crate::storage::HabitStorage;
use crate::tools::ToolError;

/// Parameters for listing habits
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListHabitsParams {
    /// Only habits with this category (case-insensitive)
    pub category: Option<String>,
    /// Include archived habits (default: false)
    pub include_archived: Option<bool>,
    /// Sort by: 'created' (newest first, default), 'name', 'streak'
    pub sort_by: Option<String>,
}

/// A habit with its streak and total completed check-ins
#[derive(Debug, Serialize)]
pub struct HabitSummary {
    #[serde(flatten)]
    pub habit: Habit,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_check_ins: u32,
}

/// Response from listing habits
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitSummary>,
    pub total: usize,
}

/// List habits using the provided storage
pub fn list_habits<S: HabitStorage>(
    storage: &S,
    engine: &AnalyticsEngine,
    params: ListHabitsParams,
    today: CalendarDate,
) -> Result<ListHabitsResponse, ToolError> {
    let include_archived = params.include_archived.unwrap_or(false);
    let category = params.category.map(|c| c.trim().to_lowercase());

    let mut habits = Vec::new();
    for habit in storage.list_habits(include_archived)? {
        if let Some(wanted) = &category {
            let matches = habit
                .category
                .as_deref()
                .map(|c| c.trim().to_lowercase() == *wanted)
                .unwrap_or(false);
            if !matches {
                continue;
            }
        }

        let dates = storage.completed_dates_for_habit(&habit.id)?;
        let total_check_ins = dates.len() as u32;
        let streak = engine.compute_streak(habit.id.clone(), dates.ascending().iter().copied(), today);

        habits.push(HabitSummary {
            habit,
            current_streak: streak.current_streak,
            longest_streak: streak.longest_streak,
            total_check_ins,
        });
    }

    match params.sort_by.as_deref().map(str::trim) {
        None | Some("") | Some("created") => {}
        Some("name") => habits.sort_by(|a, b| a.habit.name.to_lowercase().cmp(&b.habit.name.to_lowercase())),
        Some("streak") => habits.sort_by(|a, b| b.current_streak.cmp(&a.current_streak)),
        Some(other) => {
            return Err(ToolError::InvalidParams(format!(
                "Invalid sort_by '{}'. Valid options: created, name, streak",
                other
            )))
        }
    }

    Ok(ListHabitsResponse {
        total: habits.len(),
        habits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CheckIn;
    use crate::storage::SqliteStorage;

    fn d(s: &str) -> CalendarDate {
        CalendarDate::parse(s).unwrap()
    }

    fn add_habit(storage: &SqliteStorage, name: &str, category: Option<&str>) -> Habit {
        let habit = Habit::new(name.to_string(), None, category.map(String::from), None, None, d("2024-01-01")).unwrap();
        storage.create_habit(&habit).unwrap();
        habit
    }

    #[test]
    fn test_list_with_streaks() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let run = add_habit(&storage, "Run", Some("Health"));
        let read = add_habit(&storage, "Read", None);

        for date in ["2024-01-08", "2024-01-09", "2024-01-10"] {
            storage
                .upsert_check_in(&CheckIn::new(run.id.clone(), d(date), true, None).unwrap())
                .unwrap();
        }

        let params = ListHabitsParams {
            sort_by: Some("streak".to_string()),
            ..Default::default()
        };
        let response = list_habits(&storage, &AnalyticsEngine::new(), params, d("2024-01-10")).unwrap();

        assert_eq!(response.total, 2);
        assert_eq!(response.habits[0].habit.id, run.id);
        assert_eq!(response.habits[0].current_streak, 3);
        assert_eq!(response.habits[0].total_check_ins, 3);
        assert_eq!(response.habits[1].habit.id, read.id);
        assert_eq!(response.habits[1].current_streak, 0);
    }

    #[test]
    fn test_category_filter_and_bad_sort() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        add_habit(&storage, "Run", Some("Health"));
        add_habit(&storage, "Read", Some("learning"));
        let engine = AnalyticsEngine::new();

        let params = ListHabitsParams {
            category: Some("health".to_string()),
            ..Default::default()
        };
        let response = list_habits(&storage, &engine, params, d("2024-01-10")).unwrap();
        assert_eq!(response.total, 1);
        assert_eq!(response.habits[0].habit.name, "Run");

        let params = ListHabitsParams {
            sort_by: Some("color".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            list_habits(&storage, &engine, params, d("2024-01-10")),
            Err(ToolError::InvalidParams(_))
        ));
    }
}
