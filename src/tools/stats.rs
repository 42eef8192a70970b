/// Tools exposing the analytics engine
///
/// This module implements the stats_overview, stats_habit and
/// stats_calendar MCP tools.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::analytics::{
    AnalyticsEngine, CalendarYearHeatmap, HabitDataProvider, HabitStatDetail, OverallStats, StatsPeriod,
};
use crate::domain::{CalendarDate, HabitRef};
use crate::storage::{CheckInFilter, HabitStorage};
use crate::tools::{parse_habit_id, ToolError};

/// Parameters for the stats overview
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct OverviewParams {}

/// Parameters for one habit's period stats
#[derive(Debug, Deserialize, JsonSchema)]
pub struct HabitStatsParams {
    /// ID of the habit
    pub habit_id: String,
    /// Window: 'week', 'month' (default), 'year'; anything else means since creation
    pub period: Option<String>,
}

/// Parameters for the calendar heatmap
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct CalendarParams {
    /// Calendar year (defaults to the current year)
    pub year: Option<i32>,
    /// Only count this habit's completions
    pub habit_id: Option<String>,
}

/// Overview across every habit
pub async fn stats_overview<S>(
    storage: &S,
    engine: &AnalyticsEngine,
    _params: OverviewParams,
    today: CalendarDate,
) -> Result<OverallStats, ToolError>
where
    S: HabitStorage + HabitDataProvider,
{
    let habits: Vec<HabitRef> = storage.list_habits(true)?.iter().map(|h| h.to_ref()).collect();
    Ok(engine.aggregate_stats(&habits, today, storage).await?)
}

/// Streaks and windowed completion for one habit
pub fn stats_habit<S: HabitStorage>(
    storage: &S,
    engine: &AnalyticsEngine,
    params: HabitStatsParams,
    today: CalendarDate,
) -> Result<HabitStatDetail, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let habit = storage.get_habit(&habit_id)?;

    let period = params
        .period
        .as_deref()
        .map(StatsPeriod::parse)
        .unwrap_or_default();

    let records = storage.list_check_ins(&CheckInFilter::for_habit(habit_id))?;
    Ok(engine.habit_detail(&habit.to_ref(), period, today, &records))
}

/// One-year heatmap of completed check-ins
pub fn stats_calendar<S: HabitStorage>(
    storage: &S,
    engine: &AnalyticsEngine,
    params: CalendarParams,
    today: CalendarDate,
) -> Result<CalendarYearHeatmap, ToolError> {
    let year = params.year.unwrap_or_else(|| today.year());
    let start = CalendarDate::first_of_year(year)?;
    let end = CalendarDate::last_of_year(year)?;

    let habit_id = params.habit_id.as_deref().map(parse_habit_id).transpose()?;
    if let Some(id) = &habit_id {
        storage.get_habit(id)?;
    }

    let counts = storage.completion_counts(start, end, habit_id.as_ref())?;
    Ok(engine.build_heatmap(year, &counts)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CheckIn, Habit};
    use crate::storage::SqliteStorage;

    fn d(s: &str) -> CalendarDate {
        CalendarDate::parse(s).unwrap()
    }

    fn seeded() -> (SqliteStorage, Habit, Habit) {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let run = Habit::new("Run".to_string(), None, None, None, None, d("2024-06-01")).unwrap();
        let read = Habit::new("Read".to_string(), None, None, None, None, d("2024-06-01")).unwrap();
        storage.create_habit(&run).unwrap();
        storage.create_habit(&read).unwrap();

        for (habit, date, completed) in [
            (&run, "2024-06-08", true),
            (&run, "2024-06-09", true),
            (&run, "2024-06-10", true),
            (&read, "2024-06-09", true),
            (&read, "2024-06-10", false),
        ] {
            storage
                .upsert_check_in(&CheckIn::new(habit.id.clone(), d(date), completed, None).unwrap())
                .unwrap();
        }
        (storage, run, read)
    }

    #[tokio::test]
    async fn test_overview() {
        let (storage, run, read) = seeded();
        let stats = stats_overview(&storage, &AnalyticsEngine::new(), OverviewParams::default(), d("2024-06-10"))
            .await
            .unwrap();

        assert_eq!(stats.total_habits, 2);
        assert_eq!(stats.today_total, 2);
        assert_eq!(stats.today_completed, 1);
        assert_eq!(stats.today_completion_rate, 50.0);
        assert_eq!(stats.week_completion, 80.0);

        let run_row = stats.habit_stats.iter().find(|s| s.habit_id == run.id).unwrap();
        assert_eq!(run_row.current_streak, 3);
        assert_eq!(run_row.total_check_ins, 3);

        let read_row = stats.habit_stats.iter().find(|s| s.habit_id == read.id).unwrap();
        assert_eq!(read_row.current_streak, 1);
    }

    #[test]
    fn test_habit_stats_defaults_to_month() {
        let (storage, run, _) = seeded();
        let params = HabitStatsParams {
            habit_id: run.id.to_string(),
            period: None,
        };
        let detail = stats_habit(&storage, &AnalyticsEngine::new(), params, d("2024-06-10")).unwrap();

        assert_eq!(detail.period, StatsPeriod::Month);
        assert_eq!(detail.start_date, d("2024-05-10"));
        assert_eq!(detail.total_check_ins, 3);
        assert_eq!(detail.daily_data.len(), 3);
    }

    #[test]
    fn test_calendar_for_one_habit() {
        let (storage, _, read) = seeded();
        let params = CalendarParams {
            year: None,
            habit_id: Some(read.id.to_string()),
        };
        let heatmap = stats_calendar(&storage, &AnalyticsEngine::new(), params, d("2024-06-10")).unwrap();

        assert_eq!(heatmap.year, 2024);
        assert_eq!(heatmap.days.len(), 366);
        assert_eq!(heatmap.total_count(), 1);
    }

    #[test]
    fn test_calendar_all_habits_levels() {
        let (storage, _, _) = seeded();
        let params = CalendarParams {
            year: Some(2024),
            habit_id: None,
        };
        let heatmap = stats_calendar(&storage, &AnalyticsEngine::new(), params, d("2024-06-10")).unwrap();

        let june_9 = heatmap.days.iter().find(|day| day.date == d("2024-06-09")).unwrap();
        let june_8 = heatmap.days.iter().find(|day| day.date == d("2024-06-08")).unwrap();
        assert_eq!(june_9.count, 2);
        assert_eq!(june_9.level, 4);
        assert_eq!(june_8.level, 2);
    }
}
