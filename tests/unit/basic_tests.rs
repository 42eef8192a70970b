/// Unit tests for the analytics engine through the public API
use std::collections::BTreeMap;

use habit_analytics_mcp::analytics::{completion_rate, inclusive_days, StatsPeriod};
use habit_analytics_mcp::*;
use tempfile::NamedTempFile;

fn d(s: &str) -> CalendarDate {
    CalendarDate::parse(s).unwrap()
}

fn dates(values: &[&str]) -> Vec<CalendarDate> {
    values.iter().map(|v| d(v)).collect()
}

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    #[test]
    fn test_habit_creation() {
        let habit = Habit::new(
            "Test Habit".to_string(),
            Some("A test habit".to_string()),
            Some("health".to_string()),
            None,
            None,
            d("2024-01-01"),
        )
        .unwrap();

        assert_eq!(habit.name, "Test Habit");
        assert!(!habit.is_archived);
        assert_eq!(habit.to_ref().created_date, d("2024-01-01"));
    }

    #[test]
    fn test_check_in_creation() {
        let habit_id = HabitId::new();
        let check_in = CheckIn::new(habit_id.clone(), d("2024-01-02"), true, Some("Great work!".to_string())).unwrap();

        assert_eq!(check_in.habit_id, habit_id);
        assert!(check_in.has_notes());
    }

    #[test]
    fn test_empty_dates_have_no_streak() {
        let engine = AnalyticsEngine::new();
        let result = engine.compute_streak(HabitId::new(), Vec::new(), d("2024-01-10"));
        assert_eq!(result.current_streak, 0);
        assert_eq!(result.longest_streak, 0);
    }

    #[test]
    fn test_streak_through_today() {
        let engine = AnalyticsEngine::new();
        let result = engine.compute_streak(
            HabitId::new(),
            dates(&["2024-01-08", "2024-01-09", "2024-01-10"]),
            d("2024-01-10"),
        );
        assert_eq!(result.current_streak, 3);
        assert_eq!(result.longest_streak, 3);
    }

    #[test]
    fn test_streak_survives_until_end_of_today() {
        let engine = AnalyticsEngine::new();
        let result = engine.compute_streak(HabitId::new(), dates(&["2024-01-08", "2024-01-09"]), d("2024-01-10"));
        assert_eq!(result.current_streak, 2);
    }

    #[test]
    fn test_streak_broken_after_a_missed_day() {
        let engine = AnalyticsEngine::new();
        let result = engine.compute_streak(HabitId::new(), dates(&["2024-01-07", "2024-01-08"]), d("2024-01-10"));
        assert_eq!(result.current_streak, 0);
        assert_eq!(result.longest_streak, 2);
    }

    #[test]
    fn test_streak_invariants_hold() {
        let engine = AnalyticsEngine::new();
        let samples = [
            dates(&["2024-02-28", "2024-02-29", "2024-03-01"]),
            dates(&["2023-12-31", "2024-01-01", "2024-01-05"]),
            dates(&["2024-01-05", "2024-01-05", "2024-01-03"]),
        ];

        for sample in samples {
            let distinct = CompletedDates::from_dates(sample.clone()).len() as u32;
            let result = engine.compute_streak(HabitId::new(), sample, d("2024-03-01"));
            assert!(result.longest_streak >= result.current_streak);
            assert!(result.longest_streak <= distinct);
        }
    }

    #[test]
    fn test_leap_day_and_year_boundaries_are_consecutive() {
        let engine = AnalyticsEngine::new();
        let leap = engine.compute_streak(
            HabitId::new(),
            dates(&["2024-02-28", "2024-02-29", "2024-03-01"]),
            d("2024-03-01"),
        );
        assert_eq!(leap.current_streak, 3);

        let new_year = engine.compute_streak(HabitId::new(), dates(&["2023-12-31", "2024-01-01"]), d("2024-01-01"));
        assert_eq!(new_year.longest_streak, 2);
    }

    #[test]
    fn test_completion_rates() {
        assert_eq!(completion_rate(0, 0), 0.0);
        assert_eq!(completion_rate(3, 4), 75.0);
        assert_eq!(completion_rate(9, 4), 100.0);
        assert_eq!(inclusive_days(d("2024-01-01"), d("2024-01-31")), 31);
        assert_eq!(inclusive_days(d("2024-02-01"), d("2024-01-31")), 0);
    }

    #[test]
    fn test_heatmap_covers_the_year() {
        let engine = AnalyticsEngine::new();
        let mut counts = BTreeMap::new();
        counts.insert(d("2023-03-01"), 3);
        counts.insert(d("2023-03-02"), 1);
        counts.insert(d("2022-12-31"), 50);

        let heatmap = engine.build_heatmap(2023, &counts).unwrap();
        assert_eq!(heatmap.days.len(), 365);
        assert_eq!(heatmap.days[0].date, d("2023-01-01"));

        let peak = heatmap.days.iter().find(|day| day.date == d("2023-03-01")).unwrap();
        let low = heatmap.days.iter().find(|day| day.date == d("2023-03-02")).unwrap();
        assert_eq!(peak.level, 4);
        assert_eq!(low.level, 1);
        assert!(heatmap.days.iter().all(|day| day.level <= 4));
        assert!(heatmap.days.iter().all(|day| (day.count == 0) == (day.level == 0)));
    }

    #[test]
    fn test_period_detail_window() {
        let engine = AnalyticsEngine::new();
        let habit = Habit::new("Walk".to_string(), None, None, None, None, d("2024-01-01")).unwrap();
        let records = vec![CheckIn::new(habit.id.clone(), d("2024-01-10"), true, None).unwrap()];

        let detail = engine.habit_detail(&habit.to_ref(), StatsPeriod::Week, d("2024-01-10"), &records);
        assert_eq!(detail.total_days, 8);
        assert_eq!(detail.total_check_ins, 1);
        assert_eq!(detail.completion_rate, 12.5);
    }

    #[tokio::test]
    async fn test_server_creation() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let mut config = ServerConfig::new(temp_file.path().to_path_buf());
        config.today = Some(d("2024-01-10"));

        let server = HabitAnalyticsServer::new(config).await.unwrap();
        assert_eq!(server.today(), d("2024-01-10"));
        assert_eq!(server.analytics().config().max_concurrent_fetches, DEFAULT_MAX_CONCURRENT_FETCHES);
    }

    #[test]
    fn test_storage_creation() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path().to_path_buf());
        assert!(storage.is_ok());
    }
}
