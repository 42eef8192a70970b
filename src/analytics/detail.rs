/// Per-habit period detail
///
/// Streaks for one habit plus its completion over a chosen window and the
/// raw day-by-day records inside that window.

use serde::{Deserialize, Serialize};

use crate::analytics::completion::PeriodStats;
use crate::domain::{CalendarDate, CheckIn, CompletedDates, HabitId, HabitRef, StreakResult};

/// Analysis window ending today
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    Week,
    #[default]
    Month,
    Year,
    /// Since the habit was created
    All,
}

impl StatsPeriod {
    /// Parse a period name; anything unrecognized means `All`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "week" => StatsPeriod::Week,
            "month" => StatsPeriod::Month,
            "year" => StatsPeriod::Year,
            _ => StatsPeriod::All,
        }
    }

    /// First day of the window
    pub fn start(self, today: CalendarDate, created: CalendarDate) -> CalendarDate {
        match self {
            StatsPeriod::Week => today.add_days(-7),
            StatsPeriod::Month => today.sub_months(1),
            StatsPeriod::Year => today.sub_months(12),
            StatsPeriod::All => created,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyData {
    pub date: CalendarDate,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitStatDetail {
    pub habit_id: HabitId,
    pub habit_name: String,
    pub period: StatsPeriod,
    pub start_date: CalendarDate,
    pub end_date: CalendarDate,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Completed check-ins inside the window
    pub total_check_ins: u32,
    /// Calendar days inside the window
    pub total_days: u32,
    pub completion_rate: f64,
    /// Records inside the window, newest first
    pub daily_data: Vec<DailyData>,
}

/// Build the detail view for one habit from its full check-in history
///
/// Streaks are computed over the whole history; everything else is limited
/// to the window.
pub fn habit_detail(
    habit: &HabitRef,
    period: StatsPeriod,
    today: CalendarDate,
    records: &[CheckIn],
) -> HabitStatDetail {
    let start = period.start(today, habit.created_date);

    let completed = CompletedDates::from_dates(
        records
            .iter()
            .filter(|c| c.habit_id == habit.id && c.completed)
            .map(|c| c.date),
    );
    let streak = StreakResult::calculate(habit.id.clone(), &completed, today);

    let mut daily_data: Vec<DailyData> = records
        .iter()
        .filter(|c| c.habit_id == habit.id && c.date >= start && c.date <= today)
        .map(|c| DailyData {
            date: c.date,
            completed: c.completed,
        })
        .collect();
    daily_data.sort_by(|a, b| b.date.cmp(&a.date));

    let total_check_ins = completed.count_in_range(start, today) as u32;
    let window = PeriodStats::over_days(total_check_ins, start, today);

    HabitStatDetail {
        habit_id: habit.id.clone(),
        habit_name: habit.name.clone(),
        period,
        start_date: start,
        end_date: today,
        current_streak: streak.current_streak,
        longest_streak: streak.longest_streak,
        total_check_ins,
        total_days: window.total_days,
        completion_rate: window.rate,
        daily_data,
    }
}
