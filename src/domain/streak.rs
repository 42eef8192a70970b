/// Streak calculation
///
/// A streak is a maximal run of consecutive calendar days with a completed
/// check-in. Two numbers are derived from a habit's normalized completion
/// dates:
///
/// - the **longest** streak anywhere in its history, and
/// - the **current** streak, which ends today, or yesterday if today has no
///   check-in yet (the grace period).
///
/// The current streak is computed in two steps. `streak_anchor` decides which
/// day the streak must end on (policy); `count_run_back` counts the contiguous
/// run ending there (mechanics). Changing the grace period only touches the
/// first step.

use serde::{Deserialize, Serialize};

use crate::domain::{CalendarDate, CompletedDates, HabitId};

/// Calculated streak information for a habit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakResult {
    /// Which habit this streak data is for
    pub habit_id: HabitId,
    /// Consecutive days completed up to today (or yesterday)
    pub current_streak: u32,
    /// Best streak ever achieved for this habit
    pub longest_streak: u32,
}

impl StreakResult {
    /// An empty streak record for a habit with no completions
    pub fn empty(habit_id: HabitId) -> Self {
        Self {
            habit_id,
            current_streak: 0,
            longest_streak: 0,
        }
    }

    /// Compute both streaks from a habit's completed dates
    ///
    /// `today` comes from the caller; the calculation never reads a clock, so
    /// identical inputs always give identical results.
    pub fn calculate(habit_id: HabitId, dates: &CompletedDates, today: CalendarDate) -> Self {
        if dates.is_empty() {
            return Self::empty(habit_id);
        }

        let current_streak = current_streak(dates, today);
        let longest_streak = longest_streak(dates);

        Self {
            habit_id,
            current_streak,
            // The current run is itself a run, so this only guards against
            // callers passing a `today` earlier than recorded dates.
            longest_streak: longest_streak.max(current_streak),
        }
    }
}

/// Longest run of consecutive days in an ascending, deduplicated date set
pub fn longest_streak(dates: &CompletedDates) -> u32 {
    let ascending = dates.ascending();
    if ascending.is_empty() {
        return 0;
    }

    let mut longest = 1u32;
    let mut run = 1u32;

    for pair in ascending.windows(2) {
        if pair[0].days_between(pair[1]) == 1 {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }

    longest
}

/// Current streak ending today, or yesterday if today is not checked in
pub fn current_streak(dates: &CompletedDates, today: CalendarDate) -> u32 {
    let Some(most_recent) = dates.most_recent() else {
        return 0;
    };

    match streak_anchor(most_recent, today) {
        Some(anchor) => count_run_back(anchor, dates.descending()),
        None => 0,
    }
}

/// Which day the current streak must end on, if it is still alive
///
/// A habit completed today anchors on today. One completed yesterday but not
/// yet today anchors on yesterday. Anything older means the streak is broken.
pub fn streak_anchor(most_recent: CalendarDate, today: CalendarDate) -> Option<CalendarDate> {
    let yesterday = today.pred();

    if most_recent == today {
        Some(today)
    } else if most_recent == yesterday {
        Some(yesterday)
    } else {
        None
    }
}

/// Count the contiguous run of `descending` dates ending at `anchor`
pub fn count_run_back<I>(anchor: CalendarDate, descending: I) -> u32
where
    I: IntoIterator<Item = CalendarDate>,
{
    let mut expected = anchor;
    let mut count = 0u32;

    for date in descending {
        if date != expected {
            break;
        }
        count += 1;
        expected = expected.pred();
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> CalendarDate {
        CalendarDate::parse(s).unwrap()
    }

    fn set(dates: &[&str]) -> CompletedDates {
        dates.iter().map(|s| d(s)).collect()
    }

    #[test]
    fn test_empty_dates() {
        let habit_id = HabitId::new();
        let result = StreakResult::calculate(habit_id.clone(), &set(&[]), d("2024-01-04"));

        assert_eq!(result, StreakResult::empty(habit_id));
        assert_eq!(longest_streak(&set(&[])), 0);
        assert_eq!(current_streak(&set(&[]), d("2024-01-04")), 0);
    }

    #[test]
    fn test_single_date() {
        let dates = set(&["2024-01-04"]);
        assert_eq!(longest_streak(&dates), 1);
        assert_eq!(current_streak(&dates, d("2024-01-04")), 1);
        assert_eq!(current_streak(&dates, d("2024-01-05")), 1);
        assert_eq!(current_streak(&dates, d("2024-01-06")), 0);
    }

    #[test]
    fn test_consecutive_days_ending_today() {
        let today = d("2024-02-02");
        let dates: CompletedDates = (0..10).map(|i| today.add_days(-i)).collect();

        let result = StreakResult::calculate(HabitId::new(), &dates, today);
        assert_eq!(result.current_streak, 10);
        assert_eq!(result.longest_streak, 10);
    }

    #[test]
    fn test_grace_period_anchors_on_yesterday() {
        let dates = set(&["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(current_streak(&dates, d("2024-01-04")), 3);
    }

    #[test]
    fn test_broken_streak() {
        let dates = set(&["2024-01-01", "2024-01-02"]);
        assert_eq!(current_streak(&dates, d("2024-01-05")), 0);
        assert_eq!(longest_streak(&dates), 2);
    }

    #[test]
    fn test_current_stops_at_first_gap() {
        let dates = set(&["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-05", "2024-01-06"]);
        let result = StreakResult::calculate(HabitId::new(), &dates, d("2024-01-06"));
        assert_eq!(result.current_streak, 2);
        assert_eq!(result.longest_streak, 3);
    }

    #[test]
    fn test_longest_ignores_order_and_duplicates() {
        let dates = set(&["2024-03-01", "2024-03-03", "2024-03-02", "2024-03-02"]);
        assert_eq!(longest_streak(&dates), 3);
    }

    #[test]
    fn test_longest_across_month_and_leap_day() {
        let dates = set(&["2024-02-28", "2024-02-29", "2024-03-01", "2024-03-10"]);
        assert_eq!(longest_streak(&dates), 3);
    }

    #[test]
    fn test_future_dates_do_not_anchor() {
        let dates = set(&["2024-01-03", "2024-01-04", "2024-01-10"]);
        assert_eq!(current_streak(&dates, d("2024-01-04")), 0);
    }

    #[test]
    fn test_anchor_policy() {
        let today = d("2024-01-04");
        assert_eq!(streak_anchor(today, today), Some(today));
        assert_eq!(streak_anchor(d("2024-01-03"), today), Some(d("2024-01-03")));
        assert_eq!(streak_anchor(d("2024-01-02"), today), None);
    }

    #[test]
    fn test_count_run_back() {
        let desc = vec![d("2024-01-04"), d("2024-01-03"), d("2024-01-01")];
        assert_eq!(count_run_back(d("2024-01-04"), desc.clone()), 2);
        assert_eq!(count_run_back(d("2024-01-05"), desc), 0);
    }

    #[test]
    fn test_calculation_is_repeatable() {
        let dates = set(&["2024-01-01", "2024-01-02", "2024-01-03"]);
        let id = HabitId::new();
        let first = StreakResult::calculate(id.clone(), &dates, d("2024-01-03"));
        let second = StreakResult::calculate(id, &dates, d("2024-01-03"));
        assert_eq!(first, second);
    }
}
