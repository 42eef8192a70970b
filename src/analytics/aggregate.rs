/// Whole-user stats aggregation
///
/// Combines habit counts, today's check-in snapshot, trailing week/month
/// completion and one row per active habit into an `OverallStats`.
///
/// Per-habit rows only depend on that habit's own records, so they are
/// fetched and computed concurrently (up to `max_concurrent` at a time). The
/// output keeps the order of the input habit list. A row that fails is
/// logged and skipped; the rest of the aggregate is still returned.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analytics::completion::{CheckInTally, PeriodStats};
use crate::analytics::{AnalyticsError, ProviderError};
use crate::domain::{CalendarDate, CompletedDates, HabitId, HabitRef, StreakResult};

/// Read access to the records the aggregator needs
///
/// Implemented by the storage layer. Each call returns a fresh snapshot;
/// the aggregator never writes through it.
#[async_trait(?Send)]
pub trait HabitDataProvider {
    /// Normalized completed dates for one habit
    async fn completed_dates(&self, habit_id: &HabitId) -> Result<CompletedDates, ProviderError>;

    /// All-time completed check-ins for one habit
    async fn completed_count(&self, habit_id: &HabitId) -> Result<u32, ProviderError> {
        let dates = self.completed_dates(habit_id).await?;
        Ok(dates.len() as u32)
    }

    /// Check-in rows (any status) and completed rows dated within `[start, end]`
    async fn check_in_tally(
        &self,
        start: CalendarDate,
        end: CalendarDate,
    ) -> Result<CheckInTally, ProviderError>;
}

/// Summary row for one active habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitStat {
    pub habit_id: HabitId,
    pub habit_name: String,
    pub habit_color: Option<String>,
    pub habit_icon: Option<String>,
    pub total_check_ins: u32,
    /// Completed check-ins over calendar days since creation
    pub completion_rate: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// A habit whose row could not be computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedHabit {
    pub habit_id: HabitId,
    pub reason: String,
}

/// Everything shown on the stats overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub total_habits: u32,
    pub active_habits: u32,
    pub archived_habits: u32,
    pub today_completed: u32,
    pub today_total: u32,
    pub today_completion_rate: f64,
    /// Completed over recorded check-ins in `[today - 7d, today]`
    pub week_completion: f64,
    /// Completed over recorded check-ins in `[today - 1 month, today]`
    pub month_completion: f64,
    pub habit_stats: Vec<HabitStat>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_habits: Vec<SkippedHabit>,
}

/// Build the overview for `habits` as of `today`
///
/// A failed today tally aborts the whole aggregate. A failed week or month
/// tally reports that rate as 0. Per-habit failures only drop that habit's
/// row.
pub async fn aggregate_stats<P>(
    habits: &[HabitRef],
    today: CalendarDate,
    provider: &P,
    max_concurrent: usize,
) -> Result<OverallStats, AnalyticsError>
where
    P: HabitDataProvider + ?Sized,
{
    let archived_habits = habits.iter().filter(|h| h.is_archived).count() as u32;
    let total_habits = habits.len() as u32;
    let active_habits = total_habits - archived_habits;

    let (today_tally, week_tally, month_tally) = futures::join!(
        provider.check_in_tally(today, today),
        provider.check_in_tally(today.add_days(-7), today),
        provider.check_in_tally(today.sub_months(1), today),
    );
    let today_tally = today_tally.map_err(AnalyticsError::Tally)?;
    let week_completion = trailing_rate("week", week_tally);
    let month_completion = trailing_rate("month", month_tally);

    let rows: Vec<(&HabitRef, Result<HabitStat, ProviderError>)> = stream::iter(
        habits.iter().filter(|h| !h.is_archived),
    )
    .map(|habit| async move { (habit, habit_row(habit, today, provider).await) })
    .buffered(max_concurrent.max(1))
    .collect()
    .await;

    let mut habit_stats = Vec::with_capacity(rows.len());
    let mut skipped_habits = Vec::new();

    for (habit, row) in rows {
        match row {
            Ok(stat) => habit_stats.push(stat),
            Err(e) => {
                warn!("Skipping stats row for habit '{}' ({}): {}", habit.name, habit.id.short(), e);
                skipped_habits.push(SkippedHabit {
                    habit_id: habit.id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    debug!(
        "Aggregated stats for {} habits ({} rows, {} skipped)",
        total_habits,
        habit_stats.len(),
        skipped_habits.len()
    );

    Ok(OverallStats {
        total_habits,
        active_habits,
        archived_habits,
        today_completed: today_tally.completed,
        today_total: today_tally.total,
        today_completion_rate: today_tally.rate(),
        week_completion,
        month_completion,
        habit_stats,
        skipped_habits,
    })
}

fn trailing_rate(window: &str, tally: Result<CheckInTally, ProviderError>) -> f64 {
    match tally {
        Ok(tally) => tally.rate(),
        Err(e) => {
            warn!("Failed to fetch {} check-in tally, reporting 0: {}", window, e);
            0.0
        }
    }
}

/// Compute a single habit's summary row
///
/// The completion rate here uses calendar days since creation as the
/// denominator, unlike the week/month rates which use recorded rows.
pub async fn habit_row<P>(
    habit: &HabitRef,
    today: CalendarDate,
    provider: &P,
) -> Result<HabitStat, ProviderError>
where
    P: HabitDataProvider + ?Sized,
{
    let dates = provider.completed_dates(&habit.id).await?;
    let total_check_ins = provider.completed_count(&habit.id).await?;

    let streak = StreakResult::calculate(habit.id.clone(), &dates, today);
    let since_creation = PeriodStats::over_days(total_check_ins, habit.created_date, today);

    Ok(HabitStat {
        habit_id: habit.id.clone(),
        habit_name: habit.name.clone(),
        habit_color: habit.color.clone(),
        habit_icon: habit.icon.clone(),
        total_check_ins,
        completion_rate: since_creation.rate,
        current_streak: streak.current_streak,
        longest_streak: streak.longest_streak,
    })
}
