/// Analytics engine for streaks, completion rates and heatmaps
///
/// Every entry point is a pure function of its inputs. `today` is always a
/// parameter, supplied once per request by the server, so calling any of
/// them twice with the same arguments gives the same result.

pub mod aggregate;
pub mod completion;
pub mod detail;
pub mod heatmap;

use std::collections::BTreeMap;

use thiserror::Error;

pub use aggregate::{aggregate_stats, habit_row, HabitDataProvider, HabitStat, OverallStats, SkippedHabit};
pub use completion::{completion_rate, inclusive_days, CheckInTally, PeriodStats};
pub use detail::{habit_detail, DailyData, HabitStatDetail, StatsPeriod};
pub use heatmap::{build_heatmap, intensity_level, CalendarDay, CalendarYearHeatmap};

use crate::domain::{CalendarDate, CheckIn, CompletedDates, DomainError, HabitId, HabitRef, StreakResult};
use crate::storage::StorageError;

/// Default number of per-habit rows fetched at once
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// Failure fetching one habit's data
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Fetch cancelled for habit {habit_id}")]
    Cancelled { habit_id: String },

    #[error("No data available for habit {habit_id}")]
    MissingData { habit_id: String },
}

/// Failure of a whole analytics request
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Failed to fetch check-in tally: {0}")]
    Tally(#[source] ProviderError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

/// Tunables for the analytics engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// Per-habit rows computed concurrently during aggregation (at least 1)
    pub max_concurrent_fetches: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

/// Entry points consumed by the presentation layer
///
/// The engine holds configuration only; no state survives between calls.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    config: AnalyticsConfig,
}

impl AnalyticsEngine {
    /// Create an analytics engine with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Current and longest streak from a habit's completed dates
    ///
    /// Dates may arrive unsorted or duplicated.
    pub fn compute_streak<I>(&self, habit_id: HabitId, completed_dates: I, today: CalendarDate) -> StreakResult
    where
        I: IntoIterator<Item = CalendarDate>,
    {
        let dates = CompletedDates::from_dates(completed_dates);
        StreakResult::calculate(habit_id, &dates, today)
    }

    /// `completed / attempted` as a percentage, 0 when `attempted` is 0
    pub fn compute_completion_rate(&self, completed: u32, attempted: u32) -> f64 {
        completion_rate(completed, attempted)
    }

    /// One-year calendar heatmap from per-date completion counts
    pub fn build_heatmap(
        &self,
        year: i32,
        counts_by_date: &BTreeMap<CalendarDate, u32>,
    ) -> Result<CalendarYearHeatmap, AnalyticsError> {
        Ok(build_heatmap(year, counts_by_date)?)
    }

    /// Overview across all of a user's habits
    pub async fn aggregate_stats<P>(
        &self,
        habits: &[HabitRef],
        today: CalendarDate,
        provider: &P,
    ) -> Result<OverallStats, AnalyticsError>
    where
        P: HabitDataProvider + ?Sized,
    {
        aggregate_stats(habits, today, provider, self.config.max_concurrent_fetches).await
    }

    /// Streaks and windowed completion for a single habit
    pub fn habit_detail(
        &self,
        habit: &HabitRef,
        period: StatsPeriod,
        today: CalendarDate,
        records: &[CheckIn],
    ) -> HabitStatDetail {
        habit_detail(habit, period, today, records)
    }
}
