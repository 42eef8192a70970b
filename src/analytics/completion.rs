/// Completion-rate arithmetic
///
/// The calculator doesn't care what the denominator means. Callers pick it:
/// calendar days in a window for per-habit rates, or check-in rows recorded
/// for the whole-user week/month rates.

use serde::{Deserialize, Serialize};

use crate::domain::CalendarDate;

/// Completion over an inclusive date interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    pub total_days: u32,
    pub completed_days: u32,
    /// Percentage in `[0, 100]`
    pub rate: f64,
}

impl PeriodStats {
    pub fn new(completed_days: u32, total_days: u32) -> Self {
        Self {
            total_days,
            completed_days,
            rate: completion_rate(completed_days, total_days),
        }
    }

    /// Completion of `completed` days against every calendar day in `[start, end]`
    pub fn over_days(completed: u32, start: CalendarDate, end: CalendarDate) -> Self {
        Self::new(completed, inclusive_days(start, end))
    }
}

/// `completed / attempted * 100`, or 0 when nothing was attempted
///
/// Capped at 100: backdated check-ins can outnumber the days since a habit
/// was created.
pub fn completion_rate(completed: u32, attempted: u32) -> f64 {
    if attempted == 0 {
        return 0.0;
    }
    (completed as f64 / attempted as f64 * 100.0).min(100.0)
}

/// Number of calendar days in `[start, end]`, 0 when the range is inverted
pub fn inclusive_days(start: CalendarDate, end: CalendarDate) -> u32 {
    let span = start.days_between(end);
    if span < 0 {
        0
    } else {
        u32::try_from(span + 1).unwrap_or(u32::MAX)
    }
}

/// Check-in rows recorded in a window, and how many were completed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInTally {
    pub total: u32,
    pub completed: u32,
}

impl CheckInTally {
    /// Completion relative to rows recorded
    pub fn rate(&self) -> f64 {
        completion_rate(self.completed, self.total)
    }
}
