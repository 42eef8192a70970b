/// Calendar heatmap construction
///
/// Expands a year into one entry per day with the day's completion count and
/// a 0-4 intensity level relative to the busiest day of that year.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{CalendarDate, DomainError};

/// Highest intensity level
pub const MAX_LEVEL: u8 = 4;

/// One day of the heatmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: CalendarDate,
    pub count: u32,
    /// 0 means no activity; any activity is at least 1
    pub level: u8,
}

/// Every day of a year, Jan 1 through Dec 31, with no gaps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarYearHeatmap {
    pub year: i32,
    pub days: Vec<CalendarDay>,
}

impl CalendarYearHeatmap {
    /// Days with any completion
    pub fn active_days(&self) -> usize {
        self.days.iter().filter(|d| d.count > 0).count()
    }

    pub fn total_count(&self) -> u64 {
        self.days.iter().map(|d| d.count as u64).sum()
    }
}

/// Build the heatmap for `year` from per-date completion counts
///
/// Counts outside the year are ignored, including for the maximum.
pub fn build_heatmap(
    year: i32,
    counts_by_date: &BTreeMap<CalendarDate, u32>,
) -> Result<CalendarYearHeatmap, DomainError> {
    let start = CalendarDate::first_of_year(year)?;
    let end = CalendarDate::last_of_year(year)?;

    let max_count = counts_by_date
        .range(start..=end)
        .map(|(_, count)| *count)
        .max()
        .unwrap_or(0);

    let days = start
        .iter_through(end)
        .map(|date| {
            let count = counts_by_date.get(&date).copied().unwrap_or(0);
            CalendarDay {
                date,
                count,
                level: intensity_level(count, max_count),
            }
        })
        .collect();

    Ok(CalendarYearHeatmap { year, days })
}

/// Bucket `count` into 0-4 relative to `max_count`
///
/// `floor(count / max * 4)`, raised to 1 for any non-zero count so activity
/// is always visible.
pub fn intensity_level(count: u32, max_count: u32) -> u8 {
    if count == 0 || max_count == 0 {
        return 0;
    }

    let scaled = (count as u64 * MAX_LEVEL as u64) / max_count as u64;
    (scaled.min(MAX_LEVEL as u64) as u8).max(1)
}
