/// Normalized sets of completed dates
///
/// Streak scans assume strictly ascending, duplicate-free input. Storage
/// already promises one record per (habit, date), but normalizing here keeps
/// the calculators correct for any caller.

use serde::Serialize;

use crate::domain::{CalendarDate, CheckIn};

/// Deduplicated completed dates for a single habit, sorted ascending
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CompletedDates {
    dates: Vec<CalendarDate>,
}

impl CompletedDates {
    /// Normalize an arbitrary collection of dates
    pub fn from_dates<I>(dates: I) -> Self
    where
        I: IntoIterator<Item = CalendarDate>,
    {
        let mut dates: Vec<CalendarDate> = dates.into_iter().collect();
        dates.sort_unstable();
        dates.dedup();
        Self { dates }
    }

    /// Normalize the completed records of a check-in snapshot
    pub fn from_check_ins(records: &[CheckIn]) -> Self {
        Self::from_dates(crate::domain::completed_dates(records))
    }

    /// Oldest first
    pub fn ascending(&self) -> &[CalendarDate] {
        &self.dates
    }

    /// Newest first, for backward scans
    pub fn descending(&self) -> impl Iterator<Item = CalendarDate> + '_ {
        self.dates.iter().rev().copied()
    }

    pub fn most_recent(&self) -> Option<CalendarDate> {
        self.dates.last().copied()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn contains(&self, date: CalendarDate) -> bool {
        self.dates.binary_search(&date).is_ok()
    }

    /// Number of completed dates within `[start, end]`
    pub fn count_in_range(&self, start: CalendarDate, end: CalendarDate) -> usize {
        if start > end {
            return 0;
        }
        let lo = self.dates.partition_point(|d| *d < start);
        let hi = self.dates.partition_point(|d| *d <= end);
        hi - lo
    }
}

impl FromIterator<CalendarDate> for CompletedDates {
    fn from_iter<I: IntoIterator<Item = CalendarDate>>(iter: I) -> Self {
        Self::from_dates(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HabitId;

    fn d(s: &str) -> CalendarDate {
        CalendarDate::parse(s).unwrap()
    }

    #[test]
    fn test_empty_input() {
        let set = CompletedDates::from_dates(Vec::new());
        assert!(set.is_empty());
        assert_eq!(set.descending().count(), 0);
        assert_eq!(set.most_recent(), None);
    }

    #[test]
    fn test_sorts_and_dedups() {
        let set: CompletedDates = [d("2024-03-03"), d("2024-03-01"), d("2024-03-02"), d("2024-03-02")]
            .into_iter()
            .collect();

        assert_eq!(set.ascending(), &[d("2024-03-01"), d("2024-03-02"), d("2024-03-03")]);
        let desc: Vec<_> = set.descending().collect();
        assert_eq!(desc, vec![d("2024-03-03"), d("2024-03-02"), d("2024-03-01")]);
        assert_eq!(set.most_recent(), Some(d("2024-03-03")));
    }

    #[test]
    fn test_from_check_ins_ignores_incomplete() {
        let habit_id = HabitId::new();
        let records = vec![
            CheckIn::new(habit_id.clone(), d("2024-01-05"), false, None).unwrap(),
            CheckIn::new(habit_id.clone(), d("2024-01-04"), true, None).unwrap(),
            CheckIn::new(habit_id, d("2024-01-04"), true, None).unwrap(),
        ];

        let set = CompletedDates::from_check_ins(&records);
        assert_eq!(set.ascending(), &[d("2024-01-04")]);
        assert!(set.contains(d("2024-01-04")));
        assert!(!set.contains(d("2024-01-05")));
    }

    #[test]
    fn test_count_in_range_is_inclusive() {
        let set = CompletedDates::from_dates([d("2024-01-01"), d("2024-01-03"), d("2024-01-07")]);
        assert_eq!(set.count_in_range(d("2024-01-01"), d("2024-01-07")), 3);
        assert_eq!(set.count_in_range(d("2024-01-02"), d("2024-01-06")), 1);
        assert_eq!(set.count_in_range(d("2024-01-08"), d("2024-01-01")), 0);
    }
}
