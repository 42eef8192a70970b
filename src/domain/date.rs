/// Calendar-day values used by every analytics computation
///
/// A `CalendarDate` is a day on the caller's calendar with no time-of-day.
/// The local calendar is read exactly once per request at the server
/// boundary; everything below that works on plain dates.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::DomainError;

/// Wire and storage format for dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A totally ordered calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Build a date from year/month/day, rejecting impossible dates
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DomainError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| DomainError::MalformedDate {
                value: format!("{:04}-{:02}-{:02}", year, month, day),
            })
    }

    /// Parse a `YYYY-MM-DD` string
    ///
    /// Anything else is a `MalformedDate` error; values are never coerced.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|_| DomainError::MalformedDate { value: s.to_string() })
    }

    /// Today's date on the local calendar
    ///
    /// Only the server boundary calls this. Analytics functions take `today`
    /// as a parameter instead.
    pub fn today_local() -> Self {
        Self(Local::now().date_naive())
    }

    /// Jan 1 of the given year
    pub fn first_of_year(year: i32) -> Result<Self, DomainError> {
        NaiveDate::from_ymd_opt(year, 1, 1)
            .map(Self)
            .ok_or(DomainError::InvalidYear(year))
    }

    /// Dec 31 of the given year
    pub fn last_of_year(year: i32) -> Result<Self, DomainError> {
        NaiveDate::from_ymd_opt(year, 12, 31)
            .map(Self)
            .ok_or(DomainError::InvalidYear(year))
    }

    /// Shift by `n` whole days (negative moves backwards)
    ///
    /// Saturates at chrono's representable range.
    pub fn add_days(self, n: i64) -> Self {
        let shifted = if n >= 0 {
            self.0.checked_add_days(chrono::Days::new(n as u64))
        } else {
            self.0.checked_sub_days(chrono::Days::new(n.unsigned_abs()))
        };

        match shifted {
            Some(date) => Self(date),
            None if n >= 0 => Self(NaiveDate::MAX),
            None => Self(NaiveDate::MIN),
        }
    }

    /// The previous calendar day
    pub fn pred(self) -> Self {
        self.add_days(-1)
    }

    /// Move back `n` months, clamping to the last valid day of the target month
    pub fn sub_months(self, n: u32) -> Self {
        self.0
            .checked_sub_months(Months::new(n))
            .map(Self)
            .unwrap_or(Self(NaiveDate::MIN))
    }

    /// Signed number of days from `self` to `other`
    ///
    /// `a.days_between(a.add_days(3)) == 3`.
    pub fn days_between(self, other: CalendarDate) -> i64 {
        (other.0 - self.0).num_days()
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Access the underlying chrono date
    pub fn naive(self) -> NaiveDate {
        self.0
    }

    /// Iterate every day in `[self, end]`, ascending
    pub fn iter_through(self, end: CalendarDate) -> impl Iterator<Item = CalendarDate> {
        let mut next = (self <= end).then_some(self);
        std::iter::from_fn(move || {
            let current = next?;
            next = (current < end).then(|| current.add_days(1));
            Some(current)
        })
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for CalendarDate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
