/// Storage layer for persisting habits and check-ins
///
/// This module handles all database operations using SQLite. It provides
/// the records the analytics engine reads; the engine itself never writes.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::analytics::CheckInTally;
use crate::domain::{CalendarDate, CheckIn, CheckInId, CompletedDates, DomainError, Habit, HabitId};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(rusqlite::Error),

    #[error("Stored value is invalid: {0}")]
    Domain(#[from] DomainError),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Check-in not found: {check_in_id}")]
    CheckInNotFound { check_in_id: String },

    #[error("Migration error: {0}")]
    Migration(String),
}

impl From<rusqlite::Error> for StorageError {
    /// Column values that fail domain parsing (e.g. a malformed stored date)
    /// surface as `Domain` errors rather than generic query failures.
    fn from(e: rusqlite::Error) -> Self {
        if let rusqlite::Error::FromSqlConversionFailure(_, _, ref inner) = e {
            if let Some(domain) = inner.downcast_ref::<DomainError>() {
                return StorageError::Domain(domain.clone());
            }
        }
        StorageError::Query(e)
    }
}

/// Optional filters for listing check-ins
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckInFilter {
    pub habit_id: Option<HabitId>,
    pub start: Option<CalendarDate>,
    pub end: Option<CalendarDate>,
    pub completed: Option<bool>,
    pub limit: Option<u32>,
}

impl CheckInFilter {
    pub fn for_habit(habit_id: HabitId) -> Self {
        Self {
            habit_id: Some(habit_id),
            ..Default::default()
        }
    }
}

/// Trait defining the storage interface for habits and check-ins
///
/// Implementations must keep at most one check-in per (habit, date); the
/// streak calculations rely on it.
pub trait HabitStorage {
    /// Create a new habit
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Get a habit by ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError>;

    /// Update an existing habit
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Delete a habit and its check-ins
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError>;

    /// List habits, newest first
    fn list_habits(&self, include_archived: bool) -> Result<Vec<Habit>, StorageError>;

    /// Record a check-in, replacing any existing one for the same habit and date
    ///
    /// Returns the stored record, which keeps the original ID on update.
    fn upsert_check_in(&self, check_in: &CheckIn) -> Result<CheckIn, StorageError>;

    /// Get a check-in by ID
    fn get_check_in(&self, check_in_id: &CheckInId) -> Result<CheckIn, StorageError>;

    /// List check-ins matching `filter`, newest date first
    fn list_check_ins(&self, filter: &CheckInFilter) -> Result<Vec<CheckIn>, StorageError>;

    /// Delete a check-in
    fn delete_check_in(&self, check_in_id: &CheckInId) -> Result<(), StorageError>;

    /// Completed dates for one habit
    fn completed_dates_for_habit(&self, habit_id: &HabitId) -> Result<CompletedDates, StorageError>;

    /// All-time completed check-ins for one habit
    fn count_completed(&self, habit_id: &HabitId) -> Result<u32, StorageError>;

    /// Rows and completed rows dated within `[start, end]`, across all habits
    fn tally_check_ins(&self, start: CalendarDate, end: CalendarDate) -> Result<CheckInTally, StorageError>;

    /// Completed check-ins per date within `[start, end]`, optionally for one habit
    fn completion_counts(
        &self,
        start: CalendarDate,
        end: CalendarDate,
        habit_id: Option<&HabitId>,
    ) -> Result<BTreeMap<CalendarDate, u32>, StorageError>;
}
