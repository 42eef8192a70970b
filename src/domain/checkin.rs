/// CheckIn entity for tracking daily completion records
///
/// A check-in asserts whether a habit was completed on one calendar day.
/// Storage keeps at most one check-in per (habit, date); logging the same day
/// again updates the existing record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CalendarDate, CheckInId, DomainError, HabitId};

/// A record of a habit's status on a specific day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    /// Unique identifier for this check-in
    pub id: CheckInId,
    /// Which habit this check-in is for
    pub habit_id: HabitId,
    /// Which day this check-in is for
    pub date: CalendarDate,
    /// Whether the habit was done that day
    pub completed: bool,
    /// User's notes about this day
    pub notes: Option<String>,
    /// When this check-in was last written
    pub logged_at: DateTime<Utc>,
}

impl CheckIn {
    /// Create a new check-in with validation
    pub fn new(
        habit_id: HabitId,
        date: CalendarDate,
        completed: bool,
        notes: Option<String>,
    ) -> Result<Self, DomainError> {
        Self::validate_notes(&notes)?;

        Ok(Self {
            id: CheckInId::new(),
            habit_id,
            date,
            completed,
            notes,
            logged_at: Utc::now(),
        })
    }

    /// Check if this check-in has non-blank notes
    pub fn has_notes(&self) -> bool {
        self.notes.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    fn validate_notes(notes: &Option<String>) -> Result<(), DomainError> {
        if let Some(note_text) = notes {
            if note_text.chars().count() > 500 {
                return Err(DomainError::Validation {
                    message: "Notes cannot be longer than 500 characters".to_string()
                });
            }
        }
        Ok(())
    }
}

/// Completed dates of a set of check-ins, in input order
///
/// Only `completed` records count toward streaks and heatmaps.
pub fn completed_dates<'a, I>(records: I) -> impl Iterator<Item = CalendarDate> + 'a
where
    I: IntoIterator<Item = &'a CheckIn>,
    I::IntoIter: 'a,
{
    records.into_iter().filter(|c| c.completed).map(|c| c.date)
}
