/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Habit, CheckIn, CalendarDate) and the
/// pieces of the analytics engine that only depend on them: date-set
/// normalization and streak calculation.

pub mod date;
pub mod date_set;
pub mod checkin;
pub mod habit;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use date::*;
pub use date_set::*;
pub use checkin::*;
pub use habit::*;
pub use streak::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Malformed date '{value}': expected YYYY-MM-DD")]
    MalformedDate { value: String },

    #[error("Invalid year: {0}")]
    InvalidYear(i32),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),
}
