/// Habit entity and related functionality
///
/// This module defines the Habit struct that represents something the user
/// wants to do daily, plus `HabitRef`, the minimal view the analytics engine
/// needs to bound per-habit analysis windows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CalendarDate, DomainError, HabitId};

/// A habit the user checks in against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name (e.g., "Morning Run", "Read for 30min")
    pub name: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// Free-form grouping label
    pub category: Option<String>,
    /// UI color token
    pub color: Option<String>,
    /// UI icon token
    pub icon: Option<String>,
    /// Archived habits are excluded from per-habit stats
    pub is_archived: bool,
    /// Calendar day the habit was created on; start of its completion window
    pub created_on: CalendarDate,
    /// Creation instant, used for stable ordering
    pub created_at: DateTime<Utc>,
}

/// Minimal habit identity consumed by the stats aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitRef {
    pub id: HabitId,
    pub name: String,
    pub created_date: CalendarDate,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_archived: bool,
}

impl Habit {
    /// Create a new habit with validation
    ///
    /// `created_on` is the request's "today"; the habit never reads the clock
    /// for its calendar date.
    pub fn new(
        name: String,
        description: Option<String>,
        category: Option<String>,
        color: Option<String>,
        icon: Option<String>,
        created_on: CalendarDate,
    ) -> Result<Self, DomainError> {
        Self::validate_name(&name)?;
        Self::validate_description(&description)?;
        Self::validate_label("category", &category)?;
        Self::validate_label("color", &color)?;
        Self::validate_label("icon", &icon)?;

        Ok(Self {
            id: HabitId::new(),
            name: name.trim().to_string(),
            description,
            category,
            color,
            icon,
            is_archived: false,
            created_on,
            created_at: Utc::now(),
        })
    }

    /// Update the habit's properties with validation
    ///
    /// Nothing is applied unless every supplied value is valid.
    pub fn update(
        &mut self,
        name: Option<String>,
        description: Option<Option<String>>,
        category: Option<Option<String>>,
        is_archived: Option<bool>,
    ) -> Result<(), DomainError> {
        if let Some(ref new_name) = name {
            Self::validate_name(new_name)?;
        }
        if let Some(ref new_desc) = description {
            Self::validate_description(new_desc)?;
        }
        if let Some(ref new_category) = category {
            Self::validate_label("category", new_category)?;
        }

        if let Some(new_name) = name {
            self.name = new_name.trim().to_string();
        }
        if let Some(new_description) = description {
            self.description = new_description;
        }
        if let Some(new_category) = category {
            self.category = new_category;
        }
        if let Some(archived) = is_archived {
            self.is_archived = archived;
        }

        Ok(())
    }

    /// The analytics view of this habit
    pub fn to_ref(&self) -> HabitRef {
        HabitRef {
            id: self.id.clone(),
            name: self.name.clone(),
            created_date: self.created_on,
            color: self.color.clone(),
            icon: self.icon.clone(),
            is_archived: self.is_archived,
        }
    }

    // Validation helper methods

    fn validate_name(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string()
            ));
        }

        if trimmed.chars().count() > 100 {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be longer than 100 characters".to_string()
            ));
        }

        Ok(())
    }

    fn validate_description(description: &Option<String>) -> Result<(), DomainError> {
        if let Some(desc) = description {
            if desc.chars().count() > 500 {
                return Err(DomainError::Validation {
                    message: "Description cannot be longer than 500 characters".to_string()
                });
            }
        }
        Ok(())
    }

    fn validate_label(field: &str, value: &Option<String>) -> Result<(), DomainError> {
        if let Some(label) = value {
            if label.chars().count() > 50 {
                return Err(DomainError::Validation {
                    message: format!("{} cannot be longer than 50 characters", field)
                });
            }
        }
        Ok(())
    }
}
