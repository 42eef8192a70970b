/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habits and check-ins. It handles all SQL queries and data
/// conversion, and doubles as the analytics engine's data provider.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{params, params_from_iter, Connection, Row, ToSql};

use crate::analytics::{CheckInTally, HabitDataProvider, ProviderError};
use crate::domain::{CalendarDate, CheckIn, CheckInId, CompletedDates, Habit, HabitId};
use crate::storage::{migrations, CheckInFilter, HabitStorage, StorageError};

const HABIT_COLUMNS: &str =
    "id, name, description, category, color, icon, is_archived, created_on, created_at";

const CHECK_IN_COLUMNS: &str = "id, habit_id, date, completed, notes, logged_at";

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the HabitStorage trait.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open (or create) the database file and bring its schema up to date
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::from_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// A throwaway database, used by tests and dry runs
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open in-memory database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        // Deleting a habit cascades to its check-ins
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self { conn })
    }

    fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
        Ok(Habit {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            category: row.get(3)?,
            color: row.get(4)?,
            icon: row.get(5)?,
            is_archived: row.get(6)?,
            created_on: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    fn check_in_from_row(row: &Row<'_>) -> rusqlite::Result<CheckIn> {
        Ok(CheckIn {
            id: row.get(0)?,
            habit_id: row.get(1)?,
            date: row.get(2)?,
            completed: row.get(3)?,
            notes: row.get(4)?,
            logged_at: row.get(5)?,
        })
    }
}

fn to_count(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

impl ToSql for CalendarDate {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for CalendarDate {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        CalendarDate::parse(text).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for HabitId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for HabitId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        HabitId::parse(value.as_str()?).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for CheckInId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for CheckInId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        CheckInId::parse(value.as_str()?).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl HabitStorage for SqliteStorage {
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        self.conn.execute(
            &format!("INSERT INTO habits ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)", HABIT_COLUMNS),
            params![
                habit.id,
                habit.name,
                habit.description,
                habit.category,
                habit.color,
                habit.icon,
                habit.is_archived,
                habit.created_on,
                habit.created_at,
            ],
        )?;

        tracing::debug!("Created habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS),
            params![habit_id],
            Self::habit_from_row,
        );

        match result {
            Ok(habit) => Ok(habit),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE habits SET
                name = ?2,
                description = ?3,
                category = ?4,
                color = ?5,
                icon = ?6,
                is_archived = ?7
             WHERE id = ?1",
            params![
                habit.id,
                habit.name,
                habit.description,
                habit.category,
                habit.color,
                habit.icon,
                habit.is_archived,
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit.id.to_string(),
            });
        }

        tracing::debug!("Updated habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute("DELETE FROM habits WHERE id = ?1", params![habit_id])?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tracing::debug!("Deleted habit: {}", habit_id);
        Ok(())
    }

    fn list_habits(&self, include_archived: bool) -> Result<Vec<Habit>, StorageError> {
        let mut sql = format!("SELECT {} FROM habits", HABIT_COLUMNS);
        if !include_archived {
            sql.push_str(" WHERE is_archived = 0");
        }
        sql.push_str(" ORDER BY created_at DESC, id");

        let mut stmt = self.conn.prepare(&sql)?;
        let habits = stmt
            .query_map([], Self::habit_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(habits)
    }

    fn upsert_check_in(&self, check_in: &CheckIn) -> Result<CheckIn, StorageError> {
        // Surface a clean not-found instead of a foreign key violation
        self.get_habit(&check_in.habit_id)?;

        self.conn.execute(
            &format!(
                "INSERT INTO check_ins ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (habit_id, date) DO UPDATE SET
                    completed = excluded.completed,
                    notes = excluded.notes,
                    logged_at = excluded.logged_at",
                CHECK_IN_COLUMNS
            ),
            params![
                check_in.id,
                check_in.habit_id,
                check_in.date,
                check_in.completed,
                check_in.notes,
                check_in.logged_at,
            ],
        )?;

        let stored = self.conn.query_row(
            &format!("SELECT {} FROM check_ins WHERE habit_id = ?1 AND date = ?2", CHECK_IN_COLUMNS),
            params![check_in.habit_id, check_in.date],
            Self::check_in_from_row,
        )?;

        tracing::debug!(
            "Recorded check-in {} for habit {} on {} (completed: {})",
            stored.id,
            stored.habit_id,
            stored.date,
            stored.completed
        );
        Ok(stored)
    }

    fn get_check_in(&self, check_in_id: &CheckInId) -> Result<CheckIn, StorageError> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM check_ins WHERE id = ?1", CHECK_IN_COLUMNS),
            params![check_in_id],
            Self::check_in_from_row,
        );

        match result {
            Ok(check_in) => Ok(check_in),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::CheckInNotFound {
                check_in_id: check_in_id.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn list_check_ins(&self, filter: &CheckInFilter) -> Result<Vec<CheckIn>, StorageError> {
        let mut sql = format!("SELECT {} FROM check_ins WHERE 1 = 1", CHECK_IN_COLUMNS);
        let mut args: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(habit_id) = &filter.habit_id {
            args.push(Box::new(habit_id.clone()));
            sql.push_str(&format!(" AND habit_id = ?{}", args.len()));
        }
        if let Some(start) = filter.start {
            args.push(Box::new(start));
            sql.push_str(&format!(" AND date >= ?{}", args.len()));
        }
        if let Some(end) = filter.end {
            args.push(Box::new(end));
            sql.push_str(&format!(" AND date <= ?{}", args.len()));
        }
        if let Some(completed) = filter.completed {
            args.push(Box::new(completed));
            sql.push_str(&format!(" AND completed = ?{}", args.len()));
        }

        sql.push_str(" ORDER BY date DESC, logged_at DESC");

        if let Some(limit) = filter.limit {
            args.push(Box::new(limit));
            sql.push_str(&format!(" LIMIT ?{}", args.len()));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let check_ins = stmt
            .query_map(params_from_iter(args.iter()), Self::check_in_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(check_ins)
    }

    fn delete_check_in(&self, check_in_id: &CheckInId) -> Result<(), StorageError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM check_ins WHERE id = ?1", params![check_in_id])?;

        if rows_affected == 0 {
            return Err(StorageError::CheckInNotFound {
                check_in_id: check_in_id.to_string(),
            });
        }

        tracing::debug!("Deleted check-in: {}", check_in_id);
        Ok(())
    }

    fn completed_dates_for_habit(&self, habit_id: &HabitId) -> Result<CompletedDates, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT date FROM check_ins WHERE habit_id = ?1 AND completed = 1 ORDER BY date",
        )?;

        let dates = stmt
            .query_map(params![habit_id], |row| row.get::<_, CalendarDate>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompletedDates::from_dates(dates))
    }

    fn count_completed(&self, habit_id: &HabitId) -> Result<u32, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM check_ins WHERE habit_id = ?1 AND completed = 1",
            params![habit_id],
            |row| row.get(0),
        )?;

        Ok(to_count(count))
    }

    fn tally_check_ins(&self, start: CalendarDate, end: CalendarDate) -> Result<CheckInTally, StorageError> {
        let (total, completed): (i64, i64) = self.conn.query_row(
            "SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN completed = 1 THEN 1 ELSE 0 END), 0)
             FROM check_ins
             WHERE date >= ?1 AND date <= ?2",
            params![start, end],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(CheckInTally {
            total: to_count(total),
            completed: to_count(completed),
        })
    }

    fn completion_counts(
        &self,
        start: CalendarDate,
        end: CalendarDate,
        habit_id: Option<&HabitId>,
    ) -> Result<BTreeMap<CalendarDate, u32>, StorageError> {
        let mut sql = "SELECT date, COUNT(*) FROM check_ins
             WHERE completed = 1 AND date >= ?1 AND date <= ?2"
            .to_string();
        let mut args: Vec<Box<dyn ToSql>> = vec![Box::new(start), Box::new(end)];

        if let Some(habit_id) = habit_id {
            args.push(Box::new(habit_id.clone()));
            sql.push_str(" AND habit_id = ?3");
        }
        sql.push_str(" GROUP BY date ORDER BY date");

        let mut stmt = self.conn.prepare(&sql)?;
        let counts = stmt
            .query_map(params_from_iter(args.iter()), |row| {
                Ok((row.get::<_, CalendarDate>(0)?, to_count(row.get::<_, i64>(1)?)))
            })?
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(counts)
    }
}

#[async_trait(?Send)]
impl HabitDataProvider for SqliteStorage {
    async fn completed_dates(&self, habit_id: &HabitId) -> Result<CompletedDates, ProviderError> {
        Ok(self.completed_dates_for_habit(habit_id)?)
    }

    async fn completed_count(&self, habit_id: &HabitId) -> Result<u32, ProviderError> {
        Ok(self.count_completed(habit_id)?)
    }

    async fn check_in_tally(
        &self,
        start: CalendarDate,
        end: CalendarDate,
    ) -> Result<CheckInTally, ProviderError> {
        Ok(self.tally_check_ins(start, end)?)
    }
}
