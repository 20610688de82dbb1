//! Database module - SQLite storage for exercises, workouts and week plans

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

use crate::exercises::{BUILTIN_EXERCISES, ExerciseType};
use crate::workout::names::available_generic_name;
use crate::workout::{ExerciseLookup, ExerciseRef, RowData};

/// Week days in plan order
pub const DAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Workout payload as persisted and exported: row tuples plus the cached
/// derived time in minutes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutData {
    pub name: String,
    pub workout_type: String,
    pub rows: Vec<RowData>,
    pub workout_time: i64,
}

/// Week plan payload: one optional workout per day, monday..sunday
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanData {
    pub name: String,
    pub plan_type: String,
    pub days: Vec<Option<WorkoutData>>,
}

/// Exercise row as stored
#[derive(Debug, Clone)]
pub struct ExerciseRecord {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub exer_type: ExerciseType,
    pub icon: Vec<u8>,
}

/// Stored workout with its row id
#[derive(Debug, Clone)]
pub struct WorkoutRecord {
    pub id: i64,
    pub data: WorkoutData,
}

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// In-memory database, used in tests
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self { conn };
        db.init_schema()?;
        db.seed_exercises()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS exercises (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                exer_type TEXT NOT NULL,
                icon BLOB NOT NULL
            )",
            [],
        )?;
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS workouts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                workout_type TEXT NOT NULL,
                rows TEXT NOT NULL,
                workout_time INTEGER NOT NULL
            )",
            [],
        )?;
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS week_plans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                plan_type TEXT NOT NULL,
                days TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Insert the built-in catalog into an empty exercises table
    fn seed_exercises(&self) -> Result<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM exercises", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }
        for exer in BUILTIN_EXERCISES {
            self.conn.execute(
                "INSERT INTO exercises (slug, name, exer_type, icon) VALUES (?1, ?2, ?3, ?4)",
                params![exer.slug, exer.name, exer.exer_type.name(), Vec::<u8>::new()],
            )?;
        }
        Ok(())
    }

    // ----- Exercises -----

    pub fn insert_exercise(
        &self,
        slug: &str,
        name: &str,
        exer_type: ExerciseType,
        icon: &[u8],
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO exercises (slug, name, exer_type, icon) VALUES (?1, ?2, ?3, ?4)",
            params![slug, name, exer_type.name(), icon],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn delete_exercise(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM exercises WHERE id = ?1", params![id])?;
        Ok(())
    }

    pub fn list_exercises(&self, exer_type: Option<ExerciseType>) -> Result<Vec<ExerciseRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, slug, name, exer_type, icon FROM exercises
             WHERE (?1 IS NULL OR exer_type = ?1) ORDER BY name",
        )?;
        let records = stmt
            .query_map(params![exer_type.map(|t| t.name())], record_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    pub fn exercise_record(&self, id: i64) -> Result<Option<ExerciseRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, slug, name, exer_type, icon FROM exercises WHERE id = ?1",
                params![id],
                record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    pub fn find_exercise_by_name(&self, name: &str) -> Result<Option<ExerciseRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, slug, name, exer_type, icon FROM exercises
                 WHERE name = ?1 COLLATE NOCASE OR slug = ?1",
                params![name],
                record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    // ----- Workouts -----

    pub fn insert_workout(&self, data: &WorkoutData) -> Result<i64> {
        let rows_json = serde_json::to_string(&data.rows)?;
        self.conn.execute(
            "INSERT INTO workouts (name, workout_type, rows, workout_time)
             VALUES (?1, ?2, ?3, ?4)",
            params![data.name, data.workout_type, rows_json, data.workout_time],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update_workout(&self, id: i64, data: &WorkoutData) -> Result<()> {
        let rows_json = serde_json::to_string(&data.rows)?;
        self.conn.execute(
            "UPDATE workouts SET name = ?1, workout_type = ?2, rows = ?3, workout_time = ?4
             WHERE id = ?5",
            params![data.name, data.workout_type, rows_json, data.workout_time, id],
        )?;
        Ok(())
    }

    pub fn workout_by_name(&self, name: &str) -> Result<Option<WorkoutRecord>> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, name, workout_type, rows, workout_time FROM workouts
                 WHERE name = ?1 COLLATE NOCASE",
                params![name],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .optional()?;
        let Some((id, name, workout_type, rows_json, workout_time)) = raw else {
            return Ok(None);
        };
        let rows: Vec<RowData> = serde_json::from_str(&rows_json)
            .with_context(|| format!("corrupt rows column for workout {name:?}"))?;
        Ok(Some(WorkoutRecord {
            id,
            data: WorkoutData {
                name,
                workout_type,
                rows,
                workout_time,
            },
        }))
    }

    /// All workouts as (id, name, workout_time)
    pub fn list_workouts(&self) -> Result<Vec<(i64, String, i64)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, workout_time FROM workouts ORDER BY name")?;
        let workouts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(workouts)
    }

    pub fn delete_workout(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM workouts WHERE id = ?1", params![id])?;
        Ok(())
    }

    pub fn workout_name_taken(&self, name: &str) -> Result<bool> {
        let id: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM workouts WHERE name = ?1 COLLATE NOCASE",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id.is_some())
    }

    pub fn available_workout_name(&self) -> Result<String> {
        available_generic_name("Workout", |name| self.workout_name_taken(name))
    }

    // ----- Week plans -----

    pub fn insert_plan(&self, data: &PlanData) -> Result<i64> {
        let days_json = serde_json::to_string(&data.days)?;
        self.conn.execute(
            "INSERT INTO week_plans (name, plan_type, days) VALUES (?1, ?2, ?3)",
            params![data.name, data.plan_type, days_json],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn plan_by_name(&self, name: &str) -> Result<Option<(i64, PlanData)>> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, name, plan_type, days FROM week_plans WHERE name = ?1 COLLATE NOCASE",
                params![name],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;
        let Some((id, name, plan_type, days_json)) = raw else {
            return Ok(None);
        };
        let days: Vec<Option<WorkoutData>> = serde_json::from_str(&days_json)
            .with_context(|| format!("corrupt days column for plan {name:?}"))?;
        Ok(Some((
            id,
            PlanData {
                name,
                plan_type,
                days,
            },
        )))
    }

    pub fn list_plans(&self) -> Result<Vec<(i64, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM week_plans ORDER BY name")?;
        let plans = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(plans)
    }

    pub fn delete_plan(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM week_plans WHERE id = ?1", params![id])?;
        Ok(())
    }

    pub fn plan_name_taken(&self, name: &str) -> Result<bool> {
        let id: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM week_plans WHERE name = ?1 COLLATE NOCASE",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id.is_some())
    }

    pub fn available_plan_name(&self) -> Result<String> {
        available_generic_name("Plan", |name| self.plan_name_taken(name))
    }
}

fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ExerciseRecord> {
    let type_name: String = row.get(3)?;
    Ok(ExerciseRecord {
        id: row.get(0)?,
        slug: row.get(1)?,
        name: row.get(2)?,
        // unknown types behave as rep-driven
        exer_type: ExerciseType::parse(&type_name).unwrap_or(ExerciseType::Strength),
        icon: row.get(4)?,
    })
}

impl ExerciseLookup for Database {
    fn exercise_ref(&self, exer_id: i64) -> Result<Option<ExerciseRef>> {
        let record = self.exercise_record(exer_id)?;
        Ok(record.map(|r| ExerciseRef {
            exer_id: r.id,
            name: r.name,
            icon: r.icon,
        }))
    }
}
