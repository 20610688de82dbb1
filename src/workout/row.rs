//! Table row model and tuple (de)serialization
//!
//! Rows are persisted as JSON arrays with a leading type tag, so the store
//! and the motfile layer never need to know the row shapes. Icon bytes and
//! superset numbers are not persisted: the icon is refetched from the
//! exercise store on load and `WorkoutTable::reconcile` reassigns numbers.

use anyhow::Result;
use serde_json::{Value, json};

use super::WorkoutError;
use super::execution::default_execution;
use crate::exercises::ExerciseType;

pub const TAG_SS_TOP: &str = "ss_top";
pub const TAG_SS_BOTTOM: &str = "ss_bottom";
pub const TAG_EXER_EXEC: &str = "exer_exec";

/// Persisted row tuple: `[type_tag, ...fields]`
pub type RowData = Vec<Value>;

/// Current display data for an exercise, as the store knows it
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseRef {
    pub exer_id: i64,
    pub name: String,
    pub icon: Vec<u8>,
}

/// Collaborator that answers whether an exercise still exists and with
/// what display data. Implemented by the database; stubbed in tests.
pub trait ExerciseLookup {
    fn exercise_ref(&self, exer_id: i64) -> Result<Option<ExerciseRef>>;
}

/// One exercise's prescribed work inside a workout table
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseExecutionRow {
    pub exer_id: i64,
    pub icon: Vec<u8>,
    pub name: String,
    pub sets: i32,
    pub reps: i32,
    /// Rest in minutes after each set
    pub pause: i32,
    /// If true `reps` counts repetitions, otherwise minutes
    pub on_reps: bool,
    /// Set while the row lies inside a superset block
    pub superset_numb: Option<i32>,
}

impl ExerciseExecutionRow {
    /// New row with the execution defaults for the exercise's type
    pub fn with_defaults(exer: &ExerciseRef, exer_type: ExerciseType) -> Self {
        let on_reps = exer_type.on_reps_default();
        let defaults = default_execution(on_reps);
        Self {
            exer_id: exer.exer_id,
            icon: exer.icon.clone(),
            name: exer.name.clone(),
            sets: defaults.sets,
            reps: defaults.reps,
            pause: defaults.pause,
            on_reps,
            superset_numb: None,
        }
    }
}

/// Opens a superset block; display-only marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupersetTopRow {
    pub numb: i32,
}

impl SupersetTopRow {
    pub fn text(&self) -> String {
        format!("SUPERSET {}", self.numb)
    }
}

/// Closes a superset block; its sets/pause govern the whole block.
/// The reps column of this row is always empty and non-editable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupersetBottomRow {
    pub numb: i32,
    /// How many times the whole block is repeated
    pub sets: i32,
    /// Rest in minutes after each full round
    pub pause: i32,
}

impl SupersetBottomRow {
    /// New bottom row with the rep-driven block defaults
    pub fn with_defaults(numb: i32) -> Self {
        let defaults = default_execution(true);
        Self {
            numb,
            sets: defaults.sets,
            pause: defaults.pause,
        }
    }
}

/// Closed set of workout table row kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TableRow {
    ExerciseExecution(ExerciseExecutionRow),
    SupersetTop(SupersetTopRow),
    SupersetBottom(SupersetBottomRow),
}

/// Outcome of reconstructing one persisted row tuple
#[derive(Debug, Clone, PartialEq)]
pub enum Reconstructed {
    Row(TableRow),
    /// The referenced exercise was deleted since the row was saved;
    /// carries the stored display name for the missing-exercises report.
    MissingExercise(String),
}

impl TableRow {
    pub fn type_tag(&self) -> &'static str {
        match self {
            TableRow::ExerciseExecution(_) => TAG_EXER_EXEC,
            TableRow::SupersetTop(_) => TAG_SS_TOP,
            TableRow::SupersetBottom(_) => TAG_SS_BOTTOM,
        }
    }

    /// Row tuple for persistence
    pub fn to_data(&self) -> RowData {
        match self {
            TableRow::ExerciseExecution(exec) => vec![
                json!(TAG_EXER_EXEC),
                json!(exec.exer_id),
                json!(exec.name),
                json!(exec.sets),
                json!(exec.reps),
                json!(exec.pause),
                json!(exec.on_reps),
            ],
            TableRow::SupersetTop(top) => vec![json!(TAG_SS_TOP), json!(top.numb)],
            TableRow::SupersetBottom(bottom) => vec![
                json!(TAG_SS_BOTTOM),
                json!(bottom.numb),
                json!(bottom.sets),
                json!(bottom.pause),
            ],
        }
    }

    /// Rebuilds a row from its persisted tuple. Exercise rows keep the
    /// stored name but take current icon bytes from `lookup`; a deleted
    /// exercise yields `Reconstructed::MissingExercise` instead of an error.
    pub fn from_data(data: &[Value], lookup: &dyn ExerciseLookup) -> Result<Reconstructed> {
        let tag = field_str(data, 0)?;
        let row = match tag.as_str() {
            TAG_SS_TOP => TableRow::SupersetTop(SupersetTopRow {
                numb: field_i32(data, 1)?,
            }),
            TAG_SS_BOTTOM => TableRow::SupersetBottom(SupersetBottomRow {
                numb: field_i32(data, 1)?,
                sets: field_i32(data, 2)?,
                pause: field_i32(data, 3)?,
            }),
            TAG_EXER_EXEC => {
                let exer_id = field_i64(data, 1)?;
                let name = field_str(data, 2)?;
                let Some(exer) = lookup.exercise_ref(exer_id)? else {
                    return Ok(Reconstructed::MissingExercise(name));
                };
                TableRow::ExerciseExecution(ExerciseExecutionRow {
                    exer_id,
                    icon: exer.icon,
                    name,
                    sets: field_i32(data, 3)?,
                    reps: field_i32(data, 4)?,
                    pause: field_i32(data, 5)?,
                    on_reps: field_bool(data, 6)?,
                    superset_numb: None,
                })
            }
            other => {
                return Err(WorkoutError::BadRowData(format!("unknown row tag {other:?}")).into());
            }
        };
        Ok(Reconstructed::Row(row))
    }
}

fn field(data: &[Value], index: usize) -> Result<&Value, WorkoutError> {
    data.get(index)
        .ok_or_else(|| WorkoutError::BadRowData(format!("missing field {index}")))
}

fn field_i64(data: &[Value], index: usize) -> Result<i64, WorkoutError> {
    field(data, index)?
        .as_i64()
        .ok_or_else(|| WorkoutError::BadRowData(format!("field {index} is not an integer")))
}

fn field_i32(data: &[Value], index: usize) -> Result<i32, WorkoutError> {
    Ok(field_i64(data, index)? as i32)
}

fn field_str(data: &[Value], index: usize) -> Result<String, WorkoutError> {
    field(data, index)?
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| WorkoutError::BadRowData(format!("field {index} is not a string")))
}

fn field_bool(data: &[Value], index: usize) -> Result<bool, WorkoutError> {
    field(data, index)?
        .as_bool()
        .ok_or_else(|| WorkoutError::BadRowData(format!("field {index} is not a bool")))
}
