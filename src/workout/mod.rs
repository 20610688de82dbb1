//! Workout table engine - rows, superset grouping, workout time
//!
//! A workout is an ordered sequence of table rows. Contiguous exercise rows
//! can be wrapped in a superset (a top/bottom marker pair) that is executed
//! back-to-back; the bottom row's sets/pause govern the whole block.

pub mod execution;
pub mod names;
pub mod row;
pub mod table;

pub use execution::{
    ExecutionDefaults, ExecutionField, REP_EXEC_TIME, default_execution, workout_time_minutes,
};
pub use row::{
    ExerciseExecutionRow, ExerciseLookup, ExerciseRef, Reconstructed, RowData, SupersetBottomRow,
    SupersetTopRow, TableRow,
};
pub use table::WorkoutTable;

use thiserror::Error;

/// Errors local to the workout table; none is fatal to the process.
#[derive(Debug, Error)]
pub enum WorkoutError {
    /// Superset grouping preconditions violated; the table is unchanged.
    #[error("invalid superset grouping: {0}")]
    InvalidGrouping(String),

    /// Persisted row data with broken marker structure (rejected on load).
    #[error("malformed workout table: {0}")]
    MalformedTable(String),

    /// A row tuple that does not match any of the three row shapes.
    #[error("bad row data: {0}")]
    BadRowData(String),

    #[error("{}", .field.error_msg())]
    ValueOutOfRange { field: ExecutionField, value: i32 },

    /// The addressed cell is not editable (marker row or superset member).
    #[error("cell is not editable")]
    NotEditable,
}
