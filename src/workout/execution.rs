//! Execution constants, column value constraints and workout time

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::row::TableRow;

/// Seconds one repetition is assumed to take
pub const REP_EXEC_TIME: i64 = 3;

/// Default sets/reps/pause for a new execution row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionDefaults {
    pub sets: i32,
    pub reps: i32,
    pub pause: i32,
}

const DEFAULT_ON_REPS: ExecutionDefaults = ExecutionDefaults {
    sets: 3,
    reps: 10,
    pause: 2,
};

// reps counts minutes for time-driven exercises
const DEFAULT_ON_TIME: ExecutionDefaults = ExecutionDefaults {
    sets: 3,
    reps: 1,
    pause: 2,
};

pub fn default_execution(on_reps: bool) -> ExecutionDefaults {
    if on_reps { DEFAULT_ON_REPS } else { DEFAULT_ON_TIME }
}

/// Editable execution fields with their allowed value ranges
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ExecutionField {
    Sets,
    Reps,
    Pause,
}

impl ExecutionField {
    pub fn label(&self) -> &'static str {
        match self {
            ExecutionField::Sets => "Sets",
            ExecutionField::Reps => "Reps/Time",
            ExecutionField::Pause => "Pause",
        }
    }

    pub fn range(&self) -> RangeInclusive<i32> {
        match self {
            ExecutionField::Sets => 1..=10,
            ExecutionField::Reps => 1..=120,
            ExecutionField::Pause => 0..=10,
        }
    }

    pub fn valid(&self, value: i32) -> bool {
        self.range().contains(&value)
    }

    pub fn error_msg(&self) -> String {
        let range = self.range();
        format!(
            "Column value for {}:\n\
             \x20   - must be an integer\n\
             \x20   - must be minimum {}\n\
             \x20   - must be maximum {}\n",
            self.label(),
            range.start(),
            range.end()
        )
    }
}

/// Total estimated workout time in whole minutes (seconds floored away).
///
/// Rows outside a superset contribute `sets * (per_set + pause)`. Rows
/// inside a superset contribute only their per-set execution time to a
/// running block sum; the block's bottom row then contributes
/// `sets * (block_sum + pause)`, its values superseding the members' own.
pub fn workout_time_minutes(rows: &[TableRow]) -> i64 {
    let mut total_sec: i64 = 0;
    let mut superset_exec_sec: i64 = 0;
    for row in rows {
        match row {
            TableRow::ExerciseExecution(exec) => {
                let per_set_sec = if exec.on_reps {
                    exec.reps as i64 * REP_EXEC_TIME
                } else {
                    exec.reps as i64 * 60
                };
                if exec.superset_numb.is_none() {
                    total_sec += exec.sets as i64 * (per_set_sec + exec.pause as i64 * 60);
                } else {
                    superset_exec_sec += per_set_sec;
                }
            }
            TableRow::SupersetTop(_) => {}
            TableRow::SupersetBottom(bottom) => {
                total_sec += bottom.sets as i64 * (superset_exec_sec + bottom.pause as i64 * 60);
                superset_exec_sec = 0;
            }
        }
    }
    total_sec / 60
}
