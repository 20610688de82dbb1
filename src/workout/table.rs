//! WorkoutTable - ordered row sequence with superset invariants
//!
//! Every structural mutation ends with [`WorkoutTable::reconcile`], which
//! restores the invariants: each top marker has exactly one bottom marker,
//! blocks wrap at least 2 exercise rows, numbers run contiguously from 1
//! top-to-bottom, and member rows carry their block's number.

use anyhow::Result;
use serde_json::Value;
use tracing::warn;

use super::WorkoutError;
use super::execution::{ExecutionField, default_execution, workout_time_minutes};
use super::row::{
    ExerciseLookup, Reconstructed, RowData, SupersetBottomRow, SupersetTopRow, TAG_SS_BOTTOM,
    TAG_SS_TOP, TableRow,
};

/// One day's/workout's exercise rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutTable {
    rows: Vec<TableRow>,
}

impl WorkoutTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&TableRow> {
        self.rows.get(index)
    }

    /// Superset numbers currently present, in table order
    pub fn superset_numbers(&self) -> Vec<i32> {
        self.rows
            .iter()
            .filter_map(|row| match row {
                TableRow::SupersetTop(top) => Some(top.numb),
                _ => None,
            })
            .collect()
    }

    /// Inserts at `index`, clamped to `[0, len]`
    pub fn insert_row(&mut self, index: usize, row: TableRow) {
        let index = index.min(self.rows.len());
        self.rows.insert(index, row);
        self.reconcile();
    }

    pub fn push_row(&mut self, row: TableRow) {
        self.insert_row(self.rows.len(), row);
    }

    /// Removes the given positions; duplicates and out-of-range indices are
    /// ignored. Indices are processed highest-first so earlier positions
    /// stay valid during the removal.
    pub fn remove_rows(&mut self, indices: &[usize]) {
        let mut indices = indices.to_vec();
        indices.sort_unstable();
        indices.dedup();
        for &index in indices.iter().rev() {
            if index < self.rows.len() {
                self.rows.remove(index);
            }
        }
        self.reconcile();
    }

    /// Swaps two positions (the UI exposes only adjacent moves)
    pub fn move_row(&mut self, from: usize, to: usize) {
        if from != to && from < self.rows.len() && to < self.rows.len() {
            self.rows.swap(from, to);
        }
        self.reconcile();
    }

    /// Wraps the selected rows in a new superset block.
    ///
    /// The selection must be contiguous, strictly increasing, at least 2
    /// rows, all exercise rows and none already inside a superset. On
    /// violation the table is left unmodified; the caller is expected to
    /// have checked the precondition before offering the action.
    pub fn group_as_superset(&mut self, selection: &[usize]) -> Result<(), WorkoutError> {
        if selection.len() < 2 {
            return Err(WorkoutError::InvalidGrouping(
                "a superset needs at least 2 rows".to_string(),
            ));
        }
        for pair in selection.windows(2) {
            if pair[1] != pair[0] + 1 {
                return Err(WorkoutError::InvalidGrouping(
                    "selected rows are not contiguous".to_string(),
                ));
            }
        }
        for &index in selection {
            match self.rows.get(index) {
                Some(TableRow::ExerciseExecution(exec)) => {
                    if exec.superset_numb.is_some() {
                        return Err(WorkoutError::InvalidGrouping(format!(
                            "row {index} already belongs to a superset"
                        )));
                    }
                }
                Some(_) => {
                    return Err(WorkoutError::InvalidGrouping(format!(
                        "row {index} is not an exercise row"
                    )));
                }
                None => {
                    return Err(WorkoutError::InvalidGrouping(format!(
                        "row {index} is out of range"
                    )));
                }
            }
        }
        let numb = self.superset_numbers().iter().max().copied().unwrap_or(0) + 1;
        let first = selection[0];
        let last = selection[selection.len() - 1];
        self.rows
            .insert(first, TableRow::SupersetTop(SupersetTopRow { numb }));
        // +2: one past the last selected row, shifted by the inserted top
        self.rows.insert(
            last + 2,
            TableRow::SupersetBottom(SupersetBottomRow::with_defaults(numb)),
        );
        self.reconcile();
        Ok(())
    }

    /// Removes the marker pair with the given number; the formerly wrapped
    /// rows fall back to their type defaults. An unknown number is a caller
    /// contract violation and leaves the table unchanged.
    pub fn ungroup_superset(&mut self, numb: i32) {
        let mut top = None;
        let mut bottom = None;
        for (index, row) in self.rows.iter().enumerate() {
            match row {
                TableRow::SupersetTop(t) if t.numb == numb => top = Some(index),
                TableRow::SupersetBottom(b) if b.numb == numb => {
                    bottom = Some(index);
                    break;
                }
                _ => {}
            }
        }
        let (Some(top), Some(bottom)) = (top, bottom) else {
            warn!(numb, "ungroup_superset: superset number not found");
            return;
        };
        self.remove_rows(&[top, bottom]);
    }

    /// Total estimated time in minutes
    pub fn workout_time_minutes(&self) -> i64 {
        workout_time_minutes(&self.rows)
    }

    /// Writes `value` into an editable cell. Marker top rows, the reps cell
    /// of bottom rows and the sets/pause cells of superset members (the
    /// bottom row's values govern those) are not editable.
    pub fn set_value(
        &mut self,
        index: usize,
        field: ExecutionField,
        value: i32,
    ) -> Result<(), WorkoutError> {
        let Some(row) = self.rows.get_mut(index) else {
            return Err(WorkoutError::NotEditable);
        };
        let cell = match (row, field) {
            (TableRow::ExerciseExecution(exec), ExecutionField::Reps) => &mut exec.reps,
            (TableRow::ExerciseExecution(exec), ExecutionField::Sets)
                if exec.superset_numb.is_none() =>
            {
                &mut exec.sets
            }
            (TableRow::ExerciseExecution(exec), ExecutionField::Pause)
                if exec.superset_numb.is_none() =>
            {
                &mut exec.pause
            }
            (TableRow::SupersetBottom(bottom), ExecutionField::Sets) => &mut bottom.sets,
            (TableRow::SupersetBottom(bottom), ExecutionField::Pause) => &mut bottom.pause,
            _ => return Err(WorkoutError::NotEditable),
        };
        if !field.valid(value) {
            return Err(WorkoutError::ValueOutOfRange { field, value });
        }
        *cell = value;
        Ok(())
    }

    /// Row tuples for persistence
    pub fn to_rows_data(&self) -> Vec<RowData> {
        self.rows.iter().map(TableRow::to_data).collect()
    }

    /// Rebuilds a table from persisted tuples. Marker structure is
    /// validated first (nested or unterminated pairs are rejected), then
    /// rows whose exercise was deleted are dropped and their stored names
    /// collected into the returned report.
    pub fn from_rows_data(
        data: &[RowData],
        lookup: &dyn ExerciseLookup,
    ) -> Result<(Self, Vec<String>)> {
        validate_marker_structure(data)?;
        let mut rows = Vec::with_capacity(data.len());
        let mut missing = Vec::new();
        for row_data in data {
            match TableRow::from_data(row_data, lookup)? {
                Reconstructed::Row(row) => rows.push(row),
                Reconstructed::MissingExercise(name) => missing.push(name),
            }
        }
        let mut table = Self { rows };
        table.reconcile();
        Ok((table, missing))
    }

    /// Restores the superset invariants after a structural mutation.
    ///
    /// One top-to-bottom scan pairs up the markers. Orphan markers and
    /// pairs wrapping fewer than 2 exercise rows are removed (dissolving
    /// the block); surviving pairs are renumbered contiguously from 1 and
    /// their member rows tagged. Rows that left a block fall back to their
    /// type defaults; rows inside a block are reset as well, since the
    /// bottom row's sets/pause govern execution (the view renders them
    /// as `-`).
    fn reconcile(&mut self) {
        let mut blocks: Vec<(usize, usize, Vec<usize>)> = Vec::new();
        let mut to_remove: Vec<usize> = Vec::new();
        let mut open: Option<(usize, Vec<usize>)> = None;
        for (index, row) in self.rows.iter().enumerate() {
            match row {
                TableRow::SupersetTop(_) => {
                    // a still-open pair here means a dangling top; drop it
                    if let Some((top, _)) = open.take() {
                        to_remove.push(top);
                    }
                    open = Some((index, Vec::new()));
                }
                TableRow::SupersetBottom(_) => match open.take() {
                    Some((top, members)) => {
                        if members.len() >= 2 {
                            blocks.push((top, index, members));
                        } else {
                            to_remove.push(top);
                            to_remove.push(index);
                        }
                    }
                    None => to_remove.push(index),
                },
                TableRow::ExerciseExecution(_) => {
                    if let Some((_, members)) = open.as_mut() {
                        members.push(index);
                    }
                }
            }
        }
        if let Some((top, _)) = open {
            to_remove.push(top);
        }

        let mut member_numbers = vec![None; self.rows.len()];
        for (block_index, (top, bottom, members)) in blocks.iter().enumerate() {
            let numb = block_index as i32 + 1;
            if let TableRow::SupersetTop(t) = &mut self.rows[*top] {
                t.numb = numb;
            }
            if let TableRow::SupersetBottom(b) = &mut self.rows[*bottom] {
                b.numb = numb;
            }
            for &member in members {
                member_numbers[member] = Some(numb);
            }
        }
        for (index, row) in self.rows.iter_mut().enumerate() {
            let TableRow::ExerciseExecution(exec) = row else {
                continue;
            };
            let numb = member_numbers[index];
            if exec.superset_numb != numb {
                let defaults = default_execution(exec.on_reps);
                exec.sets = defaults.sets;
                exec.pause = defaults.pause;
                exec.superset_numb = numb;
            }
        }

        to_remove.sort_unstable();
        for &index in to_remove.iter().rev() {
            self.rows.remove(index);
        }
    }
}

/// Rejects persisted data whose marker structure the editing operations
/// could never produce: a top inside an open pair (nesting), a bottom with
/// no open pair, or a pair left unterminated.
fn validate_marker_structure(data: &[RowData]) -> Result<(), WorkoutError> {
    let mut open = false;
    for (index, row_data) in data.iter().enumerate() {
        match row_data.first().and_then(Value::as_str) {
            Some(TAG_SS_TOP) => {
                if open {
                    return Err(WorkoutError::MalformedTable(format!(
                        "nested superset top at row {index}"
                    )));
                }
                open = true;
            }
            Some(TAG_SS_BOTTOM) => {
                if !open {
                    return Err(WorkoutError::MalformedTable(format!(
                        "superset bottom without top at row {index}"
                    )));
                }
                open = false;
            }
            _ => {}
        }
    }
    if open {
        return Err(WorkoutError::MalformedTable(
            "unterminated superset block".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::row::test_support::{MissingLookup, StubLookup, exec_row};
    use crate::workout::row::{ExerciseExecutionRow, TAG_EXER_EXEC};
    use serde_json::json;

    fn table_with(count: usize) -> WorkoutTable {
        let mut table = WorkoutTable::new();
        for id in 0..count {
            table.push_row(exec_row(id as i64 + 1, &format!("ex{id}")));
        }
        table
    }

    fn exec_at(table: &WorkoutTable, index: usize) -> &ExerciseExecutionRow {
        match table.row(index) {
            Some(TableRow::ExerciseExecution(exec)) => exec,
            other => panic!("row {index} is not an exercise row: {other:?}"),
        }
    }

    /// Invariants 1-5: matched unique markers, correct member tagging,
    /// >= 2 members per block, contiguous numbering, no nesting.
    fn assert_invariants(table: &WorkoutTable) {
        let mut open: Option<i32> = None;
        let mut expected_numb = 1;
        let mut members = 0;
        for row in table.rows() {
            match row {
                TableRow::SupersetTop(top) => {
                    assert!(open.is_none(), "nested superset top");
                    assert_eq!(top.numb, expected_numb, "non-contiguous numbering");
                    open = Some(top.numb);
                    members = 0;
                }
                TableRow::SupersetBottom(bottom) => {
                    assert_eq!(open, Some(bottom.numb), "unmatched bottom");
                    assert!(members >= 2, "block with fewer than 2 members");
                    open = None;
                    expected_numb += 1;
                }
                TableRow::ExerciseExecution(exec) => {
                    assert_eq!(exec.superset_numb, open, "wrong member tagging");
                    if open.is_some() {
                        members += 1;
                    }
                }
            }
        }
        assert!(open.is_none(), "unterminated block");
    }

    #[test]
    fn test_insert_clamps_index() {
        let mut table = WorkoutTable::new();
        table.insert_row(99, exec_row(1, "a"));
        assert_eq!(table.len(), 1);
        table.insert_row(0, exec_row(2, "b"));
        assert_eq!(exec_at(&table, 0).exer_id, 2);
    }

    #[test]
    fn test_group_and_tag_members() {
        let mut table = table_with(3);
        table.group_as_superset(&[0, 1]).unwrap();
        // top, 2 members, bottom, untouched row
        assert_eq!(table.len(), 5);
        assert_eq!(table.superset_numbers(), vec![1]);
        assert_eq!(exec_at(&table, 1).superset_numb, Some(1));
        assert_eq!(exec_at(&table, 2).superset_numb, Some(1));
        assert_eq!(exec_at(&table, 4).superset_numb, None);
        assert!(matches!(table.row(3), Some(TableRow::SupersetBottom(b)) if b.sets == 3 && b.pause == 2));
        assert_invariants(&table);
    }

    #[test]
    fn test_group_non_contiguous_rejected() {
        let mut table = table_with(3);
        let before = table.clone();
        let err = table.group_as_superset(&[0, 2]).unwrap_err();
        assert!(matches!(err, WorkoutError::InvalidGrouping(_)));
        assert_eq!(table, before);
    }

    #[test]
    fn test_group_single_row_rejected() {
        let mut table = table_with(2);
        assert!(table.group_as_superset(&[0]).is_err());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_group_overlapping_superset_rejected() {
        let mut table = table_with(4);
        table.group_as_superset(&[0, 1]).unwrap();
        // rows 1 and 2 are now inside the block, row 4 is outside
        let before = table.clone();
        let err = table.group_as_superset(&[2, 3]).unwrap_err();
        assert!(matches!(err, WorkoutError::InvalidGrouping(_)));
        assert_eq!(table, before);
    }

    #[test]
    fn test_group_marker_row_rejected() {
        let mut table = table_with(4);
        table.group_as_superset(&[2, 3]).unwrap();
        // index 2 is now the top marker
        let err = table.group_as_superset(&[1, 2]).unwrap_err();
        assert!(matches!(err, WorkoutError::InvalidGrouping(_)));
    }

    #[test]
    fn test_second_superset_numbered_after_first() {
        let mut table = table_with(4);
        table.group_as_superset(&[0, 1]).unwrap();
        table.group_as_superset(&[4, 5]).unwrap();
        assert_eq!(table.superset_numbers(), vec![1, 2]);
        assert_invariants(&table);
    }

    #[test]
    fn test_ungroup_restores_defaults() {
        let mut table = table_with(2);
        table.group_as_superset(&[0, 1]).unwrap();
        table.ungroup_superset(1);
        assert_eq!(table.len(), 2);
        for index in 0..2 {
            let exec = exec_at(&table, index);
            assert_eq!(exec.superset_numb, None);
            assert_eq!(exec.sets, 3);
            assert_eq!(exec.pause, 2);
        }
        assert_invariants(&table);
    }

    #[test]
    fn test_ungroup_unknown_number_is_noop() {
        let mut table = table_with(2);
        table.group_as_superset(&[0, 1]).unwrap();
        let before = table.clone();
        table.ungroup_superset(9);
        assert_eq!(table, before);
    }

    #[test]
    fn test_removing_member_dissolves_small_block() {
        let mut table = table_with(3);
        table.group_as_superset(&[0, 1, 2]).unwrap();
        // remove the middle member; 2 members remain, block survives
        table.remove_rows(&[2]);
        assert_eq!(table.superset_numbers(), vec![1]);
        // remove another member; block falls below 2 and dissolves
        table.remove_rows(&[1]);
        assert!(table.superset_numbers().is_empty());
        assert_eq!(table.len(), 1);
        assert_eq!(exec_at(&table, 0).superset_numb, None);
        assert_invariants(&table);
    }

    #[test]
    fn test_block_survives_at_exactly_two_members() {
        let mut table = table_with(3);
        table.group_as_superset(&[0, 1, 2]).unwrap();
        table.remove_rows(&[2]); // middle member
        assert_eq!(table.superset_numbers(), vec![1]);
        assert_eq!(exec_at(&table, 1).superset_numb, Some(1));
        assert_eq!(exec_at(&table, 2).superset_numb, Some(1));
        assert_invariants(&table);
    }

    #[test]
    fn test_renumbering_after_ungroup() {
        let mut table = table_with(6);
        table.group_as_superset(&[0, 1]).unwrap();
        table.group_as_superset(&[4, 5]).unwrap();
        table.group_as_superset(&[8, 9]).unwrap();
        assert_eq!(table.superset_numbers(), vec![1, 2, 3]);
        table.ungroup_superset(2);
        assert_eq!(table.superset_numbers(), vec![1, 2]);
        assert_invariants(&table);
    }

    #[test]
    fn test_remove_rows_duplicates_ignored() {
        let mut table = table_with(3);
        table.remove_rows(&[1, 1, 1]);
        assert_eq!(table.len(), 2);
        assert_eq!(exec_at(&table, 0).exer_id, 1);
        assert_eq!(exec_at(&table, 1).exer_id, 3);
    }

    #[test]
    fn test_remove_rows_descending_shift() {
        let mut table = table_with(4);
        table.remove_rows(&[0, 2]);
        assert_eq!(table.len(), 2);
        assert_eq!(exec_at(&table, 0).exer_id, 2);
        assert_eq!(exec_at(&table, 1).exer_id, 4);
    }

    #[test]
    fn test_removing_marker_row_dissolves_block() {
        let mut table = table_with(2);
        table.group_as_superset(&[0, 1]).unwrap();
        // delete the top marker directly; reconcile drops the orphan bottom
        table.remove_rows(&[0]);
        assert_eq!(table.len(), 2);
        assert!(table.superset_numbers().is_empty());
        assert_invariants(&table);
    }

    #[test]
    fn test_move_member_out_of_block_dissolves_it() {
        let mut table = table_with(3);
        table.group_as_superset(&[0, 1]).unwrap();
        // move the second member below the bottom marker; the block keeps
        // only 1 member and dissolves
        table.move_row(2, 3);
        assert!(table.superset_numbers().is_empty());
        assert_eq!(table.len(), 3);
        assert_invariants(&table);
    }

    #[test]
    fn test_move_row_adjacent_swap() {
        let mut table = table_with(3);
        table.move_row(0, 1);
        assert_eq!(exec_at(&table, 0).exer_id, 2);
        assert_eq!(exec_at(&table, 1).exer_id, 1);
    }

    #[test]
    fn test_set_value_rules() {
        let mut table = table_with(3);
        table.group_as_superset(&[0, 1]).unwrap();
        // member: reps editable, sets/pause governed by the bottom row
        table.set_value(1, ExecutionField::Reps, 15).unwrap();
        assert_eq!(exec_at(&table, 1).reps, 15);
        assert!(matches!(
            table.set_value(1, ExecutionField::Sets, 5),
            Err(WorkoutError::NotEditable)
        ));
        // top marker: nothing editable
        assert!(matches!(
            table.set_value(0, ExecutionField::Sets, 5),
            Err(WorkoutError::NotEditable)
        ));
        // bottom: sets and pause editable, reps not
        table.set_value(3, ExecutionField::Sets, 4).unwrap();
        assert!(matches!(
            table.set_value(3, ExecutionField::Reps, 8),
            Err(WorkoutError::NotEditable)
        ));
        // free row: everything editable, ranges enforced
        table.set_value(4, ExecutionField::Pause, 0).unwrap();
        assert!(matches!(
            table.set_value(4, ExecutionField::Sets, 11),
            Err(WorkoutError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn test_round_trip_through_rows_data() {
        let mut table = table_with(4);
        table.group_as_superset(&[1, 2]).unwrap();
        let data = table.to_rows_data();
        let (loaded, missing) = WorkoutTable::from_rows_data(&data, &StubLookup).unwrap();
        assert!(missing.is_empty());
        assert_eq!(loaded.superset_numbers(), vec![1]);
        assert_eq!(loaded.len(), table.len());
        // icons come from the lookup, everything else matches
        for (a, b) in table.rows().iter().zip(loaded.rows()) {
            match (a, b) {
                (TableRow::ExerciseExecution(x), TableRow::ExerciseExecution(y)) => {
                    assert_eq!(x.name, y.name);
                    assert_eq!(x.sets, y.sets);
                    assert_eq!(x.reps, y.reps);
                    assert_eq!(x.pause, y.pause);
                    assert_eq!(x.superset_numb, y.superset_numb);
                }
                _ => assert_eq!(a, b),
            }
        }
        assert_invariants(&loaded);
    }

    #[test]
    fn test_load_drops_missing_exercises() {
        let mut table = table_with(3);
        let data = table.to_rows_data();
        let (loaded, missing) =
            WorkoutTable::from_rows_data(&data, &MissingLookup(vec![2])).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(missing, vec!["ex1".to_string()]);
        // dropping a member below 2 dissolves the block on load
        table.group_as_superset(&[0, 1]).unwrap();
        let data = table.to_rows_data();
        let (loaded, missing) =
            WorkoutTable::from_rows_data(&data, &MissingLookup(vec![1])).unwrap();
        assert_eq!(missing.len(), 1);
        assert!(loaded.superset_numbers().is_empty());
        assert_invariants(&loaded);
    }

    #[test]
    fn test_load_rejects_nested_markers() {
        let data = vec![
            vec![json!(TAG_SS_TOP), json!(1)],
            vec![json!(TAG_SS_TOP), json!(2)],
            vec![json!(TAG_SS_BOTTOM), json!(2), json!(3), json!(2)],
            vec![json!(TAG_SS_BOTTOM), json!(1), json!(3), json!(2)],
        ];
        let err = WorkoutTable::from_rows_data(&data, &StubLookup).unwrap_err();
        let err = err.downcast_ref::<WorkoutError>().unwrap();
        assert!(matches!(err, WorkoutError::MalformedTable(_)));
    }

    #[test]
    fn test_load_rejects_unterminated_block() {
        let data = vec![
            vec![json!(TAG_SS_TOP), json!(1)],
            vec![
                json!(TAG_EXER_EXEC),
                json!(1),
                json!("a"),
                json!(3),
                json!(10),
                json!(2),
                json!(true),
            ],
        ];
        let err = WorkoutTable::from_rows_data(&data, &StubLookup).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WorkoutError>(),
            Some(WorkoutError::MalformedTable(_))
        ));
    }

    #[test]
    fn test_load_rejects_bottom_without_top() {
        let data = vec![vec![json!(TAG_SS_BOTTOM), json!(1), json!(3), json!(2)]];
        let err = WorkoutTable::from_rows_data(&data, &StubLookup).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WorkoutError>(),
            Some(WorkoutError::MalformedTable(_))
        ));
    }

    #[test]
    fn test_invariants_across_operation_sequence() {
        let mut table = table_with(8);
        table.group_as_superset(&[0, 1, 2]).unwrap();
        assert_invariants(&table);
        table.group_as_superset(&[6, 7]).unwrap();
        assert_invariants(&table);
        table.move_row(5, 6);
        assert_invariants(&table);
        table.remove_rows(&[1]);
        assert_invariants(&table);
        table.insert_row(0, exec_row(99, "new"));
        assert_invariants(&table);
        table.ungroup_superset(1);
        assert_invariants(&table);
        for numb in table.superset_numbers() {
            table.ungroup_superset(numb);
            assert_invariants(&table);
        }
    }

    #[test]
    fn test_workout_time_delegates() {
        let table = table_with(1); // 3 * (10*3 + 2*60) = 570 sec
        assert_eq!(table.workout_time_minutes(), 9);
    }
}
