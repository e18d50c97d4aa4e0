//! Ordering model.
//!
//! Sequence index is the source of truth for a task's rank while the board is
//! in memory. The persisted `sort_order` is a serialization of that index and
//! is re-derived for every column a move touches (full renumbering), so ranks
//! stay a dense `0..len` permutation.

use crate::types::{ColumnWithTasks, Task};

/// Find a task: `(column index, task index)`.
pub fn locate(columns: &[ColumnWithTasks], task_id: &str) -> Option<(usize, usize)> {
    columns.iter().enumerate().find_map(|(ci, column)| {
        column
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .map(|ti| (ci, ti))
    })
}

pub fn column_index(columns: &[ColumnWithTasks], column_id: &str) -> Option<usize> {
    columns.iter().position(|c| c.column.id == column_id)
}

/// Remove the task at `from` and insert it into column `to_column` at
/// `clamp(index, 0, len)`. Returns the index it landed on.
///
/// Callers must pass indices obtained from [`locate`] / [`column_index`].
pub fn relocate(
    columns: &mut [ColumnWithTasks],
    from: (usize, usize),
    to_column: usize,
    index: usize,
) -> usize {
    let (from_column, from_index) = from;
    let task = columns[from_column].tasks.remove(from_index);
    let target = &mut columns[to_column].tasks;
    let landed = index.min(target.len());
    target.insert(landed, task);
    landed
}

/// Re-derive `column_id` and `sort_order` of every task in a column from its
/// position in the sequence.
pub fn renumber(column: &mut ColumnWithTasks) {
    let column_id = column.column.id.clone();
    for (index, task) in column.tasks.iter_mut().enumerate() {
        task.sort_order = index as i32;
        if task.column_id != column_id {
            task.column_id = column_id.clone();
        }
    }
}

/// Re-derive column ranks from their position on the board.
pub fn renumber_columns(columns: &mut [ColumnWithTasks]) {
    for (index, column) in columns.iter_mut().enumerate() {
        column.column.sort_order = index as i32;
    }
}

/// True when task ranks are exactly `0..len` in sequence order.
pub fn is_dense(tasks: &[Task]) -> bool {
    tasks
        .iter()
        .enumerate()
        .all(|(index, task)| task.sort_order == index as i32)
}

/// Sort columns and their tasks by stored rank, then creation time.
pub fn sort_by_rank(columns: &mut [ColumnWithTasks]) {
    columns.sort_by_key(|c| (c.column.sort_order, c.column.created_at));
    for column in columns.iter_mut() {
        column.tasks.sort_by_key(|t| (t.sort_order, t.created_at));
    }
}
