//! In-memory board state and the optimistic move pipeline.
//!
//! The client holds exactly one [`BoardState`] per open board. It is an owned,
//! versioned value: the pure functions in [`engine`] and [`reconcile`] take a
//! state and return a new one, and [`crate::controller::BoardController`]
//! decides which instance is current.
//!
//! Pipeline for a drop:
//! 1. [`engine::apply_move`] snapshots the state and applies the move locally.
//! 2. The backend persists the move (async, may fail).
//! 3. [`reconcile::commit_or_rollback`] keeps the projection or restores the
//!    snapshot.

pub mod engine;
pub mod ordering;
pub mod reconcile;

use crate::types::{Board, BoardWithColumns, Column, ColumnWithTasks, Task};
use serde::{Deserialize, Serialize};

/// Local projection of a board.
///
/// `version` increases on every local mutation so that reconciliation can
/// tell whether anything else changed while a move was in flight. Equality
/// ignores `version` and compares board content only.
#[derive(Debug, Clone, Serialize)]
pub struct BoardState {
    pub board: Board,
    pub columns: Vec<ColumnWithTasks>,
    pub version: u64,
}

impl PartialEq for BoardState {
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board && self.columns == other.columns
    }
}

impl Eq for BoardState {}

impl BoardState {
    /// Build a state from a full backend load. Columns and tasks are put in
    /// rank order; ties fall back to creation time.
    pub fn from_loaded(loaded: BoardWithColumns, version: u64) -> Self {
        let mut columns = loaded.columns;
        ordering::sort_by_rank(&mut columns);
        Self {
            board: loaded.board,
            columns,
            version,
        }
    }

    pub fn column(&self, column_id: &str) -> Option<&ColumnWithTasks> {
        self.columns.iter().find(|c| c.column.id == column_id)
    }

    pub fn column_mut(&mut self, column_id: &str) -> Option<&mut ColumnWithTasks> {
        self.columns.iter_mut().find(|c| c.column.id == column_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.columns
            .iter()
            .flat_map(|c| c.tasks.iter())
            .find(|t| t.id == task_id)
    }

    /// Current position of a task, if it is on this board.
    pub fn position_of(&self, task_id: &str) -> Option<TaskPosition> {
        ordering::locate(&self.columns, task_id).map(|(col, idx)| TaskPosition {
            column_id: self.columns[col].column.id.clone(),
            index: idx,
        })
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }

    /// Copy of this state marked as the next version.
    pub(crate) fn next_version(&self) -> Self {
        let mut next = self.clone();
        next.version = self.version + 1;
        next
    }

    /// Append a task the backend just created. Unknown columns are ignored.
    pub fn with_task_added(&self, task: Task) -> Self {
        let mut next = self.next_version();
        if let Some(column) = next.column_mut(&task.column_id) {
            column.tasks.push(task);
            ordering::renumber(column);
        }
        next
    }

    /// Replace a task's fields in place, keeping its position.
    pub fn with_task_replaced(&self, task: Task) -> Self {
        let mut next = self.next_version();
        if let Some((col, idx)) = ordering::locate(&next.columns, &task.id) {
            let slot = &mut next.columns[col].tasks[idx];
            let (column_id, sort_order) = (slot.column_id.clone(), slot.sort_order);
            *slot = Task {
                column_id,
                sort_order,
                ..task
            };
        }
        next
    }

    pub fn with_task_removed(&self, task_id: &str) -> Self {
        let mut next = self.next_version();
        if let Some((col, idx)) = ordering::locate(&next.columns, task_id) {
            next.columns[col].tasks.remove(idx);
            ordering::renumber(&mut next.columns[col]);
        }
        next
    }

    pub fn with_column_added(&self, column: Column) -> Self {
        let mut next = self.next_version();
        next.columns.push(ColumnWithTasks::new(column));
        ordering::renumber_columns(&mut next.columns);
        next
    }

    pub fn with_column_renamed(&self, column_id: &str, title: &str) -> Self {
        let mut next = self.next_version();
        if let Some(column) = next.column_mut(column_id) {
            column.column.title = title.to_string();
        }
        next
    }

    /// Drop a column with its tasks and close the gap in column ranks.
    pub fn with_column_removed(&self, column_id: &str) -> Self {
        let mut next = self.next_version();
        next.columns.retain(|c| c.column.id != column_id);
        ordering::renumber_columns(&mut next.columns);
        next
    }
}

/// Where a task sits: its column and its index in that column's sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPosition {
    pub column_id: String,
    pub index: usize,
}

/// A request to move one task to a column at an index.
///
/// The index is interpreted after the task has been removed from its current
/// column and is clamped to the target column's length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveIntent {
    pub task_id: String,
    pub column_id: String,
    pub index: usize,
}

impl MoveIntent {
    pub fn new(task_id: impl Into<String>, column_id: impl Into<String>, index: usize) -> Self {
        Self {
            task_id: task_id.into(),
            column_id: column_id.into(),
            index,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small boards shared by the unit tests in this module tree.

    use super::BoardState;
    use crate::types::{Board, Column, ColumnWithTasks, Priority, Task};

    pub fn task(id: &str, column_id: &str, sort_order: i32) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {}", id),
            column_id: column_id.to_string(),
            description: None,
            assignee: None,
            due_date: None,
            priority: Priority::Medium,
            sort_order,
            created_at: 0,
        }
    }

    pub fn column(id: &str, sort_order: i32, task_ids: &[&str]) -> ColumnWithTasks {
        ColumnWithTasks {
            column: Column {
                id: id.to_string(),
                title: id.to_uppercase(),
                board_id: "b1".to_string(),
                sort_order,
                user_id: "u1".to_string(),
                created_at: 0,
            },
            tasks: task_ids
                .iter()
                .enumerate()
                .map(|(i, t)| task(t, id, i as i32))
                .collect(),
        }
    }

    /// Column `a` = [t1, t2, t3], column `b` = [].
    pub fn board() -> BoardState {
        BoardState {
            board: Board {
                id: "b1".to_string(),
                title: "Board".to_string(),
                description: None,
                color: "#FFA239".to_string(),
                user_id: "u1".to_string(),
                created_at: 0,
                updated_at: 0,
            },
            columns: vec![column("a", 0, &["t1", "t2", "t3"]), column("b", 1, &[])],
            version: 0,
        }
    }

    pub fn ids(state: &BoardState, column_id: &str) -> Vec<String> {
        state
            .column(column_id)
            .map(|c| c.tasks.iter().map(|t| t.id.clone()).collect())
            .unwrap_or_default()
    }
}
