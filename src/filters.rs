//! Task and board filters.
//!
//! Filters only hide items. They never reorder what they keep, so a filtered
//! board can still be read as positions in the unfiltered one.

use crate::board::BoardState;
use crate::types::{Board, Priority, Task};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Criteria for tasks on a board. Empty sets match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    #[serde(default)]
    pub priorities: HashSet<Priority>,
    #[serde(default)]
    pub assignees: HashSet<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if !self.priorities.is_empty() && !self.priorities.contains(&task.priority) {
            return false;
        }
        if !self.assignees.is_empty() {
            match task.assignee.as_deref() {
                Some(assignee) if self.assignees.contains(assignee) => {}
                _ => return false,
            }
        }
        // Tasks without a due date are not excluded by a date filter.
        match (self.due_date, task.due_date) {
            (Some(wanted), Some(due)) => wanted == due,
            _ => true,
        }
    }

    /// Number of criteria currently set.
    pub fn active_count(&self) -> usize {
        usize::from(!self.priorities.is_empty())
            + usize::from(!self.assignees.is_empty())
            + usize::from(self.due_date.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Copy of `state` with non-matching tasks removed. Columns and version
    /// are kept.
    pub fn apply(&self, state: &BoardState) -> BoardState {
        let mut filtered = state.clone();
        if self.is_empty() {
            return filtered;
        }
        for column in &mut filtered.columns {
            column.tasks.retain(|task| self.matches(task));
        }
        filtered
    }
}

/// Criteria for a user's board list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardFilter {
    /// Case-insensitive substring of the title.
    #[serde(default)]
    pub search: Option<String>,
    /// Inclusive lower bound on the creation date (UTC).
    #[serde(default)]
    pub created_from: Option<NaiveDate>,
    /// Inclusive upper bound on the creation date (UTC).
    #[serde(default)]
    pub created_to: Option<NaiveDate>,
}

impl BoardFilter {
    pub fn matches(&self, board: &Board) -> bool {
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
            && !board.title.to_lowercase().contains(&search.to_lowercase())
        {
            return false;
        }

        if self.created_from.is_none() && self.created_to.is_none() {
            return true;
        }
        let Some(created) = DateTime::from_timestamp_millis(board.created_at) else {
            return false;
        };
        let created = created.date_naive();
        self.created_from.is_none_or(|from| created >= from)
            && self.created_to.is_none_or(|to| created <= to)
    }

    pub fn apply(&self, boards: Vec<Board>) -> Vec<Board> {
        boards.into_iter().filter(|b| self.matches(b)).collect()
    }
}
