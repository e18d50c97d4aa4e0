//! Optimistic mutation engine.
//!
//! Applies a move to local state synchronously, before the backend has seen
//! it. Nothing here performs I/O.

use super::ordering::{column_index, locate, relocate, renumber};
use super::{BoardState, MoveIntent, TaskPosition};
use crate::error::MoveError;

/// Result of applying a move locally.
#[derive(Debug, Clone)]
pub struct AppliedMove {
    pub intent: MoveIntent,
    /// State before the move, used for rollback.
    pub snapshot: BoardState,
    /// State after the move. This becomes the visible board immediately.
    pub state: BoardState,
    /// Where the task was in `snapshot`.
    pub origin: TaskPosition,
    /// Where the task is in `state`.
    pub destination: TaskPosition,
}

impl AppliedMove {
    /// True when the move leaves the board as it was in `snapshot`.
    pub fn is_noop(&self) -> bool {
        self.state == self.snapshot
    }
}

/// Apply `intent` to `state`.
///
/// 1. snapshot the state
/// 2. locate the source column (`TaskNotFound` if no column holds the task)
/// 3. remove the task from its sequence
/// 4. insert it into the target column at `clamp(index, 0, len)`
/// 5. renumber the affected columns
///
/// The input is left untouched; the returned state carries the next version.
pub fn apply_move(state: &BoardState, intent: &MoveIntent) -> Result<AppliedMove, MoveError> {
    let (from_column, from_index) = locate(&state.columns, &intent.task_id)
        .ok_or_else(|| MoveError::TaskNotFound(intent.task_id.clone()))?;
    let to_column = column_index(&state.columns, &intent.column_id)
        .ok_or_else(|| MoveError::ColumnNotFound(intent.column_id.clone()))?;

    let mut next = state.next_version();
    let landed = relocate(
        &mut next.columns,
        (from_column, from_index),
        to_column,
        intent.index,
    );
    renumber(&mut next.columns[from_column]);
    if to_column != from_column {
        renumber(&mut next.columns[to_column]);
    }

    Ok(AppliedMove {
        intent: intent.clone(),
        origin: TaskPosition {
            column_id: state.columns[from_column].column.id.clone(),
            index: from_index,
        },
        destination: TaskPosition {
            column_id: intent.column_id.clone(),
            index: landed,
        },
        snapshot: state.clone(),
        state: next,
    })
}

/// Apply a provisional (live feedback) move. Same transform as
/// [`apply_move`] without keeping a snapshot.
pub fn preview_move(state: &BoardState, intent: &MoveIntent) -> Result<BoardState, MoveError> {
    apply_move(state, intent).map(|applied| applied.state)
}
