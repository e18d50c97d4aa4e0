//! Reconciliation and rollback after a persist attempt.

use super::engine::AppliedMove;
use super::ordering::{column_index, locate, relocate, renumber};
use super::BoardState;
use crate::error::{BackendError, MoveError};

/// What to do with the local board once the backend has answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Persisted. The optimistic projection stays current.
    Committed,
    /// Persist failed and nothing else changed the board meanwhile: the full
    /// pre-move snapshot is restored.
    RolledBack { state: BoardState, error: MoveError },
    /// Persist failed after later mutations were applied: only the failed
    /// task is put back where it was, later moves are preserved.
    Reverted { state: BoardState, error: MoveError },
}

impl Reconciliation {
    /// The state to install, if it changes.
    pub fn state(&self) -> Option<&BoardState> {
        match self {
            Reconciliation::Committed => None,
            Reconciliation::RolledBack { state, .. } | Reconciliation::Reverted { state, .. } => {
                Some(state)
            }
        }
    }

    pub fn error(&self) -> Option<&MoveError> {
        match self {
            Reconciliation::Committed => None,
            Reconciliation::RolledBack { error, .. } | Reconciliation::Reverted { error, .. } => {
                Some(error)
            }
        }
    }
}

/// Decide the outcome of a move given the backend's answer.
///
/// `current` is the board as it is now, which may be newer than
/// `applied.state` if other mutations landed while the persist was in flight.
/// Failures are never retried.
pub fn commit_or_rollback(
    current: &BoardState,
    applied: &AppliedMove,
    outcome: Result<(), BackendError>,
) -> Reconciliation {
    let reason = match outcome {
        Ok(()) => return Reconciliation::Committed,
        Err(e) => e.to_string(),
    };
    let error = MoveError::PersistenceFailure {
        task_id: applied.intent.task_id.clone(),
        reason,
    };

    if current.version == applied.state.version {
        let mut state = applied.snapshot.clone();
        state.version = current.version + 1;
        Reconciliation::RolledBack { state, error }
    } else {
        Reconciliation::Reverted {
            state: revert_task(current, applied),
            error,
        }
    }
}

/// Move only the failed task back to its origin in `current`.
///
/// If the task or its origin column no longer exist the board is left as is.
fn revert_task(current: &BoardState, applied: &AppliedMove) -> BoardState {
    let mut state = current.next_version();
    let Some(from) = locate(&state.columns, &applied.intent.task_id) else {
        return state;
    };
    let Some(to_column) = column_index(&state.columns, &applied.origin.column_id) else {
        return state;
    };

    relocate(&mut state.columns, from, to_column, applied.origin.index);
    renumber(&mut state.columns[from.0]);
    if to_column != from.0 {
        renumber(&mut state.columns[to_column]);
    }
    state
}
