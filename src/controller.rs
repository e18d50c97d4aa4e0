//! Board controller: the single owner of the current [`BoardState`].
//!
//! Local mutations happen synchronously under a short lock. Backend writes go
//! through a per-board queue so they reach the backend in the order the user
//! made them, and each move's rollback only touches that move.

use crate::board::engine::{AppliedMove, apply_move, preview_move};
use crate::board::reconcile::{Reconciliation, commit_or_rollback};
use crate::board::{BoardState, MoveIntent};
use crate::config::{Config, SyncConfig};
use crate::error::{BackendError, ControllerError, MoveError};
use crate::filters::TaskFilter;
use crate::gesture::{DragEvent, GestureInterpreter, GestureOutput};
use crate::sync::BoardBackend;
use crate::types::{Column, NewTask, Task, TaskUpdate};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

struct Inner {
    /// Board as last confirmed locally. Previews are never written here.
    state: Option<BoardState>,
    gesture: GestureInterpreter,
    /// Live same-column reorder of the dragged task, shown on top of `state`.
    preview: Option<MoveIntent>,
}

impl Inner {
    /// `state` with the live preview applied, at the same version.
    fn displayed(&self) -> Option<BoardState> {
        let state = self.state.as_ref()?;
        let shown = self
            .preview
            .as_ref()
            .and_then(|intent| preview_move(state, intent).ok())
            .map(|mut previewed| {
                previewed.version = state.version;
                previewed
            });
        Some(shown.unwrap_or_else(|| state.clone()))
    }
}

/// Drives one open board for one user.
pub struct BoardController {
    backend: Arc<dyn BoardBackend>,
    user_id: String,
    inner: Mutex<Inner>,
    persist_queue: tokio::sync::Mutex<()>,
    sync: SyncConfig,
}

impl BoardController {
    pub fn new(backend: Arc<dyn BoardBackend>, user_id: impl Into<String>, config: &Config) -> Self {
        Self {
            backend,
            user_id: user_id.into(),
            inner: Mutex::new(Inner {
                state: None,
                gesture: GestureInterpreter::new(config.drag.activation_distance_px),
                preview: None,
            }),
            persist_queue: tokio::sync::Mutex::new(()),
            sync: config.sync.clone(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // State is only ever replaced wholesale, so a poisoned guard still holds a valid board.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch a board from the backend and make it current.
    pub async fn load(&self, board_id: &str) -> Result<BoardState, BackendError> {
        let loaded = self
            .backend
            .get_board_with_columns_and_tasks(board_id)
            .await?;

        let mut inner = self.lock();
        let version = inner.state.as_ref().map_or(0, |s| s.version + 1);
        let state = BoardState::from_loaded(loaded, version);
        info!(
            board_id = %state.board.id,
            columns = state.columns.len(),
            tasks = state.task_count(),
            "Board loaded"
        );
        inner.state = Some(state.clone());
        inner.gesture.reset();
        inner.preview = None;
        Ok(state)
    }

    /// Snapshot of the current board, including any live drag preview.
    pub fn state(&self) -> Option<BoardState> {
        self.lock().displayed()
    }

    /// Current board with tasks not matching `filter` hidden.
    pub fn filtered(&self, filter: &TaskFilter) -> Option<BoardState> {
        self.lock().displayed().map(|s| filter.apply(&s))
    }

    /// Feed one gesture event.
    ///
    /// Provisional intents only change what [`Self::state`] shows. A final
    /// intent is applied to the confirmed board and persisted; on persistence
    /// failure that move is rolled back and `PersistenceFailure` is returned.
    /// Ending a drag without a move drops the preview, so anything confirmed
    /// or reverted while the drag was open stays as it is.
    pub async fn handle_drag(&self, event: DragEvent) -> Result<GestureOutput, MoveError> {
        let (applied, output) = {
            let mut inner = self.lock();
            let Some(shown) = inner.displayed() else {
                return Err(MoveError::BoardNotLoaded);
            };
            let output = inner.gesture.handle(event, &shown);

            let intent = match &output {
                GestureOutput::Nothing => return Ok(output),
                GestureOutput::Provisional { intent } => {
                    // Previews that fail to resolve are dropped silently.
                    if inner
                        .state
                        .as_ref()
                        .is_some_and(|s| preview_move(s, intent).is_ok())
                    {
                        inner.preview = Some(intent.clone());
                    }
                    return Ok(output);
                }
                GestureOutput::Started { .. }
                | GestureOutput::NoOp { .. }
                | GestureOutput::Cancelled { .. } => {
                    inner.preview = None;
                    return Ok(output);
                }
                GestureOutput::Final { intent } => intent,
            };

            inner.preview = None;
            let Some(current) = inner.state.as_ref() else {
                return Err(MoveError::BoardNotLoaded);
            };
            // The index is relative to the column without the dragged task, so
            // it means the same on the confirmed board as on the preview.
            let applied = apply_move(current, intent)?;
            inner.state = Some(applied.state.clone());
            (applied, output)
        };

        self.persist(applied).await?;
        Ok(output)
    }

    /// Move a task outside of a gesture, e.g. from a keyboard shortcut or API.
    pub async fn move_task(&self, intent: &MoveIntent) -> Result<BoardState, MoveError> {
        let applied = {
            let mut inner = self.lock();
            let current = inner.state.as_ref().ok_or(MoveError::BoardNotLoaded)?;
            let applied = apply_move(current, intent)?;
            inner.state = Some(applied.state.clone());
            applied
        };
        self.persist(applied).await
    }

    /// Persist an already-applied move and reconcile with the backend's answer.
    async fn persist(&self, applied: AppliedMove) -> Result<BoardState, MoveError> {
        if applied.is_noop() {
            debug!(task_id = %applied.intent.task_id, "Move leaves board unchanged, not persisting");
            return Ok(applied.state);
        }

        let _queued = self.persist_queue.lock().await;
        let outcome = self
            .backend
            .persist_move(
                &applied.intent.task_id,
                &applied.destination.column_id,
                applied.destination.index,
            )
            .await;

        let committed_version = {
            let mut inner = self.lock();
            let Some(current) = inner.state.as_ref() else {
                return Err(MoveError::BoardNotLoaded);
            };
            let reconciliation = commit_or_rollback(current, &applied, outcome);
            let version = current.version;
            match reconciliation {
                Reconciliation::Committed => version,
                Reconciliation::RolledBack { state, error }
                | Reconciliation::Reverted { state, error } => {
                    warn!(
                        task_id = %applied.intent.task_id,
                        column_id = %applied.destination.column_id,
                        index = applied.destination.index,
                        error = %error,
                        "Move failed to persist, rolled back"
                    );
                    inner.state = Some(state);
                    return Err(error);
                }
            }
        };

        debug!(
            task_id = %applied.intent.task_id,
            column_id = %applied.destination.column_id,
            index = applied.destination.index,
            "Move persisted"
        );

        if self.sync.reconcile_on_success {
            self.refresh_if_unchanged(&applied.state.board.id, committed_version)
                .await;
        }
        Ok(self.state().unwrap_or(applied.state))
    }

    /// Replace local state with server truth unless something changed locally
    /// since `version`.
    async fn refresh_if_unchanged(&self, board_id: &str, version: u64) {
        let loaded = match self.backend.get_board_with_columns_and_tasks(board_id).await {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(board_id = %board_id, error = %e, "Reconcile fetch failed, keeping local board");
                return;
            }
        };

        let mut inner = self.lock();
        match inner.state.as_ref() {
            Some(current) if current.version == version => {
                inner.state = Some(BoardState::from_loaded(loaded, version + 1));
            }
            _ => debug!(board_id = %board_id, "Board changed during reconcile, keeping local board"),
        }
    }

    fn current_board_id(&self) -> Result<String, ControllerError> {
        self.lock()
            .state
            .as_ref()
            .map(|s| s.board.id.clone())
            .ok_or(ControllerError::BoardNotLoaded)
    }

    /// Apply a backend-confirmed change to whatever the board is now.
    fn update_state(&self, change: impl FnOnce(&BoardState) -> BoardState) {
        let mut inner = self.lock();
        if let Some(current) = inner.state.as_ref() {
            inner.state = Some(change(current));
        }
    }

    /// Create a task at the end of a column.
    pub async fn create_task(&self, column_id: &str, fields: NewTask) -> Result<Task, ControllerError> {
        self.current_board_id()?;
        let _queued = self.persist_queue.lock().await;
        let task = self.backend.create_task(column_id, fields).await?;
        self.update_state(|s| s.with_task_added(task.clone()));
        Ok(task)
    }

    pub async fn update_task(&self, task_id: &str, fields: TaskUpdate) -> Result<Task, ControllerError> {
        self.current_board_id()?;
        let _queued = self.persist_queue.lock().await;
        let task = self.backend.update_task(task_id, fields).await?;
        self.update_state(|s| s.with_task_replaced(task.clone()));
        Ok(task)
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<(), ControllerError> {
        self.current_board_id()?;
        let _queued = self.persist_queue.lock().await;
        self.backend.delete_task(task_id).await?;
        self.update_state(|s| s.with_task_removed(task_id));
        Ok(())
    }

    /// Append a column to the current board.
    pub async fn create_column(&self, title: &str) -> Result<Column, ControllerError> {
        let board_id = self.current_board_id()?;
        let _queued = self.persist_queue.lock().await;
        let column = self
            .backend
            .create_column(&board_id, &self.user_id, title)
            .await?;
        self.update_state(|s| s.with_column_added(column.clone()));
        Ok(column)
    }

    pub async fn rename_column(&self, column_id: &str, title: &str) -> Result<Column, ControllerError> {
        self.current_board_id()?;
        let _queued = self.persist_queue.lock().await;
        let column = self.backend.update_column_title(column_id, title).await?;
        self.update_state(|s| s.with_column_renamed(&column.id, &column.title));
        Ok(column)
    }

    pub async fn delete_column(&self, column_id: &str) -> Result<(), ControllerError> {
        self.current_board_id()?;
        let _queued = self.persist_queue.lock().await;
        self.backend.delete_column(column_id).await?;
        self.update_state(|s| s.with_column_removed(column_id));
        Ok(())
    }
}
