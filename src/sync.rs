//! Remote persistence boundary.
//!
//! The board engine only knows this trait. [`crate::db::SqliteBackend`] is the
//! bundled implementation; anything that can store boards (a remote API, a
//! test double) can stand in for it.

use crate::error::BackendResult;
use crate::types::{
    Board, BoardUpdate, BoardWithColumns, Column, NewBoard, NewTask, Task, TaskUpdate,
};
use async_trait::async_trait;

#[async_trait]
pub trait BoardBackend: Send + Sync {
    /// Store that `task_id` now lives in `column_id` at `index`.
    ///
    /// `index` has the same meaning as in [`crate::board::MoveIntent`]: the
    /// position after removal from the current column, clamped to the
    /// column length. On success the stored ranks of every affected column
    /// match the client's projection.
    async fn persist_move(&self, task_id: &str, column_id: &str, index: usize) -> BackendResult<()>;

    /// Create a task at the end of a column.
    async fn create_task(&self, column_id: &str, fields: NewTask) -> BackendResult<Task>;

    async fn update_task(&self, task_id: &str, fields: TaskUpdate) -> BackendResult<Task>;

    async fn delete_task(&self, task_id: &str) -> BackendResult<()>;

    /// Create a column at the right end of a board.
    async fn create_column(&self, board_id: &str, user_id: &str, title: &str) -> BackendResult<Column>;

    async fn update_column_title(&self, column_id: &str, title: &str) -> BackendResult<Column>;

    /// Delete a column and its tasks.
    async fn delete_column(&self, column_id: &str) -> BackendResult<()>;

    async fn get_board_with_columns_and_tasks(&self, board_id: &str) -> BackendResult<BoardWithColumns>;

    /// Create a board with the configured default columns.
    async fn create_board(&self, user_id: &str, fields: NewBoard) -> BackendResult<BoardWithColumns>;

    /// Boards owned by a user, newest first.
    async fn list_boards(&self, user_id: &str) -> BackendResult<Vec<Board>>;

    async fn update_board(&self, board_id: &str, fields: BoardUpdate) -> BackendResult<Board>;

    /// Delete a board with all its columns and tasks.
    async fn delete_board(&self, board_id: &str) -> BackendResult<()>;
}
