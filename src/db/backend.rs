//! [`BoardBackend`] over the local SQLite database.

use super::Database;
use crate::config::BoardsConfig;
use crate::error::{BackendError, BackendResult};
use crate::sync::BoardBackend;
use crate::types::{
    Board, BoardUpdate, BoardWithColumns, Column, NewBoard, NewTask, Task, TaskUpdate,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Persists board changes through a shared [`Database`] handle.
#[derive(Clone)]
pub struct SqliteBackend {
    db: Arc<Database>,
    boards: BoardsConfig,
}

impl SqliteBackend {
    pub fn new(db: Arc<Database>, boards: BoardsConfig) -> Self {
        Self { db, boards }
    }

    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }

    /// Run a blocking database call off the async executor.
    async fn run<T, F>(&self, f: F) -> BackendResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| BackendError::Storage(anyhow::anyhow!("database task failed: {}", e)))?
            .map_err(BackendError::from)
    }
}

#[async_trait]
impl BoardBackend for SqliteBackend {
    async fn persist_move(&self, task_id: &str, column_id: &str, index: usize) -> BackendResult<()> {
        let (task_id, column_id) = (task_id.to_string(), column_id.to_string());
        self.run(move |db| db.move_task(&task_id, &column_id, index))
            .await
    }

    async fn create_task(&self, column_id: &str, fields: NewTask) -> BackendResult<Task> {
        let column_id = column_id.to_string();
        self.run(move |db| db.create_task(&column_id, fields)).await
    }

    async fn update_task(&self, task_id: &str, fields: TaskUpdate) -> BackendResult<Task> {
        let task_id = task_id.to_string();
        self.run(move |db| db.update_task(&task_id, fields)).await
    }

    async fn delete_task(&self, task_id: &str) -> BackendResult<()> {
        let task_id = task_id.to_string();
        self.run(move |db| db.delete_task(&task_id)).await
    }

    async fn create_column(&self, board_id: &str, user_id: &str, title: &str) -> BackendResult<Column> {
        let (board_id, user_id, title) = (board_id.to_string(), user_id.to_string(), title.to_string());
        self.run(move |db| db.create_column(&board_id, &user_id, &title))
            .await
    }

    async fn update_column_title(&self, column_id: &str, title: &str) -> BackendResult<Column> {
        let (column_id, title) = (column_id.to_string(), title.to_string());
        self.run(move |db| db.update_column_title(&column_id, &title))
            .await
    }

    async fn delete_column(&self, column_id: &str) -> BackendResult<()> {
        let column_id = column_id.to_string();
        self.run(move |db| db.delete_column(&column_id)).await
    }

    async fn get_board_with_columns_and_tasks(&self, board_id: &str) -> BackendResult<BoardWithColumns> {
        let board_id = board_id.to_string();
        self.run(move |db| db.get_board_with_columns(&board_id))
            .await
    }

    async fn create_board(&self, user_id: &str, fields: NewBoard) -> BackendResult<BoardWithColumns> {
        let user_id = user_id.to_string();
        let defaults = self.boards.clone();
        self.run(move |db| db.create_board(&user_id, fields, &defaults))
            .await
    }

    async fn list_boards(&self, user_id: &str) -> BackendResult<Vec<Board>> {
        let user_id = user_id.to_string();
        self.run(move |db| db.list_boards(&user_id)).await
    }

    async fn update_board(&self, board_id: &str, fields: BoardUpdate) -> BackendResult<Board> {
        let board_id = board_id.to_string();
        self.run(move |db| db.update_board(&board_id, fields)).await
    }

    async fn delete_board(&self, board_id: &str) -> BackendResult<()> {
        let board_id = board_id.to_string();
        self.run(move |db| db.delete_board(&board_id)).await
    }
}
