//! Board CRUD and full-board loads.

use super::{Database, new_id, now_ms, require_title};
use crate::board::ordering::sort_by_rank;
use crate::config::BoardsConfig;
use crate::error::BackendError;
use crate::types::{Board, BoardUpdate, BoardWithColumns, ColumnWithTasks, NewBoard, Task};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;

/// Boards updated within this window count as recently active.
const RECENT_ACTIVITY_MS: i64 = 7 * 24 * 60 * 60 * 1000;

pub fn parse_board_row(row: &Row) -> rusqlite::Result<Board> {
    Ok(Board {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        color: row.get("color")?,
        user_id: row.get("user_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn get_board_internal(conn: &Connection, board_id: &str) -> Result<Option<Board>> {
    let board = conn
        .query_row(
            "SELECT * FROM boards WHERE id = ?1",
            params![board_id],
            parse_board_row,
        )
        .optional()?;
    Ok(board)
}

/// One board with its size, for the CLI listing.
#[derive(Debug, Clone, Serialize)]
pub struct BoardOverview {
    #[serde(flatten)]
    pub board: Board,
    pub column_count: i64,
    pub task_count: i64,
}

/// Per-user totals across all boards.
#[derive(Debug, Clone, Serialize)]
pub struct BoardSummary {
    pub boards: Vec<BoardOverview>,
    pub total_tasks: i64,
    pub recently_active: usize,
}

impl Database {
    /// Create a board and its default columns in one transaction.
    pub fn create_board(
        &self,
        user_id: &str,
        fields: NewBoard,
        defaults: &BoardsConfig,
    ) -> Result<BoardWithColumns> {
        let title = require_title(&fields.title)?;
        let color = fields
            .color
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| defaults.default_color.clone());
        let now = now_ms();
        let board = Board {
            id: new_id(),
            title,
            description: fields.description,
            color,
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO boards (id, title, description, color, user_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    board.id,
                    board.title,
                    board.description,
                    board.color,
                    board.user_id,
                    board.created_at,
                    board.updated_at
                ],
            )?;

            let mut columns = Vec::with_capacity(defaults.default_columns.len());
            for (rank, title) in defaults.default_columns.iter().enumerate() {
                let column = super::columns::insert_column(
                    &tx,
                    &board.id,
                    user_id,
                    title,
                    rank as i32,
                    now,
                )?;
                columns.push(ColumnWithTasks::new(column));
            }
            tx.commit()?;

            Ok(BoardWithColumns {
                board: board.clone(),
                columns,
            })
        })
    }

    pub fn get_board(&self, board_id: &str) -> Result<Option<Board>> {
        self.with_conn(|conn| get_board_internal(conn, board_id))
    }

    /// Boards owned by a user, newest first.
    pub fn list_boards(&self, user_id: &str) -> Result<Vec<Board>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM boards WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
            )?;
            let boards = stmt
                .query_map(params![user_id], parse_board_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(boards)
        })
    }

    pub fn update_board(&self, board_id: &str, fields: BoardUpdate) -> Result<Board> {
        let title = fields.title.as_deref().map(require_title).transpose()?;

        self.with_conn(|conn| {
            let mut board = get_board_internal(conn, board_id)?
                .ok_or_else(|| BackendError::not_found("board", board_id))?;

            if let Some(title) = title {
                board.title = title;
            }
            if let Some(description) = fields.description {
                board.description = description;
            }
            if let Some(color) = fields.color.filter(|c| !c.trim().is_empty()) {
                board.color = color;
            }
            board.updated_at = now_ms();

            conn.execute(
                "UPDATE boards SET title = ?1, description = ?2, color = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![
                    board.title,
                    board.description,
                    board.color,
                    board.updated_at,
                    board.id
                ],
            )?;
            Ok(board)
        })
    }

    /// Delete a board. Columns and tasks go with it via ON DELETE CASCADE.
    pub fn delete_board(&self, board_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM boards WHERE id = ?1", params![board_id])?;
            if deleted == 0 {
                return Err(BackendError::not_found("board", board_id).into());
            }
            Ok(())
        })
    }

    /// Load a board with all columns and tasks, in rank order.
    pub fn get_board_with_columns(&self, board_id: &str) -> Result<BoardWithColumns> {
        self.with_conn(|conn| {
            let board = get_board_internal(conn, board_id)?
                .ok_or_else(|| BackendError::not_found("board", board_id))?;

            let mut columns: Vec<ColumnWithTasks> =
                super::columns::list_columns_internal(conn, board_id)?
                    .into_iter()
                    .map(ColumnWithTasks::new)
                    .collect();

            for task in super::tasks::list_board_tasks_internal(conn, board_id)? {
                if let Some(column) = columns.iter_mut().find(|c| c.column.id == task.column_id) {
                    column.tasks.push(task);
                }
            }

            Ok(BoardWithColumns { board, columns })
        })
    }

    /// Recreate a board from a snapshot under `user_id`.
    ///
    /// Board, columns and tasks get fresh ids so a snapshot can be imported
    /// next to the board it came from. Ranks are rewritten from the snapshot's
    /// order. Returns the stored board.
    pub fn import_board(&self, user_id: &str, source: &BoardWithColumns) -> Result<BoardWithColumns> {
        let title = require_title(&source.board.title)?;
        let mut columns = source.columns.clone();
        sort_by_rank(&mut columns);

        let now = now_ms();
        let board = Board {
            id: new_id(),
            title,
            description: source.board.description.clone(),
            color: source.board.color.clone(),
            user_id: user_id.to_string(),
            created_at: source.board.created_at,
            updated_at: now,
        };

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO boards (id, title, description, color, user_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    board.id,
                    board.title,
                    board.description,
                    board.color,
                    board.user_id,
                    board.created_at,
                    board.updated_at
                ],
            )?;

            for (rank, column) in columns.iter().enumerate() {
                let stored = super::columns::insert_column(
                    &tx,
                    &board.id,
                    user_id,
                    &column.column.title,
                    rank as i32,
                    column.column.created_at,
                )?;
                for (index, task) in column.tasks.iter().enumerate() {
                    let task = Task {
                        id: new_id(),
                        column_id: stored.id.clone(),
                        sort_order: index as i32,
                        ..task.clone()
                    };
                    super::tasks::insert_task(&tx, &task)?;
                }
            }
            tx.commit()?;
            Ok(())
        })?;

        tracing::info!(
            board_id = %board.id,
            source_board_id = %source.board.id,
            columns = columns.len(),
            "Board imported"
        );
        self.get_board_with_columns(&board.id)
    }

    /// Who owns a board.
    pub fn board_owner(&self, board_id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let owner = conn
                .query_row(
                    "SELECT user_id FROM boards WHERE id = ?1",
                    params![board_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(owner)
        })
    }

    /// Board counts and task totals for a user.
    pub fn board_summary(&self, user_id: &str, now: i64) -> Result<BoardSummary> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT b.*,
                        (SELECT COUNT(*) FROM board_columns c WHERE c.board_id = b.id) AS column_count,
                        (SELECT COUNT(*) FROM tasks t
                           JOIN board_columns c ON c.id = t.column_id
                          WHERE c.board_id = b.id) AS task_count
                 FROM boards b
                 WHERE b.user_id = ?1
                 ORDER BY b.created_at DESC, b.id DESC",
            )?;
            let boards = stmt
                .query_map(params![user_id], |row| {
                    Ok(BoardOverview {
                        board: parse_board_row(row)?,
                        column_count: row.get("column_count")?,
                        task_count: row.get("task_count")?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            let total_tasks = boards.iter().map(|b| b.task_count).sum();
            let recently_active = boards
                .iter()
                .filter(|b| now - b.board.updated_at < RECENT_ACTIVITY_MS)
                .count();

            Ok(BoardSummary {
                boards,
                total_tasks,
                recently_active,
            })
        })
    }
}
