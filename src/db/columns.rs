//! Column CRUD.

use super::{Database, new_id, now_ms, require_title};
use crate::error::BackendError;
use crate::types::Column;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

pub fn parse_column_row(row: &Row) -> rusqlite::Result<Column> {
    Ok(Column {
        id: row.get("id")?,
        title: row.get("title")?,
        board_id: row.get("board_id")?,
        sort_order: row.get("sort_order")?,
        user_id: row.get("user_id")?,
        created_at: row.get("created_at")?,
    })
}

pub(crate) fn insert_column(
    conn: &Connection,
    board_id: &str,
    user_id: &str,
    title: &str,
    sort_order: i32,
    now: i64,
) -> Result<Column> {
    let column = Column {
        id: new_id(),
        title: title.to_string(),
        board_id: board_id.to_string(),
        sort_order,
        user_id: user_id.to_string(),
        created_at: now,
    };
    conn.execute(
        "INSERT INTO board_columns (id, board_id, title, sort_order, user_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            column.id,
            column.board_id,
            column.title,
            column.sort_order,
            column.user_id,
            column.created_at
        ],
    )?;
    Ok(column)
}

pub(crate) fn get_column_internal(conn: &Connection, column_id: &str) -> Result<Option<Column>> {
    let column = conn
        .query_row(
            "SELECT * FROM board_columns WHERE id = ?1",
            params![column_id],
            parse_column_row,
        )
        .optional()?;
    Ok(column)
}

pub(crate) fn list_columns_internal(conn: &Connection, board_id: &str) -> Result<Vec<Column>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM board_columns WHERE board_id = ?1 ORDER BY sort_order ASC, created_at ASC",
    )?;
    let columns = stmt
        .query_map(params![board_id], parse_column_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

/// Rewrite column ranks on a board to 0..n, keeping their current order.
fn renumber_columns(conn: &Connection, board_id: &str) -> Result<()> {
    let columns = list_columns_internal(conn, board_id)?;
    for (rank, column) in columns.iter().enumerate() {
        if column.sort_order != rank as i32 {
            conn.execute(
                "UPDATE board_columns SET sort_order = ?1 WHERE id = ?2",
                params![rank as i32, column.id],
            )?;
        }
    }
    Ok(())
}

pub(super) fn touch_board(conn: &Connection, board_id: &str) -> Result<()> {
    conn.execute(
        "UPDATE boards SET updated_at = ?1 WHERE id = ?2",
        params![now_ms(), board_id],
    )?;
    Ok(())
}

impl Database {
    /// Append a column to a board. Its rank is the board's current column count.
    pub fn create_column(&self, board_id: &str, user_id: &str, title: &str) -> Result<Column> {
        let title = require_title(title)?;
        self.with_conn(|conn| {
            if super::boards::get_board_internal(conn, board_id)?.is_none() {
                return Err(BackendError::not_found("board", board_id).into());
            }
            let count: i32 = conn.query_row(
                "SELECT COUNT(*) FROM board_columns WHERE board_id = ?1",
                params![board_id],
                |row| row.get(0),
            )?;
            let column = insert_column(conn, board_id, user_id, &title, count, now_ms())?;
            touch_board(conn, board_id)?;
            Ok(column)
        })
    }

    pub fn get_column(&self, column_id: &str) -> Result<Option<Column>> {
        self.with_conn(|conn| get_column_internal(conn, column_id))
    }

    pub fn update_column_title(&self, column_id: &str, title: &str) -> Result<Column> {
        let title = require_title(title)?;
        self.with_conn(|conn| {
            let mut column = get_column_internal(conn, column_id)?
                .ok_or_else(|| BackendError::not_found("column", column_id))?;
            conn.execute(
                "UPDATE board_columns SET title = ?1 WHERE id = ?2",
                params![title, column_id],
            )?;
            touch_board(conn, &column.board_id)?;
            column.title = title;
            Ok(column)
        })
    }

    /// Delete a column and its tasks, then close the gap in column ranks.
    pub fn delete_column(&self, column_id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let column = get_column_internal(&tx, column_id)?
                .ok_or_else(|| BackendError::not_found("column", column_id))?;
            tx.execute(
                "DELETE FROM board_columns WHERE id = ?1",
                params![column_id],
            )?;
            renumber_columns(&tx, &column.board_id)?;
            touch_board(&tx, &column.board_id)?;
            tx.commit()?;
            Ok(())
        })
    }

    /// Owner of the board a column belongs to.
    pub fn column_owner(&self, column_id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let owner = conn
                .query_row(
                    "SELECT b.user_id FROM board_columns c
                     JOIN boards b ON b.id = c.board_id
                     WHERE c.id = ?1",
                    params![column_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(owner)
        })
    }
}
