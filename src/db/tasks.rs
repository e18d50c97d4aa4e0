//! Task CRUD and moves.
//!
//! Every write that changes a column's membership rewrites that column's
//! ranks to `0..n`, so stored `sort_order` always matches display order.

use super::columns::{get_column_internal, touch_board};
use super::{Database, new_id, now_ms, require_title};
use crate::error::BackendError;
use crate::types::{NewTask, Priority, Task, TaskUpdate};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    let priority: String = row.get("priority")?;
    let due_date: Option<String> = row.get("due_date")?;

    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        column_id: row.get("column_id")?,
        description: row.get("description")?,
        assignee: row.get("assignee")?,
        due_date: due_date.and_then(|s| NaiveDate::parse_from_str(&s, DUE_DATE_FORMAT).ok()),
        priority: priority.parse::<Priority>().unwrap_or_default(),
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
    })
}

fn format_due_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DUE_DATE_FORMAT).to_string())
}

fn get_task_internal(conn: &Connection, task_id: &str) -> Result<Option<Task>> {
    let task = conn
        .query_row(
            "SELECT * FROM tasks WHERE id = ?1",
            params![task_id],
            parse_task_row,
        )
        .optional()?;
    Ok(task)
}

/// Task ids of a column in rank order, optionally leaving one out.
fn column_sequence(conn: &Connection, column_id: &str, except: Option<&str>) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT id FROM tasks WHERE column_id = ?1 ORDER BY sort_order ASC, created_at ASC",
    )?;
    let ids = stmt
        .query_map(params![column_id], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ids
        .into_iter()
        .filter(|id| Some(id.as_str()) != except)
        .collect())
}

/// Store `ids` as the full content of `column_id`, ranked by position.
fn write_sequence(conn: &Connection, column_id: &str, ids: &[String]) -> Result<()> {
    let mut stmt =
        conn.prepare("UPDATE tasks SET column_id = ?1, sort_order = ?2 WHERE id = ?3")?;
    for (rank, id) in ids.iter().enumerate() {
        stmt.execute(params![column_id, rank as i32, id])?;
    }
    Ok(())
}

pub(crate) fn list_board_tasks_internal(conn: &Connection, board_id: &str) -> Result<Vec<Task>> {
    let mut stmt = conn.prepare(
        "SELECT t.* FROM tasks t
         JOIN board_columns c ON c.id = t.column_id
         WHERE c.board_id = ?1
         ORDER BY t.sort_order ASC, t.created_at ASC",
    )?;
    let tasks = stmt
        .query_map(params![board_id], parse_task_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tasks)
}

pub(crate) fn insert_task(conn: &Connection, task: &Task) -> Result<()> {
    conn.execute(
        "INSERT INTO tasks (id, column_id, title, description, assignee, due_date,
                            priority, sort_order, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            task.id,
            task.column_id,
            task.title,
            task.description,
            task.assignee,
            format_due_date(task.due_date),
            task.priority.as_str(),
            task.sort_order,
            task.created_at
        ],
    )?;
    Ok(())
}

/// Bump `updated_at` on the board that owns `column_id`.
fn touch_column_board(conn: &Connection, column_id: &str) -> Result<()> {
    conn.execute(
        "UPDATE boards SET updated_at = ?1
         WHERE id = (SELECT board_id FROM board_columns WHERE id = ?2)",
        params![now_ms(), column_id],
    )?;
    Ok(())
}

impl Database {
    /// Create a task at the end of a column. Its rank is the column's task count.
    pub fn create_task(&self, column_id: &str, fields: NewTask) -> Result<Task> {
        let title = require_title(&fields.title)?;

        self.with_conn(|conn| {
            let column = get_column_internal(conn, column_id)?
                .ok_or_else(|| BackendError::not_found("column", column_id))?;
            let count: i32 = conn.query_row(
                "SELECT COUNT(*) FROM tasks WHERE column_id = ?1",
                params![column_id],
                |row| row.get(0),
            )?;

            let task = Task {
                id: new_id(),
                title,
                column_id: column_id.to_string(),
                description: fields.description,
                assignee: fields.assignee,
                due_date: fields.due_date,
                priority: fields.priority.unwrap_or_default(),
                sort_order: count,
                created_at: now_ms(),
            };

            insert_task(conn, &task)?;
            touch_board(conn, &column.board_id)?;
            Ok(task)
        })
    }

    pub fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, task_id))
    }

    pub fn update_task(&self, task_id: &str, fields: TaskUpdate) -> Result<Task> {
        if let Some(ref title) = fields.title {
            require_title(title)?;
        }

        self.with_conn(|conn| {
            let mut task = get_task_internal(conn, task_id)?
                .ok_or_else(|| BackendError::not_found("task", task_id))?;
            fields.apply_to(&mut task);
            task.title = task.title.trim().to_string();

            conn.execute(
                "UPDATE tasks SET title = ?1, description = ?2, assignee = ?3, due_date = ?4,
                                  priority = ?5
                 WHERE id = ?6",
                params![
                    task.title,
                    task.description,
                    task.assignee,
                    format_due_date(task.due_date),
                    task.priority.as_str(),
                    task.id
                ],
            )?;
            touch_column_board(conn, &task.column_id)?;
            Ok(task)
        })
    }

    /// Delete a task and close the gap it leaves in its column.
    pub fn delete_task(&self, task_id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let task = get_task_internal(&tx, task_id)?
                .ok_or_else(|| BackendError::not_found("task", task_id))?;
            tx.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
            let remaining = column_sequence(&tx, &task.column_id, None)?;
            write_sequence(&tx, &task.column_id, &remaining)?;
            touch_column_board(&tx, &task.column_id)?;
            tx.commit()?;
            Ok(())
        })
    }

    /// Move a task to `column_id` at `index` (post-removal, clamped).
    ///
    /// Both the source and target column are renumbered in the same
    /// transaction. Moving across boards is rejected.
    pub fn move_task(&self, task_id: &str, column_id: &str, index: usize) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let task = get_task_internal(&tx, task_id)?
                .ok_or_else(|| BackendError::not_found("task", task_id))?;
            let source = get_column_internal(&tx, &task.column_id)?
                .ok_or_else(|| BackendError::not_found("column", &task.column_id))?;
            let target = get_column_internal(&tx, column_id)?
                .ok_or_else(|| BackendError::not_found("column", column_id))?;
            if source.board_id != target.board_id {
                return Err(BackendError::invalid(
                    "column_id",
                    "target column is on a different board",
                )
                .into());
            }

            let mut sequence = column_sequence(&tx, &target.id, Some(task_id))?;
            let landed = index.min(sequence.len());
            sequence.insert(landed, task_id.to_string());
            write_sequence(&tx, &target.id, &sequence)?;

            if source.id != target.id {
                let remaining = column_sequence(&tx, &source.id, None)?;
                write_sequence(&tx, &source.id, &remaining)?;
            }

            touch_board(&tx, &target.board_id)?;
            tx.commit()?;

            tracing::debug!(
                task_id = %task_id,
                from = %source.id,
                to = %target.id,
                index = landed,
                "Task moved"
            );
            Ok(())
        })
    }

    /// Owner of the board a task belongs to.
    pub fn task_owner(&self, task_id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let owner = conn
                .query_row(
                    "SELECT b.user_id FROM tasks t
                     JOIN board_columns c ON c.id = t.column_id
                     JOIN boards b ON b.id = c.board_id
                     WHERE t.id = ?1",
                    params![task_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(owner)
        })
    }
}
