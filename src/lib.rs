//! Taskify library.
//!
//! Kanban boards with optimistic drag-and-drop ordering. The board engine in
//! [`board`] and [`gesture`] is pure and synchronous; [`controller`] ties it
//! to a [`sync::BoardBackend`], of which [`db::SqliteBackend`] is the bundled
//! implementation.

pub mod api;
pub mod board;
pub mod cli;
pub mod config;
pub mod controller;
pub mod db;
pub mod error;
pub mod export;
pub mod filters;
pub mod gesture;
pub mod logging;
pub mod sync;
pub mod types;
