//! Integration tests for the board controller: optimistic moves, rollback,
//! gesture handling and persistence ordering.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use taskify::board::{BoardState, MoveIntent};
use taskify::config::{BoardsConfig, Config};
use taskify::controller::BoardController;
use taskify::db::{Database, SqliteBackend};
use taskify::error::{BackendError, BackendResult, ControllerError, MoveError};
use taskify::filters::TaskFilter;
use taskify::gesture::{CancelReason, DragEvent, GestureOutput};
use taskify::sync::BoardBackend;
use taskify::types::{
    Board, BoardUpdate, BoardWithColumns, Column, NewBoard, NewTask, Priority, Task, TaskUpdate,
};
use tokio::sync::oneshot;

/// SQLite backend whose `persist_move` can be made to fail or to wait.
struct FlakyBackend {
    inner: SqliteBackend,
    /// Number of upcoming `persist_move` calls that fail.
    failures: AtomicUsize,
    persist_calls: AtomicUsize,
    gate: tokio::sync::Mutex<Option<oneshot::Receiver<()>>>,
}

impl FlakyBackend {
    fn new(db: Arc<Database>) -> Self {
        Self {
            inner: SqliteBackend::new(db, BoardsConfig::default()),
            failures: AtomicUsize::new(0),
            persist_calls: AtomicUsize::new(0),
            gate: tokio::sync::Mutex::new(None),
        }
    }

    fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    fn persist_calls(&self) -> usize {
        self.persist_calls.load(Ordering::SeqCst)
    }

    /// Make the next `persist_move` wait until the returned sender fires.
    async fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock().await = Some(rx);
        tx
    }
}

#[async_trait]
impl BoardBackend for FlakyBackend {
    async fn persist_move(&self, task_id: &str, column_id: &str, index: usize) -> BackendResult<()> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().await.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(BackendError::Storage(anyhow::anyhow!("backend offline")));
        }
        self.inner.persist_move(task_id, column_id, index).await
    }

    async fn create_task(&self, column_id: &str, fields: NewTask) -> BackendResult<Task> {
        self.inner.create_task(column_id, fields).await
    }

    async fn update_task(&self, task_id: &str, fields: TaskUpdate) -> BackendResult<Task> {
        self.inner.update_task(task_id, fields).await
    }

    async fn delete_task(&self, task_id: &str) -> BackendResult<()> {
        self.inner.delete_task(task_id).await
    }

    async fn create_column(&self, board_id: &str, user_id: &str, title: &str) -> BackendResult<Column> {
        self.inner.create_column(board_id, user_id, title).await
    }

    async fn update_column_title(&self, column_id: &str, title: &str) -> BackendResult<Column> {
        self.inner.update_column_title(column_id, title).await
    }

    async fn delete_column(&self, column_id: &str) -> BackendResult<()> {
        self.inner.delete_column(column_id).await
    }

    async fn get_board_with_columns_and_tasks(&self, board_id: &str) -> BackendResult<BoardWithColumns> {
        self.inner.get_board_with_columns_and_tasks(board_id).await
    }

    async fn create_board(&self, user_id: &str, fields: NewBoard) -> BackendResult<BoardWithColumns> {
        self.inner.create_board(user_id, fields).await
    }

    async fn list_boards(&self, user_id: &str) -> BackendResult<Vec<Board>> {
        self.inner.list_boards(user_id).await
    }

    async fn update_board(&self, board_id: &str, fields: BoardUpdate) -> BackendResult<Board> {
        self.inner.update_board(board_id, fields).await
    }

    async fn delete_board(&self, board_id: &str) -> BackendResult<()> {
        self.inner.delete_board(board_id).await
    }
}

struct Fixture {
    db: Arc<Database>,
    backend: Arc<FlakyBackend>,
    controller: Arc<BoardController>,
    board_id: String,
    /// Column ids: To Do, In Progress, Review, Done.
    columns: Vec<String>,
    /// Task ids by title.
    tasks: std::collections::HashMap<String, String>,
}

impl Fixture {
    fn task(&self, title: &str) -> String {
        self.tasks[title].clone()
    }

    /// Task titles per column, as the controller sees them.
    fn local_layout(&self) -> Vec<Vec<String>> {
        layout(&self.controller.state().expect("board loaded"))
    }

    /// Task titles per column, as stored.
    fn stored_layout(&self) -> Vec<Vec<String>> {
        let stored = self.db.get_board_with_columns(&self.board_id).unwrap();
        layout(&BoardState::from_loaded(stored, 0))
    }
}

fn layout(state: &BoardState) -> Vec<Vec<String>> {
    state
        .columns
        .iter()
        .map(|c| c.tasks.iter().map(|t| t.title.clone()).collect())
        .collect()
}

fn cols(layout: &[&[&str]]) -> Vec<Vec<String>> {
    layout
        .iter()
        .map(|c| c.iter().map(|t| t.to_string()).collect())
        .collect()
}

/// "To Do" = [a, b, c], "In Progress" = [x], "Review" and "Done" empty.
async fn setup(config: Config) -> Fixture {
    let db = Arc::new(Database::open_in_memory().expect("Failed to create in-memory database"));
    let board = db
        .create_board(
            "u1",
            NewBoard {
                title: "Roadmap".into(),
                description: None,
                color: None,
            },
            &config.boards,
        )
        .unwrap();
    let columns: Vec<String> = board.columns.iter().map(|c| c.column.id.clone()).collect();

    let mut tasks = std::collections::HashMap::new();
    for (title, column) in [("a", 0), ("b", 0), ("c", 0), ("x", 1)] {
        let task = db
            .create_task(&columns[column], NewTask::titled(title))
            .unwrap();
        tasks.insert(title.to_string(), task.id);
    }

    let backend = Arc::new(FlakyBackend::new(Arc::clone(&db)));
    let controller = Arc::new(BoardController::new(
        Arc::clone(&backend) as Arc<dyn BoardBackend>,
        "u1",
        &config,
    ));
    controller.load(&board.board.id).await.unwrap();

    Fixture {
        db,
        backend,
        controller,
        board_id: board.board.id,
        columns,
        tasks,
    }
}

async fn start_drag(f: &Fixture, title: &str) {
    let c = &f.controller;
    c.handle_drag(DragEvent::PointerDown {
        task_id: f.task(title),
        x: 0.0,
        y: 0.0,
    })
    .await
    .unwrap();
    let started = c
        .handle_drag(DragEvent::PointerMove { x: 12.0, y: 0.0 })
        .await
        .unwrap();
    assert!(matches!(started, GestureOutput::Started { .. }));
}

/// Yield until `check` holds, so spawned tasks can make progress.
async fn wait_until(mut check: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if check() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

mod move_tests {
    use super::*;

    #[tokio::test]
    async fn load_orders_columns_and_tasks() {
        let f = setup(Config::default()).await;
        let state = f.controller.state().unwrap();
        let titles: Vec<_> = state.columns.iter().map(|c| c.column.title.as_str()).collect();
        assert_eq!(titles, vec!["To Do", "In Progress", "Review", "Done"]);
        assert_eq!(f.local_layout(), cols(&[&["a", "b", "c"], &["x"], &[], &[]]));
    }

    #[tokio::test]
    async fn successful_move_matches_storage() {
        let f = setup(Config::default()).await;

        f.controller
            .move_task(&MoveIntent::new(f.task("b"), f.columns[1].clone(), 0))
            .await
            .unwrap();

        let expected = cols(&[&["a", "c"], &["b", "x"], &[], &[]]);
        assert_eq!(f.local_layout(), expected);
        assert_eq!(f.stored_layout(), expected);
    }

    #[tokio::test]
    async fn failed_move_rolls_back() {
        let f = setup(Config::default()).await;
        let before = f.controller.state().unwrap();
        f.backend.fail_next(1);

        let err = f
            .controller
            .move_task(&MoveIntent::new(f.task("a"), f.columns[3].clone(), 0))
            .await
            .unwrap_err();

        assert!(matches!(err, MoveError::PersistenceFailure { ref task_id, .. } if *task_id == f.task("a")));
        let after = f.controller.state().unwrap();
        assert_eq!(after, before);
        assert!(after.version > before.version);
        assert_eq!(f.stored_layout(), layout(&before));
    }

    #[tokio::test]
    async fn board_is_usable_after_failure() {
        let f = setup(Config::default()).await;
        f.backend.fail_next(1);
        let intent = MoveIntent::new(f.task("a"), f.columns[2].clone(), 0);
        assert!(f.controller.move_task(&intent).await.is_err());

        f.controller.move_task(&intent).await.unwrap();
        assert_eq!(f.stored_layout(), cols(&[&["b", "c"], &["x"], &["a"], &[]]));
    }

    #[tokio::test]
    async fn unknown_task_is_rejected_locally() {
        let f = setup(Config::default()).await;
        let err = f
            .controller
            .move_task(&MoveIntent::new("ghost", f.columns[0].clone(), 0))
            .await
            .unwrap_err();
        assert_eq!(err, MoveError::TaskNotFound("ghost".into()));
        assert_eq!(f.backend.persist_calls(), 0);
    }

    #[tokio::test]
    async fn unchanged_position_is_not_persisted() {
        let f = setup(Config::default()).await;
        f.controller
            .move_task(&MoveIntent::new(f.task("b"), f.columns[0].clone(), 1))
            .await
            .unwrap();
        assert_eq!(f.backend.persist_calls(), 0);
    }

    #[tokio::test]
    async fn move_without_board_fails() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let backend = Arc::new(FlakyBackend::new(db));
        let controller = BoardController::new(backend, "u1", &Config::default());
        let err = controller
            .move_task(&MoveIntent::new("t", "c", 0))
            .await
            .unwrap_err();
        assert_eq!(err, MoveError::BoardNotLoaded);
    }

    #[tokio::test]
    async fn cancelled_drag_keeps_revert_of_failed_move() {
        let f = setup(Config::default()).await;
        f.backend.fail_next(1);
        let release = f.backend.hold_next().await;

        let pending = {
            let controller = Arc::clone(&f.controller);
            let intent = MoveIntent::new(f.task("a"), f.columns[1].clone(), 0);
            tokio::spawn(async move { controller.move_task(&intent).await })
        };
        let backend = Arc::clone(&f.backend);
        wait_until(|| backend.persist_calls() == 1).await;

        start_drag(&f, "b").await;
        f.controller
            .handle_drag(DragEvent::DragOver {
                over_id: Some(f.task("c")),
            })
            .await
            .unwrap();
        assert_eq!(f.local_layout(), cols(&[&["c", "b"], &["a", "x"], &[], &[]]));

        release.send(()).unwrap();
        assert!(pending.await.unwrap().is_err());

        f.controller.handle_drag(DragEvent::Cancel).await.unwrap();

        let expected = cols(&[&["a", "b", "c"], &["x"], &[], &[]]);
        assert_eq!(f.stored_layout(), expected);
        assert_eq!(f.local_layout(), expected);
    }

    #[tokio::test]
    async fn crud_during_drag_survives_cancel_and_noop() {
        let f = setup(Config::default()).await;
        start_drag(&f, "a").await;
        f.controller
            .handle_drag(DragEvent::DragOver {
                over_id: Some(f.task("c")),
            })
            .await
            .unwrap();

        f.controller
            .create_task(&f.columns[1], NewTask::titled("y"))
            .await
            .unwrap();
        f.controller.delete_column(&f.columns[3]).await.unwrap();
        f.controller.handle_drag(DragEvent::Cancel).await.unwrap();

        let expected = cols(&[&["a", "b", "c"], &["x", "y"], &[]]);
        assert_eq!(f.local_layout(), expected);
        assert_eq!(f.stored_layout(), expected);

        start_drag(&f, "b").await;
        f.controller
            .delete_task(&f.task("c"))
            .await
            .unwrap();
        let out = f
            .controller
            .handle_drag(DragEvent::Drop {
                over_id: Some(f.task("b")),
            })
            .await
            .unwrap();
        assert!(matches!(out, GestureOutput::NoOp { .. }));

        let expected = cols(&[&["a", "b"], &["x", "y"], &[]]);
        assert_eq!(f.local_layout(), expected);
        assert_eq!(f.stored_layout(), expected);
        assert_eq!(f.backend.persist_calls(), 0);
    }

    #[tokio::test]
    async fn reconcile_replaces_state_with_server_truth() {
        let mut config = Config::default();
        config.sync.reconcile_on_success = true;
        let f = setup(config).await;

        f.controller
            .move_task(&MoveIntent::new(f.task("c"), f.columns[1].clone(), 1))
            .await
            .unwrap();

        let local = f.controller.state().unwrap();
        let stored = f.db.get_board(&f.board_id).unwrap().unwrap();
        assert_eq!(local.board.updated_at, stored.updated_at);
        assert_eq!(f.local_layout(), cols(&[&["a", "b"], &["x", "c"], &[], &[]]));
    }
}

mod concurrency_tests {
    use super::*;

    #[tokio::test]
    async fn failed_move_reverts_only_its_task() {
        let f = setup(Config::default()).await;
        f.backend.fail_next(1);
        let release = f.backend.hold_next().await;

        let first = {
            let controller = Arc::clone(&f.controller);
            let intent = MoveIntent::new(f.task("a"), f.columns[1].clone(), 0);
            tokio::spawn(async move { controller.move_task(&intent).await })
        };
        let backend = Arc::clone(&f.backend);
        wait_until(|| backend.persist_calls() == 1).await;

        let second = {
            let controller = Arc::clone(&f.controller);
            let intent = MoveIntent::new(f.task("c"), f.columns[3].clone(), 0);
            tokio::spawn(async move { controller.move_task(&intent).await })
        };
        let controller = Arc::clone(&f.controller);
        wait_until(|| {
            controller
                .state()
                .is_some_and(|s| s.columns[3].tasks.len() == 1)
        })
        .await;
        // Both moves are visible before either is confirmed.
        assert_eq!(f.local_layout(), cols(&[&["b"], &["a", "x"], &[], &["c"]]));

        release.send(()).unwrap();
        assert!(matches!(
            first.await.unwrap(),
            Err(MoveError::PersistenceFailure { .. })
        ));
        second.await.unwrap().unwrap();

        let expected = cols(&[&["a", "b"], &["x"], &[], &["c"]]);
        assert_eq!(f.local_layout(), expected);
        assert_eq!(f.stored_layout(), expected);
        assert_eq!(f.backend.persist_calls(), 2);
    }
}

mod drag_concurrency_tests {
    use super::*;

    #[tokio::test]
    async fn drop_queued_behind_failing_move_keeps_its_position() {
        let f = setup(Config::default()).await;
        f.backend.fail_next(1);
        let release = f.backend.hold_next().await;

        let first = {
            let controller = Arc::clone(&f.controller);
            let intent = MoveIntent::new(f.task("a"), f.columns[2].clone(), 0);
            tokio::spawn(async move { controller.move_task(&intent).await })
        };
        let backend = Arc::clone(&f.backend);
        wait_until(|| backend.persist_calls() == 1).await;

        start_drag(&f, "c").await;
        let dropped = {
            let controller = Arc::clone(&f.controller);
            let over_id = Some(f.task("x"));
            tokio::spawn(async move { controller.handle_drag(DragEvent::Drop { over_id }).await })
        };
        let controller = Arc::clone(&f.controller);
        wait_until(|| {
            controller
                .state()
                .is_some_and(|s| s.columns[1].tasks.len() == 2)
        })
        .await;
        assert_eq!(f.local_layout(), cols(&[&["b"], &["c", "x"], &["a"], &[]]));

        release.send(()).unwrap();
        assert!(matches!(
            first.await.unwrap(),
            Err(MoveError::PersistenceFailure { .. })
        ));
        assert!(matches!(
            dropped.await.unwrap(),
            Ok(GestureOutput::Final { .. })
        ));

        let expected = cols(&[&["a", "b"], &["c", "x"], &[], &[]]);
        assert_eq!(f.local_layout(), expected);
        assert_eq!(f.stored_layout(), expected);
    }

    #[tokio::test]
    async fn failed_drop_reverts_only_the_dragged_task() {
        let f = setup(Config::default()).await;
        let release = f.backend.hold_next().await;
        f.backend.fail_next(1);

        start_drag(&f, "a").await;
        f.controller
            .handle_drag(DragEvent::DragOver {
                over_id: Some(f.task("c")),
            })
            .await
            .unwrap();
        let dropped = {
            let controller = Arc::clone(&f.controller);
            let over_id = Some(f.columns[3].clone());
            tokio::spawn(async move { controller.handle_drag(DragEvent::Drop { over_id }).await })
        };
        let backend = Arc::clone(&f.backend);
        wait_until(|| backend.persist_calls() == 1).await;

        // Lands while the drop is still in flight.
        let second = {
            let controller = Arc::clone(&f.controller);
            let intent = MoveIntent::new(f.task("x"), f.columns[2].clone(), 0);
            tokio::spawn(async move { controller.move_task(&intent).await })
        };
        let controller = Arc::clone(&f.controller);
        wait_until(|| {
            controller
                .state()
                .is_some_and(|s| s.columns[2].tasks.len() == 1)
        })
        .await;

        release.send(()).unwrap();
        assert!(matches!(
            dropped.await.unwrap(),
            Err(MoveError::PersistenceFailure { .. })
        ));
        second.await.unwrap().unwrap();

        let expected = cols(&[&["a", "b", "c"], &[], &["x"], &[]]);
        assert_eq!(f.local_layout(), expected);
        assert_eq!(f.stored_layout(), expected);
    }
}

mod gesture_tests {
    use super::*;

    #[tokio::test]
    async fn drop_on_empty_column_area_appends() {
        let f = setup(Config::default()).await;
        start_drag(&f, "a").await;

        let out = f
            .controller
            .handle_drag(DragEvent::Drop {
                over_id: Some(f.columns[1].clone()),
            })
            .await
            .unwrap();

        assert!(matches!(out, GestureOutput::Final { ref intent } if intent.index == 1));
        let expected = cols(&[&["b", "c"], &["x", "a"], &[], &[]]);
        assert_eq!(f.local_layout(), expected);
        assert_eq!(f.stored_layout(), expected);
    }

    #[tokio::test]
    async fn drop_on_task_takes_its_position() {
        let f = setup(Config::default()).await;
        start_drag(&f, "c").await;

        f.controller
            .handle_drag(DragEvent::Drop {
                over_id: Some(f.task("x")),
            })
            .await
            .unwrap();

        let expected = cols(&[&["a", "b"], &["c", "x"], &[], &[]]);
        assert_eq!(f.local_layout(), expected);
        assert_eq!(f.stored_layout(), expected);
    }

    #[tokio::test]
    async fn preview_then_cancel_restores_board() {
        let f = setup(Config::default()).await;
        start_drag(&f, "a").await;

        let out = f
            .controller
            .handle_drag(DragEvent::DragOver {
                over_id: Some(f.task("c")),
            })
            .await
            .unwrap();
        assert!(matches!(out, GestureOutput::Provisional { .. }));
        assert_eq!(f.local_layout()[0], vec!["b", "c", "a"]);

        let out = f.controller.handle_drag(DragEvent::Cancel).await.unwrap();
        assert!(matches!(
            out,
            GestureOutput::Cancelled {
                reason: CancelReason::Aborted,
                ..
            }
        ));
        assert_eq!(f.local_layout()[0], vec!["a", "b", "c"]);
        assert_eq!(f.backend.persist_calls(), 0);
    }

    #[tokio::test]
    async fn preview_then_drop_persists_final_position() {
        let f = setup(Config::default()).await;
        start_drag(&f, "a").await;
        f.controller
            .handle_drag(DragEvent::DragOver {
                over_id: Some(f.task("c")),
            })
            .await
            .unwrap();

        f.controller
            .handle_drag(DragEvent::Drop {
                over_id: Some(f.columns[0].clone()),
            })
            .await
            .unwrap();

        assert_eq!(f.local_layout()[0], vec!["b", "c", "a"]);
        assert_eq!(f.stored_layout()[0], vec!["b", "c", "a"]);
        assert_eq!(f.backend.persist_calls(), 1);
    }

    #[tokio::test]
    async fn failed_drop_after_preview_restores_pre_drag_board() {
        let f = setup(Config::default()).await;
        f.backend.fail_next(1);
        start_drag(&f, "a").await;
        f.controller
            .handle_drag(DragEvent::DragOver {
                over_id: Some(f.task("b")),
            })
            .await
            .unwrap();

        let err = f
            .controller
            .handle_drag(DragEvent::Drop {
                over_id: Some(f.columns[2].clone()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, MoveError::PersistenceFailure { .. }));
        assert_eq!(f.local_layout(), cols(&[&["a", "b", "c"], &["x"], &[], &[]]));
    }

    #[tokio::test]
    async fn drop_on_self_is_noop() {
        let f = setup(Config::default()).await;
        start_drag(&f, "b").await;

        let out = f
            .controller
            .handle_drag(DragEvent::Drop {
                over_id: Some(f.task("b")),
            })
            .await
            .unwrap();

        assert!(matches!(out, GestureOutput::NoOp { .. }));
        assert_eq!(f.backend.persist_calls(), 0);
    }

    #[tokio::test]
    async fn short_press_is_a_click() {
        let f = setup(Config::default()).await;
        let c = &f.controller;
        c.handle_drag(DragEvent::PointerDown {
            task_id: f.task("a"),
            x: 0.0,
            y: 0.0,
        })
        .await
        .unwrap();
        c.handle_drag(DragEvent::PointerMove { x: 3.0, y: 4.0 })
            .await
            .unwrap();

        let out = c
            .handle_drag(DragEvent::Drop {
                over_id: Some(f.columns[1].clone()),
            })
            .await
            .unwrap();

        assert_eq!(out, GestureOutput::Nothing);
        assert_eq!(f.backend.persist_calls(), 0);
    }

    #[tokio::test]
    async fn drop_on_nothing_cancels() {
        let f = setup(Config::default()).await;
        start_drag(&f, "a").await;
        let out = f
            .controller
            .handle_drag(DragEvent::Drop { over_id: None })
            .await
            .unwrap();
        assert!(matches!(
            out,
            GestureOutput::Cancelled {
                reason: CancelReason::NoTarget,
                ..
            }
        ));
        assert_eq!(f.backend.persist_calls(), 0);
    }
}

mod crud_tests {
    use super::*;

    #[tokio::test]
    async fn created_task_is_appended_locally() {
        let f = setup(Config::default()).await;
        let task = f
            .controller
            .create_task(&f.columns[1], NewTask::titled("y"))
            .await
            .unwrap();
        assert_eq!(task.sort_order, 1);
        assert_eq!(f.local_layout()[1], vec!["x", "y"]);
    }

    #[tokio::test]
    async fn deleted_column_disappears_locally() {
        let f = setup(Config::default()).await;
        f.controller.delete_column(&f.columns[0]).await.unwrap();

        let state = f.controller.state().unwrap();
        assert_eq!(state.columns.len(), 3);
        assert_eq!(state.columns[0].column.sort_order, 0);
        assert_eq!(f.local_layout(), f.stored_layout());
    }

    #[tokio::test]
    async fn renamed_column_and_edited_task() {
        let f = setup(Config::default()).await;
        f.controller
            .rename_column(&f.columns[3], "Shipped")
            .await
            .unwrap();
        f.controller
            .update_task(
                &f.task("b"),
                TaskUpdate {
                    title: Some("b2".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let state = f.controller.state().unwrap();
        assert_eq!(state.columns[3].column.title, "Shipped");
        assert_eq!(f.local_layout()[0], vec!["a", "b2", "c"]);
    }

    #[tokio::test]
    async fn filtered_view_hides_without_touching_state() {
        let f = setup(Config::default()).await;
        f.controller
            .update_task(
                &f.task("c"),
                TaskUpdate {
                    priority: Some(Priority::High),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let filter = TaskFilter {
            priorities: [Priority::High].into_iter().collect(),
            ..Default::default()
        };
        let filtered = f.controller.filtered(&filter).unwrap();
        assert_eq!(layout(&filtered), cols(&[&["c"], &[], &[], &[]]));
        assert_eq!(filtered.version, f.controller.state().unwrap().version);
        assert_eq!(f.local_layout(), cols(&[&["a", "b", "c"], &["x"], &[], &[]]));

        assert_eq!(
            f.controller.filtered(&TaskFilter::default()).unwrap(),
            f.controller.state().unwrap()
        );
    }

    #[tokio::test]
    async fn filtered_view_follows_live_preview() {
        let f = setup(Config::default()).await;
        start_drag(&f, "a").await;
        f.controller
            .handle_drag(DragEvent::DragOver {
                over_id: Some(f.task("c")),
            })
            .await
            .unwrap();

        let filtered = f.controller.filtered(&TaskFilter::default()).unwrap();
        assert_eq!(layout(&filtered)[0], vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn backend_errors_surface() {
        let f = setup(Config::default()).await;
        let err = f.controller.delete_task("ghost").await.unwrap_err();
        assert!(matches!(
            err,
            ControllerError::Backend(BackendError::NotFound { kind: "task", .. })
        ));
    }
}
