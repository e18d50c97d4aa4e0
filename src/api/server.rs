//! Router and listener.

use super::handlers;
use crate::config::BoardsConfig;
use crate::db::{Database, SqliteBackend};
use axum::Router;
use axum::routing::{get, patch, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// State shared across handlers.
#[derive(Clone)]
pub struct ApiServer {
    db: Arc<Database>,
    backend: SqliteBackend,
}

impl ApiServer {
    pub fn new(db: Arc<Database>, boards: BoardsConfig) -> Self {
        let backend = SqliteBackend::new(Arc::clone(&db), boards);
        Self { db, backend }
    }

    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn backend(&self) -> &SqliteBackend {
        &self.backend
    }
}

pub fn build_router(state: ApiServer) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(handlers::health))
        .route(
            "/api/boards",
            get(handlers::list_boards).post(handlers::create_board),
        )
        .route(
            "/api/boards/{board_id}",
            get(handlers::get_board)
                .patch(handlers::update_board)
                .delete(handlers::delete_board),
        )
        .route(
            "/api/boards/{board_id}/columns",
            post(handlers::create_column),
        )
        .route(
            "/api/columns/{column_id}",
            patch(handlers::rename_column).delete(handlers::delete_column),
        )
        .route(
            "/api/columns/{column_id}/tasks",
            post(handlers::create_task),
        )
        .route(
            "/api/tasks/{task_id}",
            patch(handlers::update_task).delete(handlers::delete_task),
        )
        .route("/api/tasks/{task_id}/move", post(handlers::move_task))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve in the background.
///
/// Returns a sender that triggers graceful shutdown and the bound address
/// (useful with port 0).
pub async fn start_server(
    state: ApiServer,
    addr: SocketAddr,
) -> anyhow::Result<(oneshot::Sender<()>, SocketAddr)> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("API listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("API server shutting down");
            })
            .await
        {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok((shutdown_tx, bound_addr))
}
