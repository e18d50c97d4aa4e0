//! Taskify server and CLI.

use anyhow::{Result, anyhow};
use clap::Parser;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use taskify::api::{ApiServer, start_server};
use taskify::cli::export::ExportArgs;
use taskify::cli::import::ImportArgs;
use taskify::cli::{BoardsArgs, Cli, Command, ServeArgs};
use taskify::config::{Config, ConfigLoader};
use taskify::db::{Database, now_ms};
use taskify::export::BoardSnapshot;
use taskify::logging::{self, LogTarget};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    // SAFETY: set before any other threads are spawned
    if let Some(config_path) = &cli.config {
        unsafe {
            std::env::set_var("TASKIFY_CONFIG_PATH", config_path);
        }
    }
    let loader = ConfigLoader::load()?;
    for source in loader.sources() {
        debug!(path = %source.display(), "Config source");
    }
    let mut config = loader.into_config();
    if let Some(db_path) = &cli.database {
        config.server.db_path = db_path.into();
    }

    config.ensure_db_dir()?;
    let db = Arc::new(Database::open(&config.server.db_path)?);

    match cli.command {
        None => run_serve(config, db, ServeArgs::default()).await,
        Some(Command::Serve(args)) => run_serve(config, db, args).await,
        Some(Command::Boards(args)) => run_boards(&db, args),
        Some(Command::Export(args)) => run_export(&db, args),
        Some(Command::Import(args)) => run_import(&db, args),
    }
}

async fn run_serve(mut config: Config, db: Arc<Database>, args: ServeArgs) -> Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow!("invalid listen address: {}", e))?;

    info!(db = %config.server.db_path.display(), "Starting taskify");
    let state = ApiServer::new(db, config.boards.clone());
    let (shutdown_tx, _bound) = start_server(state, addr).await?;

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received");
    let _ = shutdown_tx.send(());
    Ok(())
}

fn run_boards(db: &Database, args: BoardsArgs) -> Result<()> {
    let summary = db.board_summary(&args.user, now_ms())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if summary.boards.is_empty() {
        println!("No boards for {}", args.user);
        return Ok(());
    }
    for overview in &summary.boards {
        println!(
            "{}  {:<32} {:>3} columns {:>5} tasks",
            overview.board.id, overview.board.title, overview.column_count, overview.task_count
        );
    }
    println!(
        "{} boards, {} tasks, {} active in the last week",
        summary.boards.len(),
        summary.total_tasks,
        summary.recently_active
    );
    Ok(())
}

fn run_export(db: &Database, args: ExportArgs) -> Result<()> {
    let board = db.get_board_with_columns(&args.board)?;
    let snapshot = BoardSnapshot::new(board);
    let gzip = args.should_compress();

    match args.output {
        Some(ref path) => {
            snapshot.write_to(std::fs::File::create(path)?, gzip)?;
            eprintln!(
                "Exported {} tasks to {}{}",
                snapshot.task_count(),
                path.display(),
                if gzip { " (gzipped)" } else { "" }
            );
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            snapshot.write_to(&mut lock, gzip)?;
            lock.flush()?;
        }
    }
    Ok(())
}

fn run_import(db: &Database, args: ImportArgs) -> Result<()> {
    let snapshot = BoardSnapshot::from_file(&args.file)?;
    let owner = args.owner(&snapshot.board.board.user_id);
    let imported = db.import_board(owner, &snapshot.board)?;

    eprintln!(
        "Imported {} as board {} for {} ({} columns, {} tasks)",
        args.file.display(),
        imported.board.id,
        owner,
        imported.columns.len(),
        snapshot.task_count()
    );
    Ok(())
}
