use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use reservo::engine::Engine;
use reservo::http::{AppState, create_router};

#[derive(Parser)]
#[command(name = "reservo", about = "Room-booking manager", version)]
struct Cli {
    /// Directory holding the write-ahead log
    #[arg(long, env = "RESERVO_DATA_DIR", default_value = "./data", global = true)]
    data_dir: PathBuf,

    /// Compact the log after this many appends
    #[arg(long, env = "RESERVO_COMPACT_THRESHOLD", default_value_t = 1000, global = true)]
    compact_threshold: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        #[arg(long, env = "RESERVO_BIND", default_value = "0.0.0.0")]
        bind: String,

        #[arg(long, env = "RESERVO_PORT", default_value_t = 8095)]
        port: u16,

        /// Prometheus exporter port (metrics disabled when unset)
        #[arg(long, env = "RESERVO_METRICS_PORT")]
        metrics_port: Option<u16>,
    },
    /// Run the interactive terminal menu
    Menu,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    std::fs::create_dir_all(&cli.data_dir)?;
    let wal_path = cli.data_dir.join("reservo.wal");

    // Explicit runtime: the menu drives the engine from a blocking stdin
    // loop, the server hands the whole runtime to axum.
    let rt = tokio::runtime::Runtime::new()?;
    let engine = Arc::new(Engine::new(&wal_path, cli.compact_threshold)?);

    match cli.command {
        Command::Serve {
            bind,
            port,
            metrics_port,
        } => {
            reservo::observability::init(metrics_port);
            rt.block_on(serve(engine, &bind, port, &cli.data_dir))?;
        }
        Command::Menu => reservo::menu::run(&rt, engine)?,
    }

    Ok(())
}

async fn serve(
    engine: Arc<Engine>,
    bind: &str,
    port: u16,
    data_dir: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router(AppState::new(engine));

    let addr = format!("{bind}:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("reservo listening on http://{addr}");
    info!("  data_dir: {}", data_dir.display());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("reservo stopped");
    Ok(())
}

/// Resolve on SIGTERM or ctrl-c.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to register SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
    }
    info!("shutdown signal received");
}
