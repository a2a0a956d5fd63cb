use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use taskboard_server::engine::BoardEngine;

#[derive(Parser)]
#[command(name = "taskboard-server", about = "Shared task board synchronization server")]
struct Cli {
    /// Address to bind.
    #[arg(long, env = "TASKBOARD_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on.
    #[arg(long, env = "TASKBOARD_PORT", default_value_t = 3001)]
    port: u16,

    /// Directory holding the task snapshot and uploaded files.
    /// Defaults to $XDG_DATA_HOME/taskboard.
    #[arg(long, env = "TASKBOARD_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let data_dir = cli
        .data_dir
        .unwrap_or_else(taskboard_store::default_data_dir);

    let engine = Arc::new(BoardEngine::open(&data_dir).await?);

    let addr = SocketAddr::new(cli.bind.parse()?, cli.port);
    let listener = TcpListener::bind(addr).await?;
    eprintln!("taskboard-server listening on http://{addr}");
    eprintln!("data directory: {}", data_dir.display());

    taskboard_server::serve(listener, engine).await
}
