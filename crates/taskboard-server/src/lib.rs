pub mod engine;
mod routes;
pub mod ws;

use anyhow::Result;
use tokio::net::TcpListener;

pub use routes::{build_router, AppState};

pub async fn serve(listener: TcpListener, engine: AppState) -> Result<()> {
    let app = build_router(engine);
    axum::serve(listener, app).await?;
    Ok(())
}
