//! Energy Prediction Dashboard - Main Entry Point

use api::{init_logging, run_server, DashboardConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DashboardConfig::load()?;
    init_logging(&config.logging.level)?;

    info!("=== Energy Prediction Dashboard v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Model: {}", config.model.path);

    run_server(config).await
}
