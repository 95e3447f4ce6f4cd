mod autopilot;
mod config;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Serpent autopilot started.");

    let settings = config::load_config().context("loading configuration")?;
    let summary = autopilot::run_autopilot(&settings).await?;

    info!(
        steps = summary.steps,
        food_eaten = summary.food_eaten,
        failed_searches = summary.failed_searches,
        "Autopilot finished."
    );
    Ok(())
}
