mod config;
mod console;
mod db;
mod display;
mod error;
mod form;
mod gateway;
mod record_log;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{config::Config, console::Console, form::FormController, gateway::PersistenceGateway};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Diagnostics go to stderr so they never interleave with the form on stdout
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let config = Config::default();
    config.validate()?;

    let gateway = PersistenceGateway::new(&config);
    gateway
        .initialize()
        .await
        .with_context(|| format!("cannot prepare database {}", config.database_path.display()))?;
    info!(
        log = %gateway.log_path().display(),
        database = %gateway.database_path().display(),
        "Storage ready"
    );

    let console = Console::start(FormController::new(gateway), config.recent_limit).await;
    console.run().await
}
