use clap::Parser;
use tracing_subscriber::EnvFilter;

use taskboard_api::cli::{self, Cli};
use taskboard_api::config::{self, StoreBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Taskboard API in {:?} mode", config.environment);
    if taskboard_api::is_production!() && config.database.backend == StoreBackend::Memory {
        tracing::warn!("In-memory store selected in production; data will not persist");
    }

    if let Err(e) = cli::run(cli, config.clone()).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}
