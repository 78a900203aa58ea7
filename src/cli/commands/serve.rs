use clap::Args;

use crate::config::{AppConfig, StoreBackend};
use crate::database::DatabaseManager;
use crate::server;
use crate::state::AppState;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (overrides SERVER_PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Store backend: memory or postgres (overrides STORE_BACKEND)")]
    pub store: Option<StoreBackend>,
}

impl ServeArgs {
    fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(backend) = self.store {
            config.database.backend = backend;
        }
        config
    }
}

pub async fn handle(args: ServeArgs, config: AppConfig) -> anyhow::Result<()> {
    let config = args.apply(config);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set for the {:?} environment", config.environment);
    }

    let store = DatabaseManager::open_store(&config.database).await?;
    let state = AppState::from_config(&config, store);

    server::serve(state, &config).await
}
