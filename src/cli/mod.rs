pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "taskboard-api")]
#[command(about = "Taskboard API - projects, tasks and role-scoped dashboards")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Create PostgreSQL tables and indexes, then exit")]
    Migrate,
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve(Default::default())) {
        Commands::Serve(args) => commands::serve::handle(args, config).await,
        Commands::Migrate => commands::migrate::handle(config).await,
    }
}
