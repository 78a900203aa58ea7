use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::ensure_schema(&pool).await?;
    pool.close().await;

    println!("Schema is up to date");
    Ok(())
}
