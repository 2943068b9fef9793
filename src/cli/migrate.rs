//! Migrate command - applies the schema and exits

use anyhow::Context;
use tracing::info;

use crate::infrastructure::storage::{connect_pool, run_schema_migrations, PostgresMigrator};

pub async fn run() -> anyhow::Result<()> {
    let config = super::serve::load_config()?;

    let url = config
        .database
        .url
        .as_deref()
        .context("database.url must be set to run migrations (APP__DATABASE__URL)")?;

    let pool = connect_pool(&crate::postgres_config(&config, url)).await?;
    let applied = run_schema_migrations(&pool).await?;
    let version = PostgresMigrator::new(pool).current_version().await?;

    info!(applied, version = ?version, "Migrations complete");
    Ok(())
}
