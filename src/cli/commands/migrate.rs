use anyhow::Context;
use serde_json::json;

use crate::cli::{open_store, utils::output_success, OutputFormat};
use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    DatabaseManager::migrate(store.pool())
        .await
        .context("Migration failed")?;

    output_success(
        output_format,
        "Database schema is up to date",
        Some(json!({ "migrations": crate::database::manager::MIGRATOR.iter().count() })),
    )
}
