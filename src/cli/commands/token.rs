use serde_json::json;
use std::sync::Arc;

use super::user::describe;
use crate::cli::{open_store, utils::{output_detail, output_success}, OutputFormat};
use crate::config::AppConfig;
use crate::services::UserService;

/// Issue a token without a password, for operators and scripted tests
pub async fn handle(username: &str, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    config.validate()?;
    let store = open_store(config).await?;
    let users = UserService::new(Arc::new(store), config.security.clone());

    let grant = users.token_for(username).await.map_err(describe)?;

    output_detail(output_format, "token", &grant.token);
    output_detail(output_format, "expires_in", grant.expires_in);
    output_success(
        output_format,
        &format!("Issued token for '{}'", grant.user.username),
        Some(json!({
            "token": grant.token,
            "token_type": grant.token_type,
            "expires_in": grant.expires_in,
        })),
    )
}
