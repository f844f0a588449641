use anyhow::{bail, Context};
use serde_json::{json, Value};
use std::time::Duration;

use crate::cli::{utils::{output_detail, output_success}, OutputFormat};
use crate::config::AppConfig;

pub async fn handle(url: Option<String>, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let base = url.unwrap_or_else(|| default_base_url(config));
    let endpoint = format!("{}/health", base.trim_end_matches('/'));

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let response = client
        .get(&endpoint)
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", endpoint))?;

    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if !status.is_success() {
        bail!("{} answered {} ({})", endpoint, status, body);
    }

    output_detail(output_format, "status", body["status"].as_str().unwrap_or("unknown"));
    output_detail(output_format, "store", body["store"].as_str().unwrap_or("unknown"));
    output_success(
        output_format,
        &format!("{} is healthy", base),
        Some(json!({ "url": base, "health": body })),
    )
}

fn default_base_url(config: &AppConfig) -> String {
    let host = match config.server.host.as_str() {
        "0.0.0.0" | "::" => "127.0.0.1",
        other => other,
    };
    format!("http://{}:{}", host, config.server.port)
}
