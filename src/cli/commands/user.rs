use anyhow::{anyhow, bail, Context};
use clap::Subcommand;
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::cli::{open_store, utils::{output_detail, output_success}, OutputFormat};
use crate::config::AppConfig;
use crate::services::{ServiceError, UserService};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user (ignores SECURITY_ALLOW_REGISTRATION)")]
    Create {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Delete a user and all of their tareas")]
    Delete {
        #[arg(help = "Username")]
        username: String,
    },
}

pub async fn handle(cmd: UserCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let users = UserService::new(Arc::new(store), config.security.clone());

    match cmd {
        UserCommands::Create { username, password } => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };

            let user = users.create_user(&username, &password).await.map_err(describe)?;
            output_detail(output_format, "id", user.id);
            output_success(
                output_format,
                &format!("Created user '{}'", user.username),
                Some(json!({ "id": user.id, "username": user.username })),
            )
        }
        UserCommands::Delete { username } => {
            users.delete_user(&username).await.map_err(describe)?;
            output_success(
                output_format,
                &format!("Deleted user '{}'", username),
                Some(json!({ "username": username })),
            )
        }
    }
}

fn read_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).context("Failed to read password")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("No password given");
    }
    Ok(password)
}

/// Render service errors with their field details for the terminal
pub(crate) fn describe(err: ServiceError) -> anyhow::Error {
    match err {
        ServiceError::Validation(v) => {
            let details: Vec<String> = v.errors.iter().map(|e| format!("{}: {}", e.field, e.message)).collect();
            anyhow!("Invalid input ({})", details.join("; "))
        }
        ServiceError::NotFound => anyhow!("No such user"),
        other => anyhow!(other),
    }
}
