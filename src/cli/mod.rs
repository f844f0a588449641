pub mod commands;
pub mod utils;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, StoreBackend};
use crate::database::{DatabaseManager, PgStore};

#[derive(Parser)]
#[command(name = "tareas")]
#[command(about = "Tareas CLI - administration for the Tareas API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "User account management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Issue a bearer token for an existing user")]
    Token {
        #[arg(help = "Username")]
        username: String,
    },

    #[command(about = "Check a running server through its /health endpoint")]
    Health {
        #[arg(long, help = "Server base URL (defaults to the configured bind address)")]
        url: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = crate::config::config();

    match cli.command {
        Commands::Migrate => commands::migrate::handle(config, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, config, output_format).await,
        Commands::Token { username } => commands::token::handle(&username, config, output_format).await,
        Commands::Health { url } => commands::health::handle(url, config, output_format).await,
    }
}

/// Admin commands act on the persistent store directly
pub(crate) async fn open_store(config: &AppConfig) -> anyhow::Result<PgStore> {
    if config.database.backend != StoreBackend::Postgres {
        bail!("The memory store is per-process; set TAREAS_STORE=postgres to administer a database");
    }
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("Failed to connect to the database")?;
    Ok(PgStore::new(pool))
}
