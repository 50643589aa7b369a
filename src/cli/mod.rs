pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use anyhow::Context;

use crate::config::DatabaseConfig;
use crate::database::{schema, DatabaseManager, PgUserStore, UserStore};

#[derive(Parser)]
#[command(name = "pms")]
#[command(about = "Matrix PMS administration - user accounts and access tokens")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create, list and manage user accounts")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Issue access tokens")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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

    match cli.command {
        Commands::User { cmd } => {
            let users = open_store(&DatabaseConfig::from_env()?).await?;
            commands::user::handle(cmd, users.as_ref(), output_format).await
        }
        Commands::Token { cmd } => commands::token::handle(cmd, output_format).await,
    }
}

/// Postgres-backed store for commands that touch user records
pub async fn open_store(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn UserStore>> {
    let pool = DatabaseManager::connect(config)
        .await
        .context("failed to connect to database")?;
    schema::ensure_schema(&pool).await.context("failed to prepare users table")?;
    Ok(Arc::new(PgUserStore::new(pool)))
}
