use anyhow::Context;
use chrono::Duration;
use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{IssuedToken, TokenIssuer};
use crate::cli::utils::output_success;
use crate::cli::{open_store, OutputFormat};
use crate::config::{AppConfig, MAX_TOKEN_TTL_MINUTES};
use crate::database::UserStore;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Sign an access token for an existing active user")]
    Issue {
        #[arg(long, help = "User id (token subject)")]
        user_id: Uuid,
        #[arg(long, help = "Lifetime in minutes (defaults to the configured TTL)")]
        ttl_minutes: Option<i64>,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Issue { user_id, ttl_minutes } => {
            let config = AppConfig::from_env().context("invalid configuration")?;
            let users = open_store(&config.database).await?;
            let issuer = TokenIssuer::new(&config.security.jwt_secret, config.security.token_ttl());

            let issued = issue_for(&issuer, users.as_ref(), user_id, ttl_minutes).await?;

            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    "Token issued",
                    Some(json!({
                        "token": issued.token,
                        "expires_at": issued.expires_at,
                        "expires_in": issued.expires_in_secs(),
                    })),
                ),
                OutputFormat::Text => {
                    println!("{}", issued.token);
                    eprintln!("expires {}", issued.expires_at.to_rfc3339());
                    Ok(())
                }
            }
        }
    }
}

pub async fn issue_for(
    issuer: &TokenIssuer,
    users: &dyn UserStore,
    user_id: Uuid,
    ttl_minutes: Option<i64>,
) -> anyhow::Result<IssuedToken> {
    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("No user with id {}", user_id))?;
    if !user.is_active() {
        anyhow::bail!("User {} is {}; tokens for it would not resolve", user.id, user.status);
    }

    let ttl = match ttl_minutes {
        Some(minutes) if (1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes) => Duration::minutes(minutes),
        Some(minutes) => anyhow::bail!("TTL must be between 1 and {} minutes, got {}", MAX_TOKEN_TTL_MINUTES, minutes),
        None => issuer.default_ttl(),
    };
    Ok(issuer.issue(user.id, ttl)?)
}
