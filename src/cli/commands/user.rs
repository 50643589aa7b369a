use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::{DatabaseError, NewUser, User, UserStatus, UserStore};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user account")]
    Create {
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, help = "Phone number (07XXXXXXXX or +2547XXXXXXXX)")]
        phone: String,
        #[arg(long, help = "Initial password")]
        password: String,
        #[arg(long, help = "User level id")]
        level: Option<Uuid>,
        #[arg(long, help = "Landlord id")]
        landlord: Option<Uuid>,
        #[arg(long, help = "Apartment id")]
        apartment: Option<Uuid>,
    },

    #[command(about = "List all users")]
    List,

    #[command(about = "Replace a user's password")]
    SetPassword {
        #[arg(long, help = "Phone number of the account")]
        phone: String,
        #[arg(long, help = "New password")]
        password: String,
    },

    #[command(about = "Allow a user to sign in")]
    Activate {
        #[arg(long, help = "Phone number of the account")]
        phone: String,
    },

    #[command(about = "Block a user from signing in; existing tokens stop resolving")]
    Deactivate {
        #[arg(long, help = "Phone number of the account")]
        phone: String,
    },
}

pub async fn handle(cmd: UserCommands, users: &dyn UserStore, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Create { name, phone, password, level, landlord, apartment } => {
            let phone = parse_phone(&phone)?;
            if name.trim().is_empty() {
                anyhow::bail!("Name is required");
            }
            if password.trim().is_empty() {
                anyhow::bail!("Password is required");
            }

            let user = users
                .create(NewUser {
                    name: name.trim().to_string(),
                    phone,
                    password: hash_password(&password)?,
                    user_level_id: level,
                    landlord_id: landlord,
                    apartment_id: apartment,
                    created_by: None,
                })
                .await
                .map_err(|e| match e {
                    DatabaseError::Conflict(_) => anyhow::anyhow!("A user with that phone number already exists"),
                    other => other.into(),
                })?;

            output_success(
                &output_format,
                &format!("Created user '{}' ({})", user.name, user.id),
                Some(json!({ "user": user })),
            )
        }
        UserCommands::List => {
            let all = users.list().await?;
            output_users(&output_format, &all)
        }
        UserCommands::SetPassword { phone, password } => {
            if password.trim().is_empty() {
                anyhow::bail!("Password is required");
            }
            let user = find_user(users, &phone).await?;
            let hash = hash_password(&password)?;
            users.update_password(user.id, &hash, None).await?;

            output_success(
                &output_format,
                &format!("Password updated for '{}'", user.name),
                Some(json!({ "id": user.id })),
            )
        }
        UserCommands::Activate { phone } => set_status(users, &phone, UserStatus::Active, &output_format).await,
        UserCommands::Deactivate { phone } => set_status(users, &phone, UserStatus::Inactive, &output_format).await,
    }
}

async fn find_user(users: &dyn UserStore, phone: &str) -> anyhow::Result<User> {
    let phone = parse_phone(phone)?;
    users
        .find_by_phone(&phone)
        .await?
        .ok_or_else(|| anyhow::anyhow!("No user with phone {}", phone))
}

async fn set_status(
    users: &dyn UserStore,
    phone: &str,
    status: UserStatus,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    let user = find_user(users, phone).await?;
    let updated = users.set_status(user.id, status, None).await?;

    output_success(
        output_format,
        &format!("User '{}' is now {}", updated.name, updated.status),
        Some(json!({ "id": updated.id, "status": updated.status })),
    )
}
