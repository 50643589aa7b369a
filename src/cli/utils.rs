use serde_json::{json, Value};

use crate::auth::phone::{is_valid_phone, normalize_phone};
use crate::cli::OutputFormat;
use crate::database::User;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Print users as a table or a JSON array
pub fn output_users(output_format: &OutputFormat, users: &[User]) -> anyhow::Result<()> {
    if users.is_empty() {
        return output_empty_collection(output_format, "users", "No users found");
    }

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "users": users }))?);
        }
        OutputFormat::Text => {
            println!("{:<38} {:<25} {:<14} {:<10} {}", "ID", "NAME", "PHONE", "STATUS", "CREATED");
            println!("{}", "-".repeat(100));

            for user in users {
                println!(
                    "{:<38} {:<25} {:<14} {:<10} {}",
                    user.id,
                    user.name,
                    user.phone,
                    user.status,
                    user.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
    }
    Ok(())
}

/// Validate a phone typed on the command line and return its stored form
pub fn parse_phone(phone: &str) -> anyhow::Result<String> {
    if !is_valid_phone(phone) {
        anyhow::bail!("Invalid Kenyan phone format (e.g. +2547XXXXXXXX or 07XXXXXXXX): {}", phone);
    }
    Ok(normalize_phone(phone))
}
