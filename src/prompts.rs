use crate::sql::connection::resolve_descriptor;
use anyhow::Result;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;

pub fn prompt_required_string_with_validation<F>(
    value: Option<&str>,
    prompt_message: &str,
    validator: F,
) -> Result<String>
where
    F: Fn(&str) -> Result<(), String>,
{
    match value {
        Some(val) => {
            if let Err(e) = validator(val) {
                return Err(anyhow::anyhow!("Invalid value '{}': {}", val, e));
            }
            Ok(val.to_string())
        }
        None => {
            let input: String = Input::new()
                .with_prompt(prompt_message)
                .validate_with(|input: &String| validator(input.trim()))
                .interact_text()?;

            Ok(input.trim().to_string())
        }
    }
}

/// Prompt for a value that has a sensible default
pub fn prompt_string_with_default(prompt_message: &str, default: &str) -> Result<String> {
    let input: String = Input::new()
        .with_prompt(prompt_message)
        .default(default.to_string())
        .interact_text()?;

    Ok(input.trim().to_string())
}

/// Prompt for the default environment's connection string.
/// The connection is tested; the user may keep an unreachable one.
pub async fn prompt_connection_descriptor() -> Result<String> {
    loop {
        let descriptor: String = Input::new()
            .with_prompt("Enter connection string for default environment (or $VAR)")
            .interact_text()?;

        let descriptor = descriptor.trim();
        if descriptor.is_empty() {
            println!("❌ Connection string cannot be empty");
            continue;
        }

        print!("🔄 Testing connection...");
        match test_database_connection(descriptor).await {
            Ok(()) => {
                println!(" ✅");
                return Ok(descriptor.to_string());
            }
            Err(e) => {
                println!(" ❌");
                println!("   Connection failed: {}", e);
                let keep = Confirm::new()
                    .with_prompt("Use it anyway?")
                    .default(false)
                    .interact()?;

                if keep {
                    return Ok(descriptor.to_string());
                }
            }
        }
    }
}

/// Test database connection
async fn test_database_connection(descriptor: &str) -> Result<()> {
    let url = resolve_descriptor(descriptor)?;
    let pool = PgPool::connect(&url).await?;

    // Simple test query
    sqlx::query("SELECT 1").fetch_one(&pool).await?;

    pool.close().await;
    Ok(())
}
