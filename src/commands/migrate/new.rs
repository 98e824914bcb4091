use crate::config::load_config;
use crate::constants::{
    DOWN_SECTION_MARKER, MAX_DESCRIPTION_LEN, SQL_UNIT_EXTENSION, UP_SECTION_MARKER,
};
use crate::migration::discover_units;
use crate::prompts::prompt_required_string_with_validation;
use anyhow::{Context, Result};
use chrono::Utc;
use console::style;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Scaffold a new SQL unit in the configured migrations directory
pub async fn cmd_migrate_new(config_file: &Path, description: Option<&str>) -> Result<PathBuf> {
    let (config, root_dir) = load_config(config_file)?;

    let description = prompt_required_string_with_validation(
        description,
        "Enter migration description",
        validate_description,
    )?;

    let basepath = config.basepath_in(&root_dir);
    std::fs::create_dir_all(&basepath)
        .with_context(|| format!("Failed to create {}", basepath.display()))?;

    let newest = discover_units(&basepath)?.last().map(|u| u.key);
    let key = next_ordering_key(Utc::now().timestamp_millis(), newest);
    debug!("Using ordering key {} (newest existing: {:?})", key, newest);

    let filename = format!("{}-{}.{}", key, slugify(&description), SQL_UNIT_EXTENSION);
    let path = basepath.join(&filename);

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .with_context(|| format!("Failed to create migration file: {}", path.display()))?;
    file.write_all(render_template(&description).as_bytes())?;

    println!("{}", style(format!("Created migration {}", filename)).green());
    Ok(path)
}

fn validate_description(input: &str) -> Result<(), String> {
    if input.is_empty() {
        return Err("Description cannot be empty".to_string());
    }
    if input.len() > MAX_DESCRIPTION_LEN {
        return Err(format!(
            "Description must be {} characters or less",
            MAX_DESCRIPTION_LEN
        ));
    }
    if slugify(input).is_empty() {
        return Err("Description must contain at least one letter or digit".to_string());
    }
    Ok(())
}

/// Keys must strictly increase in creation order, even if the clock does not
pub fn next_ordering_key(now_millis: i64, newest: Option<i64>) -> i64 {
    match newest {
        Some(newest) if newest >= now_millis => newest + 1,
        _ => now_millis,
    }
}

/// Lowercase, filesystem-safe form of a description
pub fn slugify(description: &str) -> String {
    let mut slug = String::with_capacity(description.len());
    for c in description.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

fn render_template(description: &str) -> String {
    format!(
        "-- Migration: {description}\n\
         -- Created: {created}\n\
         --\n\
         -- Refer to configured models as {{{{model:name}}}}.\n\
         \n\
         {up}\n\
         \n\
         \n\
         {down}\n\
         \n",
        description = description,
        created = Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        up = UP_SECTION_MARKER,
        down = DOWN_SECTION_MARKER,
    )
}
