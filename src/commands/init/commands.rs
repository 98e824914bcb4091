use anyhow::Result;
use console::style;
use std::path::Path;

use super::InitArgs;
use crate::config::{MigrateConfig, save_config};
use crate::constants::DEFAULT_BASEPATH;
use crate::error::MigrateError;
use crate::prompts::{prompt_connection_descriptor, prompt_string_with_default};

// Descriptor used by `--defaults` when no connection is given
const DEFAULT_CONNECTION_DESCRIPTOR: &str = "$DATABASE_URL";

/// Write a fresh configuration file, prompting for anything not given on the
/// command line
pub async fn cmd_init_with_args(config_file: &Path, args: &InitArgs) -> Result<()> {
    if config_file.exists() {
        return Err(MigrateError::ConfigExists {
            path: config_file.to_path_buf(),
        }
        .into());
    }

    let basepath = match (&args.basepath, args.defaults) {
        (Some(basepath), _) => basepath.clone(),
        (None, true) => DEFAULT_BASEPATH.to_string(),
        (None, false) => {
            prompt_string_with_default("Enter migrations directory", DEFAULT_BASEPATH)?
        }
    };

    let connection = match (&args.connection, args.defaults) {
        (Some(connection), _) => connection.clone(),
        (None, true) => DEFAULT_CONNECTION_DESCRIPTOR.to_string(),
        (None, false) => prompt_connection_descriptor().await?,
    };

    let config = MigrateConfig::new(&basepath, &connection);
    save_config(config_file, &config)?;

    println!(
        "{}",
        style(format!(
            "{} file created!\nEdit it to include your models definitions",
            config_file.display()
        ))
        .green()
    );
    Ok(())
}
