pub mod builder;
pub mod defaults;
pub mod types;


pub use builder::RunSettingsBuilder;
pub use types::*;

use crate::error::{MigrateError, MigrateResult};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Directory that relative paths in a config file are resolved against
pub fn config_root(config_file: &Path) -> PathBuf {
    match config_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Load the configuration file and the directory it lives in
pub fn load_config(config_file: &Path) -> MigrateResult<(MigrateConfig, PathBuf)> {
    if !config_file.exists() {
        return Err(MigrateError::ConfigMissing {
            path: config_file.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(config_file)
        .map_err(|e| MigrateError::config_invalid(config_file, e))?;
    let config: MigrateConfig = serde_json::from_str(&contents)
        .map_err(|e| MigrateError::config_invalid(config_file, e))?;

    Ok((config, config_root(config_file)))
}

/// Write the whole configuration as a snapshot.
///
/// The document goes to a temporary file next to the target, is flushed to
/// disk and then renamed over it, so readers see the old or the new
/// snapshot and never a partial one.
pub fn save_config(config_file: &Path, config: &MigrateConfig) -> std::io::Result<()> {
    let mut data = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;
    data.push('\n');

    let dir = config_root(config_file);
    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    tmp.write_all(data.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(config_file).map_err(|e| e.error)?;

    Ok(())
}

impl MigrateConfig {
    /// Absolute or config-relative location of the migration units
    pub fn basepath_in(&self, root_dir: &Path) -> PathBuf {
        let basepath = Path::new(&self.basepath);
        if basepath.is_absolute() {
            basepath.to_path_buf()
        } else {
            root_dir.join(basepath)
        }
    }

    /// Connection descriptor for an environment
    pub fn connection_for(&self, environment: &str) -> MigrateResult<&str> {
        self.connection
            .get(environment)
            .map(String::as_str)
            .ok_or_else(|| MigrateError::UnknownEnvironment {
                environment: environment.to_string(),
            })
    }

    /// Marker for an environment, initial marker when none was recorded
    pub fn marker_for(&self, environment: &str) -> i64 {
        self.current_timestamp
            .get(environment)
            .copied()
            .unwrap_or(crate::constants::INITIAL_MARKER)
    }
}
