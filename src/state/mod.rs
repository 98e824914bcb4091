//! Per-environment marker persistence.
//!
//! The store is the only writer of markers. A run reads the marker once
//! before selection and writes it after every unit that succeeded.

use crate::config::{MigrateConfig, load_config, save_config};
use crate::error::{MigrateError, MigrateResult};
use std::path::{Path, PathBuf};
use tracing::debug;

pub trait StateStore: Send {
    fn read(&self, environment: &str) -> MigrateResult<i64>;

    /// Persist a new marker. Returns only once the write is durable or failed.
    fn write(&mut self, environment: &str, marker: i64) -> MigrateResult<()>;
}

/// Marker store backed by the `.migrate.json` snapshot.
///
/// Owns the only mutable copy of the configuration for the duration of a run.
#[derive(Debug)]
pub struct FileStateStore {
    path: PathBuf,
    config: MigrateConfig,
}

impl FileStateStore {
    pub fn open(path: &Path) -> MigrateResult<Self> {
        let (config, _) = load_config(path)?;
        Ok(Self::new(path, config))
    }

    pub fn new(path: &Path, config: MigrateConfig) -> Self {
        Self {
            path: path.to_path_buf(),
            config,
        }
    }

    pub fn config(&self) -> &MigrateConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStateStore {
    fn read(&self, environment: &str) -> MigrateResult<i64> {
        Ok(self.config.marker_for(environment))
    }

    fn write(&mut self, environment: &str, marker: i64) -> MigrateResult<()> {
        let previous = self
            .config
            .current_timestamp
            .insert(environment.to_string(), marker);

        if let Err(e) = save_config(&self.path, &self.config) {
            // Keep the in-memory copy equal to what is on disk
            match previous {
                Some(old) => self.config.current_timestamp.insert(environment.to_string(), old),
                None => self.config.current_timestamp.shift_remove(environment),
            };
            return Err(MigrateError::persistence(environment, marker, e));
        }

        debug!(
            "Recorded marker {} for environment '{}' in {}",
            marker,
            environment,
            self.path.display()
        );
        Ok(())
    }
}
