//! Error taxonomy for a migration run.
//!
//! Every variant is fatal for the run that produced it. Command handlers turn
//! these into `anyhow::Error` and let `main` report them.

use crate::migration::Direction;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("Missing {} file. Type `stepmigrate init` to create.", .path.display())]
    ConfigMissing { path: PathBuf },

    #[error("{} already exists!", .path.display())]
    ConfigExists { path: PathBuf },

    #[error("Failed to read configuration from {}", .path.display())]
    ConfigInvalid {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("Environment '{environment}' has no connection configured")]
    UnknownEnvironment { environment: String },

    #[error("Cannot parse an ordering key from migration name '{name}'")]
    MalformedUnitName { name: String },

    #[error("Failed to list migrations in {}", .path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load migration {unit}")]
    UnitLoad {
        unit: String,
        #[source]
        source: BoxError,
    },

    #[error("Migration {unit} failed while running {direction}")]
    UnitExecutionFailure {
        unit: String,
        direction: Direction,
        #[source]
        source: BoxError,
    },

    #[error("Migration {unit} panicked while running {direction}")]
    UnitPanicked { unit: String, direction: Direction },

    #[error("Migration {unit} did not complete {direction} within {timeout:?}")]
    UnitTimedOut {
        unit: String,
        direction: Direction,
        timeout: Duration,
    },

    #[error("Model '{name}' is not defined in the configuration")]
    ModelNotFound { name: String },

    #[error("Failed to load model '{name}'")]
    ModelLoad {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error(
        "Failed to record marker {marker} for environment '{environment}'; \
         the migration was applied but is not recorded"
    )]
    PersistenceFailure {
        environment: String,
        marker: i64,
        #[source]
        source: BoxError,
    },
}

impl MigrateError {
    pub fn config_invalid(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        Self::ConfigInvalid {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn unit_load(unit: impl Into<String>, source: anyhow::Error) -> Self {
        Self::UnitLoad {
            unit: unit.into(),
            source: source.into(),
        }
    }

    pub fn persistence(
        environment: impl Into<String>,
        marker: i64,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::PersistenceFailure {
            environment: environment.into(),
            marker,
            source: source.into(),
        }
    }

    /// True when a unit's effects may be applied without a matching marker.
    pub fn is_unrecorded_step(&self) -> bool {
        matches!(self, Self::PersistenceFailure { .. })
    }
}

pub type MigrateResult<T> = std::result::Result<T, MigrateError>;
