use clap::Args;
use serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use std::time::Duration;

/// Persisted state of the tool, stored as `.migrate.json`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MigrateConfig {
    /// Directory holding migration units, relative to the config file
    pub basepath: String,

    /// Environment name -> connection descriptor
    #[serde(default)]
    pub connection: IndexMap<String, String>,

    /// Environment name -> marker
    #[serde(default)]
    pub current_timestamp: IndexMap<String, i64>,

    /// Logical model name -> model definition path
    #[serde(default)]
    pub models: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revert_marker: Option<RevertMarker>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_timeout_secs: Option<u64>,

    /// Keys this tool does not use, written back untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Marker written after a unit is reverted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RevertMarker {
    /// Reverted key minus one
    #[default]
    Decrement,
    /// Key of the next older selected unit
    PreviousKey,
}

/// CLI overrides for a single run
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Abort a migration that runs longer than this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// How the marker moves when a migration is reverted
    #[arg(long, value_enum)]
    pub revert_marker: Option<RevertMarker>,
}

/// Resolved settings for one run, defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub environment: String,
    pub step_timeout: Option<Duration>,
    pub revert_marker: RevertMarker,
}
