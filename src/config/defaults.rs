use crate::config::types::*;
use crate::constants::{DEFAULT_BASEPATH, DEFAULT_ENVIRONMENT, INITIAL_MARKER};
use indexmap::IndexMap;

impl Default for MigrateConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASEPATH, "")
    }
}

impl MigrateConfig {
    /// Fresh configuration as written by `init`
    pub fn new(basepath: &str, default_connection: &str) -> Self {
        Self {
            basepath: basepath.to_string(),
            connection: IndexMap::from([(
                DEFAULT_ENVIRONMENT.to_string(),
                default_connection.to_string(),
            )]),
            current_timestamp: IndexMap::from([(DEFAULT_ENVIRONMENT.to_string(), INITIAL_MARKER)]),
            models: IndexMap::new(),
            revert_marker: None,
            step_timeout_secs: None,
            extra: serde_json::Map::new(),
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            step_timeout: None,
            revert_marker: RevertMarker::default(),
        }
    }
}
