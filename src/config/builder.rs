use crate::config::types::*;
use std::time::Duration;

/// Resolves run settings from the config file and CLI overrides.
/// CLI values win over file values, which win over defaults.
#[derive(Debug, Default)]
pub struct RunSettingsBuilder {
    environment: Option<String>,
    file_timeout_secs: Option<u64>,
    file_revert_marker: Option<RevertMarker>,
    cli: RunArgs,
}

impl RunSettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, config: &MigrateConfig) -> Self {
        self.file_timeout_secs = config.step_timeout_secs;
        self.file_revert_marker = config.revert_marker;
        self
    }

    pub fn with_cli_args(mut self, args: RunArgs) -> Self {
        self.cli = args;
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn resolve(self) -> RunSettings {
        let defaults = RunSettings::default();

        // A zero timeout would abort every step, treat it as "no timeout"
        let step_timeout = self
            .cli
            .timeout
            .or(self.file_timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        RunSettings {
            environment: self.environment.unwrap_or(defaults.environment),
            step_timeout,
            revert_marker: self
                .cli
                .revert_marker
                .or(self.file_revert_marker)
                .unwrap_or(defaults.revert_marker),
        }
    }
}
