use crate::bridge::ExecutionBridge;
use crate::config::{RunArgs, RunSettingsBuilder, config_root};
use crate::constants::DEFAULT_ENVIRONMENT;
use crate::error::MigrateError;
use crate::migration::{Direction, StepCount, resolve};
use crate::progress::RunReporter;
use crate::sequencer::{RunSummary, Sequencer, planned_units};
use crate::sql::{SqlUnitLoader, connect_lazy};
use crate::state::{FileStateStore, StateStore};
use crate::unit::{FileModelLoader, ModelResolver};
use anyhow::Result;
use clap::Args;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Arguments shared by `up` and `down`
#[derive(Args, Debug, Clone, Default)]
pub struct MigrateArgs {
    /// Number of migrations to run, or `all`
    pub count: Option<StepCount>,

    /// Which environment to use
    #[arg(long, short = 'e', default_value = DEFAULT_ENVIRONMENT)]
    pub environment: String,

    /// Print the migrations that would run and stop
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub run: RunArgs,
}

impl MigrateArgs {
    /// `up` with no subcommand: every pending migration on the default environment
    pub fn all_pending() -> Self {
        Self {
            count: Some(StepCount::Unbounded),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            ..Self::default()
        }
    }
}

/// Apply (`Up`) or revert (`Down`) migrations for one environment.
/// Returns `None` when nothing was selected or on a dry run.
pub async fn cmd_migrate_apply(
    config_file: &Path,
    direction: Direction,
    args: &MigrateArgs,
    quiet: bool,
) -> Result<Option<RunSummary>> {
    let mut store = FileStateStore::open(config_file)?;
    let config = store.config().clone();
    let root_dir = config_root(config_file);

    let settings = RunSettingsBuilder::new()
        .with_file(&config)
        .with_cli_args(args.run.clone())
        .with_environment(&args.environment)
        .resolve();
    let descriptor = config.connection_for(&settings.environment)?;

    let marker = store.read(&settings.environment)?;
    let units = resolve(&config.basepath_in(&root_dir), direction, marker)?;
    let count = args.count.unwrap_or_default();
    let reporter = RunReporter::new(quiet);

    if units.is_empty() || count.is_exhausted() {
        reporter.nothing_to_do(direction);
        return Ok(None);
    }

    if args.dry_run {
        println!(
            "Would run {} on '{}' from marker {}:",
            direction, settings.environment, marker
        );
        for unit in planned_units(direction, count, &units) {
            println!("  {}", unit.name);
        }
        return Ok(None);
    }

    let pool = connect_lazy(descriptor)?;
    let loader = SqlUnitLoader::new(pool.clone());
    let models = Arc::new(ModelResolver::new(
        config.models.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Arc::new(FileModelLoader::new(&root_dir)),
    ));

    info!(
        "Migrating {} on '{}' from marker {}",
        direction, settings.environment, marker
    );
    let started = Instant::now();
    let result = Sequencer::new(&settings.environment, &mut store, &loader, models)
        .with_bridge(ExecutionBridge::new(settings.step_timeout))
        .with_revert_marker(settings.revert_marker)
        .with_reporter(reporter.clone())
        .run(direction, count, units)
        .await;
    pool.close().await;

    let summary = result.map_err(|e| explain_failure(e, &settings.environment, config_file))?;
    reporter.summary(summary.steps.len(), summary.marker, started.elapsed());
    Ok(Some(summary))
}

/// Point the operator at the file when a unit ran but its marker was lost
fn explain_failure(error: MigrateError, environment: &str, config_file: &Path) -> anyhow::Error {
    if !error.is_unrecorded_step() {
        return error.into();
    }

    anyhow::Error::new(error).context(format!(
        "Set current_timestamp.{} in {} to match the database before running again",
        environment,
        config_file.display()
    ))
}
