//! Applies or reverts a selected list of units, one at a time.
//!
//! The queue is ascending by ordering key. Up runs take from the head, down
//! runs take from the tail so the newest unit is reverted first. A run ends
//! when the step count is used up or the queue is empty. Each unit must
//! finish and have its marker written before the next unit starts.

use crate::bridge::ExecutionBridge;
use crate::config::RevertMarker;
use crate::constants::INITIAL_MARKER;
use crate::error::{MigrateError, MigrateResult};
use crate::migration::{Direction, ParsedUnit, StepCount};
use crate::progress::RunReporter;
use crate::state::StateStore;
use crate::unit::{ModelResolver, UnitContext, UnitLoader};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// A unit that ran and whose marker was recorded
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedStep {
    pub key: i64,
    pub name: String,
    pub marker: i64,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub direction: Direction,
    pub steps: Vec<CompletedStep>,
    /// Marker after the last completed step
    pub marker: i64,
}

impl RunSummary {
    pub fn keys(&self) -> Vec<i64> {
        self.steps.iter().map(|s| s.key).collect()
    }
}

/// Units a run would execute, in execution order, assuming none fails
pub fn planned_units(
    direction: Direction,
    count: StepCount,
    units: &[ParsedUnit],
) -> Vec<&ParsedUnit> {
    let limit = match count {
        StepCount::Bounded(n) => usize::try_from(n).unwrap_or(usize::MAX),
        StepCount::Unbounded => usize::MAX,
    };

    match direction {
        Direction::Up => units.iter().take(limit).collect(),
        Direction::Down => units.iter().rev().take(limit).collect(),
    }
}

pub struct Sequencer<'a> {
    environment: String,
    store: &'a mut dyn StateStore,
    loader: &'a dyn UnitLoader,
    models: Arc<ModelResolver>,
    bridge: ExecutionBridge,
    revert_marker: RevertMarker,
    reporter: RunReporter,
}

impl<'a> Sequencer<'a> {
    pub fn new(
        environment: impl Into<String>,
        store: &'a mut dyn StateStore,
        loader: &'a dyn UnitLoader,
        models: Arc<ModelResolver>,
    ) -> Self {
        Self {
            environment: environment.into(),
            store,
            loader,
            models,
            bridge: ExecutionBridge::default(),
            revert_marker: RevertMarker::default(),
            reporter: RunReporter::new(true),
        }
    }

    pub fn with_bridge(mut self, bridge: ExecutionBridge) -> Self {
        self.bridge = bridge;
        self
    }

    pub fn with_revert_marker(mut self, revert_marker: RevertMarker) -> Self {
        self.revert_marker = revert_marker;
        self
    }

    pub fn with_reporter(mut self, reporter: RunReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub async fn run(
        &mut self,
        direction: Direction,
        count: StepCount,
        units: Vec<ParsedUnit>,
    ) -> MigrateResult<RunSummary> {
        let mut queue: VecDeque<ParsedUnit> = units.into();
        let mut remaining = count;
        let mut summary = RunSummary {
            direction,
            steps: Vec::new(),
            marker: self.store.read(&self.environment)?,
        };

        info!(
            "Running {} for environment '{}': {} candidate(s), count {}, step timeout {:?}",
            direction,
            self.environment,
            queue.len(),
            count,
            self.bridge.step_timeout()
        );

        while !remaining.is_exhausted() {
            let next = match direction {
                Direction::Up => queue.pop_front(),
                Direction::Down => queue.pop_back(),
            };
            let Some(unit) = next else {
                break;
            };

            let started = Instant::now();
            self.reporter.start_step(&unit.name, direction);

            let marker = match self.step(direction, &unit, &queue).await {
                Ok(marker) => marker,
                Err(e) => {
                    self.reporter.fail_step(&unit.name, &e);
                    return Err(e);
                }
            };

            let duration = started.elapsed();
            self.reporter.complete_step(marker, duration);
            info!("Finished {} of {} in {:?}", direction, unit.name, duration);

            summary.marker = marker;
            summary.steps.push(CompletedStep {
                key: unit.key,
                name: unit.name,
                marker,
                duration,
            });
            remaining = remaining.decrement();
        }

        Ok(summary)
    }

    /// Execute one unit and record its marker. `rest` is what is left of the
    /// queue after the unit was taken from it.
    async fn step(
        &mut self,
        direction: Direction,
        unit: &ParsedUnit,
        rest: &VecDeque<ParsedUnit>,
    ) -> MigrateResult<i64> {
        let executable = self
            .loader
            .load(unit)
            .map_err(|e| MigrateError::unit_load(&unit.name, e))?;

        let ctx = UnitContext::new(&self.environment, &unit.name, self.models.clone());
        self.bridge.invoke(executable, direction, ctx).await?;

        let marker = self.marker_after(direction, unit.key, rest);
        if let Err(e) = self.store.write(&self.environment, marker) {
            error!(
                "Migration {} ran {} but marker {} could not be recorded for '{}'",
                unit.name, direction, marker, self.environment
            );
            return Err(e);
        }

        Ok(marker)
    }

    fn marker_after(&self, direction: Direction, key: i64, rest: &VecDeque<ParsedUnit>) -> i64 {
        match (direction, self.revert_marker) {
            (Direction::Up, _) => key,
            (Direction::Down, RevertMarker::Decrement) => key.saturating_sub(1),
            // Down runs select every key up to the marker, so the new tail is
            // the next older unit
            (Direction::Down, RevertMarker::PreviousKey) => rest
                .back()
                .map(|u| u.key)
                .unwrap_or_else(|| INITIAL_MARKER.min(key.saturating_sub(1))),
        }
    }
}
