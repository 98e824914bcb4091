//! Runs one entry point of one unit and waits for it to complete.
//!
//! The entry point runs as its own tokio task. Its join handle resolves
//! exactly once: with the unit's result, with a panic, or not at all when the
//! optional step timeout expires first, in which case the task is aborted.

use crate::error::{MigrateError, MigrateResult};
use crate::migration::Direction;
use crate::unit::{MigrationUnit, UnitContext};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct ExecutionBridge {
    step_timeout: Option<Duration>,
}

impl ExecutionBridge {
    pub fn new(step_timeout: Option<Duration>) -> Self {
        Self { step_timeout }
    }

    pub fn step_timeout(&self) -> Option<Duration> {
        self.step_timeout
    }

    pub async fn invoke(
        &self,
        unit: Arc<dyn MigrationUnit>,
        direction: Direction,
        ctx: UnitContext,
    ) -> MigrateResult<()> {
        let unit_name = ctx.unit_name().to_string();
        debug!("Invoking {} on {}", direction, unit_name);

        let mut handle = tokio::spawn(async move { unit.run(direction, &ctx).await });

        let joined = match self.step_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    handle.abort();
                    warn!("Aborted {} of {} after {:?}", direction, unit_name, timeout);
                    return Err(MigrateError::UnitTimedOut {
                        unit: unit_name,
                        direction,
                        timeout,
                    });
                }
            },
            None => handle.await,
        };

        match joined {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(MigrateError::UnitExecutionFailure {
                unit: unit_name,
                direction,
                source: e.into(),
            }),
            Err(join_error) if join_error.is_panic() => Err(MigrateError::UnitPanicked {
                unit: unit_name,
                direction,
            }),
            Err(join_error) => Err(MigrateError::UnitExecutionFailure {
                unit: unit_name,
                direction,
                source: Box::new(join_error),
            }),
        }
    }
}
