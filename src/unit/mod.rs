//! Capabilities the orchestration core uses to reach migration units.
//!
//! The core never knows how a unit is stored or what it does. It asks a
//! [`UnitLoader`] for a [`MigrationUnit`] and runs one of its entry points
//! with a [`UnitContext`].

pub mod models;

pub use models::{FileModelLoader, ModelDefinition, ModelHandle, ModelLoader, ModelResolver};

use crate::error::MigrateResult;
use crate::migration::{Direction, ParsedUnit};
use futures_util::future::BoxFuture;
use std::sync::Arc;

pub type UnitFuture<'a> = BoxFuture<'a, anyhow::Result<()>>;

/// An executable migration with a forward and a backward entry point.
///
/// Each entry point returns a future that resolves once, with `Ok` when the
/// unit finished and `Err` to signal failure.
pub trait MigrationUnit: Send + Sync {
    fn up<'a>(&'a self, ctx: &'a UnitContext) -> UnitFuture<'a>;

    fn down<'a>(&'a self, ctx: &'a UnitContext) -> UnitFuture<'a>;

    fn run<'a>(&'a self, direction: Direction, ctx: &'a UnitContext) -> UnitFuture<'a> {
        match direction {
            Direction::Up => self.up(ctx),
            Direction::Down => self.down(ctx),
        }
    }
}

/// Turns a discovered unit into something executable
pub trait UnitLoader: Send + Sync {
    fn load(&self, unit: &ParsedUnit) -> anyhow::Result<Arc<dyn MigrationUnit>>;
}

/// What a unit sees while it runs
#[derive(Clone)]
pub struct UnitContext {
    environment: String,
    unit_name: String,
    models: Arc<ModelResolver>,
}

impl UnitContext {
    pub fn new(
        environment: impl Into<String>,
        unit_name: impl Into<String>,
        models: Arc<ModelResolver>,
    ) -> Self {
        Self {
            environment: environment.into(),
            unit_name: unit_name.into(),
            models,
        }
    }

    /// Resolve a named model from the configuration, loading it on first use
    pub fn model(&self, name: &str) -> MigrateResult<ModelHandle> {
        self.models.model(name)
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }
}
