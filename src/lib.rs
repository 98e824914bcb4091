//! Timestamp-ordered migration runner.
//!
//! Units live in one directory as `<ordering key>-<slug>.<ext>`. Each
//! environment has a marker; `up` applies units above it, `down` reverts
//! units at or below it, and the marker is persisted after every unit.

pub mod bridge;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod migration;
pub mod progress;
pub mod prompts;
pub mod sequencer;
pub mod sql;
pub mod state;
pub mod unit;

pub use bridge::ExecutionBridge;
pub use error::{MigrateError, MigrateResult};
pub use migration::{Direction, ParsedUnit, StepCount};
pub use sequencer::{RunSummary, Sequencer};
pub use state::{FileStateStore, StateStore};
