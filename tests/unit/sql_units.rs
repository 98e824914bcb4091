use crate::helpers::fakes::{MemoryStore, models};
use anyhow::Result;
use std::fs;
use std::path::Path;
use stepmigrate::migration::discover_units;
use stepmigrate::sql::{SqlUnitLoader, connect_lazy};
use stepmigrate::{Direction, MigrateError, Sequencer, StateStore, StepCount};
use tempfile::TempDir;

const ENV: &str = "default";

// Nothing listens here; these units must finish without a connection
const UNREACHABLE: &str = "postgres://user:pw@127.0.0.1:1/none";

fn write_unit(dir: &Path, filename: &str, contents: &str) -> Result<()> {
    fs::write(dir.join(filename), contents)?;
    Ok(())
}

#[tokio::test]
async fn test_reverting_unit_without_down_section_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_unit(
        temp_dir.path(),
        "100-create-users.sql",
        "-- migrate:up\nCREATE TABLE users (id BIGINT);\n",
    )?;

    let loader = SqlUnitLoader::new(connect_lazy(UNREACHABLE)?);
    let mut store = MemoryStore::with_marker(ENV, 100);

    let result = Sequencer::new(ENV, &mut store, &loader, models(&[]))
        .run(
            Direction::Down,
            StepCount::Bounded(1),
            discover_units(temp_dir.path())?,
        )
        .await;

    match result {
        Err(MigrateError::UnitExecutionFailure {
            unit,
            direction,
            source,
        }) => {
            assert_eq!(unit, "100-create-users.sql");
            assert_eq!(direction, Direction::Down);
            assert!(source.to_string().contains("has no down section"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(store.read(ENV)?, 100);
    assert!(store.writes.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_empty_down_section_is_a_no_op() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_unit(
        temp_dir.path(),
        "100-create-users.sql",
        "-- migrate:up\nCREATE TABLE users (id BIGINT);\n-- migrate:down\n\n",
    )?;

    let loader = SqlUnitLoader::new(connect_lazy(UNREACHABLE)?);
    let mut store = MemoryStore::with_marker(ENV, 100);

    let summary = Sequencer::new(ENV, &mut store, &loader, models(&[]))
        .run(
            Direction::Down,
            StepCount::Bounded(1),
            discover_units(temp_dir.path())?,
        )
        .await?;

    assert_eq!(summary.keys(), vec![100]);
    assert_eq!(store.read(ENV)?, 99);
    Ok(())
}

#[tokio::test]
async fn test_unit_without_up_section_fails_to_load() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_unit(
        temp_dir.path(),
        "100-broken.sql",
        "-- migrate:down\nDROP TABLE users;\n",
    )?;

    let loader = SqlUnitLoader::new(connect_lazy(UNREACHABLE)?);
    let mut store = MemoryStore::with_marker(ENV, 0);

    let result = Sequencer::new(ENV, &mut store, &loader, models(&[]))
        .run(
            Direction::Up,
            StepCount::Unbounded,
            discover_units(temp_dir.path())?,
        )
        .await;

    assert!(matches!(
        result,
        Err(MigrateError::UnitLoad { ref unit, .. }) if unit == "100-broken.sql"
    ));
    assert_eq!(store.read(ENV)?, 0);
    Ok(())
}

#[tokio::test]
async fn test_non_sql_unit_is_rejected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_unit(temp_dir.path(), "100-seed.js", "module.exports = {};\n")?;

    let loader = SqlUnitLoader::new(connect_lazy(UNREACHABLE)?);
    let mut store = MemoryStore::with_marker(ENV, 0);

    let result = Sequencer::new(ENV, &mut store, &loader, models(&[]))
        .run(
            Direction::Up,
            StepCount::Unbounded,
            discover_units(temp_dir.path())?,
        )
        .await;

    assert!(matches!(result, Err(MigrateError::UnitLoad { .. })));
    assert!(store.writes.is_empty());
    Ok(())
}
