use crate::config::{config_root, load_config};
use crate::migration::{ParsedUnit, discover_units};
use anyhow::Result;
use console::style;
use itertools::Itertools;
use std::path::Path;

/// Where one unit stands relative to an environment's marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitStatus {
    pub key: i64,
    pub name: String,
    pub applied: bool,
}

/// Units at or below the marker count as applied
pub fn unit_statuses(units: &[ParsedUnit], marker: i64) -> Vec<UnitStatus> {
    units
        .iter()
        .map(|u| UnitStatus {
            key: u.key,
            name: u.name.clone(),
            applied: u.key <= marker,
        })
        .collect()
}

pub async fn cmd_migrate_status(config_file: &Path, environment: &str) -> Result<()> {
    let (config, _) = load_config(config_file)?;
    let root_dir = config_root(config_file);
    config.connection_for(environment)?;

    let marker = config.marker_for(environment);
    let units = discover_units(&config.basepath_in(&root_dir))?;
    let statuses = unit_statuses(&units, marker);

    println!("Environment: {}", style(environment).bold());
    println!("Marker:      {}", marker);

    if statuses.is_empty() {
        println!("No migrations found in {}", config.basepath);
        return Ok(());
    }

    println!();
    for status in &statuses {
        let label = if status.applied {
            style("applied").green()
        } else {
            style("pending").yellow()
        };
        println!("  [{}] {}", label, status.name);
    }

    let (applied, pending): (Vec<_>, Vec<_>) = statuses.iter().partition(|s| s.applied);
    println!("\n{} applied, {} pending", applied.len(), pending.len());
    if !pending.is_empty() {
        println!("Next: {}", pending.iter().map(|s| s.name.as_str()).join(", "));
    }

    Ok(())
}
