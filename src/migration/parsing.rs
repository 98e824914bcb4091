use super::Direction;
use crate::constants::UNIT_KEY_SEPARATOR;
use crate::error::{MigrateError, MigrateResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A migration unit found on disk
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ParsedUnit {
    pub path: PathBuf,
    pub key: i64,
    /// File name, used to identify the unit in output
    pub name: String,
    pub slug: String,
}

/// Parse the ordering key from a unit name like "1734567890123-add-users.sql".
///
/// The key is everything before the first `-`, or before the extension when
/// the name has no `-`. It must be a plain base-10 integer.
pub fn parse_ordering_key(name: &str) -> Option<i64> {
    let head = match name.split_once(UNIT_KEY_SEPARATOR) {
        Some((head, _)) => head,
        None => name.split_once('.').map_or(name, |(head, _)| head),
    };

    if head.is_empty() || !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    head.parse::<i64>().ok()
}

/// Split a unit file name into its ordering key and slug
pub fn parse_unit_filename(name: &str) -> MigrateResult<(i64, String)> {
    let key = parse_ordering_key(name).ok_or_else(|| MigrateError::MalformedUnitName {
        name: name.to_string(),
    })?;

    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    let slug = stem
        .split_once(UNIT_KEY_SEPARATOR)
        .map(|(_, slug)| slug.to_string())
        .unwrap_or_default();

    Ok((key, slug))
}

/// List every unit in `basepath`, sorted by ordering key.
///
/// Sub-directories and dot-files are not units. Any other entry whose key
/// cannot be parsed fails the whole listing.
pub fn discover_units(basepath: &Path) -> MigrateResult<Vec<ParsedUnit>> {
    let mut units = Vec::new();

    if !basepath.exists() {
        debug!("Migrations directory {} does not exist", basepath.display());
        return Ok(units);
    }

    let discovery_error = |source| MigrateError::Discovery {
        path: basepath.to_path_buf(),
        source,
    };

    for entry in std::fs::read_dir(basepath).map_err(discovery_error)? {
        let entry = entry.map_err(discovery_error)?;
        let path = entry.path();

        if path.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            debug!("Ignoring hidden file {}", name);
            continue;
        }

        let (key, slug) = parse_unit_filename(&name)?;
        units.push(ParsedUnit {
            path,
            key,
            name,
            slug,
        });
    }

    // Directory order is arbitrary
    units.sort_by_key(|u| u.key);

    Ok(units)
}

/// Keep the units a run in `direction` may touch from `marker`.
///
/// Up selects keys strictly above the marker, down selects keys at or below
/// it. Input order is preserved.
pub fn select_units(units: Vec<ParsedUnit>, direction: Direction, marker: i64) -> Vec<ParsedUnit> {
    units
        .into_iter()
        .filter(|u| match direction {
            Direction::Up => u.key > marker,
            Direction::Down => u.key <= marker,
        })
        .collect()
}

/// Candidate units for a run, ascending by ordering key
pub fn resolve(
    basepath: &Path,
    direction: Direction,
    marker: i64,
) -> MigrateResult<Vec<ParsedUnit>> {
    let units = discover_units(basepath)?;
    let total = units.len();
    let selected = select_units(units, direction, marker);

    debug!(
        "Selected {} of {} migrations for {} from marker {}",
        selected.len(),
        total,
        direction,
        marker
    );

    Ok(selected)
}
