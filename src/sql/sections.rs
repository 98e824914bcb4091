use crate::constants::{DOWN_SECTION_MARKER, NO_TRANSACTION_MARKER, UP_SECTION_MARKER};
use anyhow::{Result, bail};

/// The two entry points of a SQL unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlScript {
    pub up: String,
    /// `None` when the file has no down section, i.e. the unit is irreversible
    pub down: Option<String>,
    /// Wrap each section in BEGIN/COMMIT
    pub transactional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Up,
    Down,
}

/// A directive is the whole comment line, optionally followed by a note
/// after whitespace. `-- migrate:upgrade` is an ordinary comment.
fn is_directive(line: &str, marker: &str) -> bool {
    line.strip_prefix(marker)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

/// Split a SQL unit into its up and down sections.
///
/// Section markers are comment lines, matched case-insensitively. Anything
/// before the first marker is ignored.
pub fn parse_sql_script(sql: &str) -> Result<SqlScript> {
    let mut up: Option<String> = None;
    let mut down: Option<String> = None;
    let mut transactional = true;
    let mut current = Section::Preamble;

    for (line_num, line) in sql.lines().enumerate() {
        let directive = line.trim().to_ascii_lowercase();

        if is_directive(&directive, UP_SECTION_MARKER) {
            if up.is_some() {
                bail!("Duplicate up section at line {}", line_num + 1);
            }
            up = Some(String::new());
            current = Section::Up;
            continue;
        }

        if is_directive(&directive, DOWN_SECTION_MARKER) {
            if down.is_some() {
                bail!("Duplicate down section at line {}", line_num + 1);
            }
            down = Some(String::new());
            current = Section::Down;
            continue;
        }

        if is_directive(&directive, NO_TRANSACTION_MARKER) {
            transactional = false;
            continue;
        }

        let target = match current {
            Section::Preamble => continue,
            Section::Up => up.as_mut(),
            Section::Down => down.as_mut(),
        };
        if let Some(body) = target {
            body.push_str(line);
            body.push('\n');
        }
    }

    let Some(up) = up else {
        bail!("Missing '{}' section", UP_SECTION_MARKER);
    };

    Ok(SqlScript {
        up: up.trim().to_string(),
        down: down.map(|d| d.trim().to_string()),
        transactional,
    })
}
