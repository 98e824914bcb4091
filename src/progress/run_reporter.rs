use crate::migration::Direction;
use console::style;
use std::time::Duration;

/// Operator-facing progress lines for a migration run
#[derive(Debug, Clone, Default)]
pub struct RunReporter {
    quiet: bool,
}

impl RunReporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn start_step(&self, name: &str, direction: Direction) {
        if self.quiet {
            return;
        }
        println!(
            "{}",
            style(format!("Applying migration {} - {}", name, direction)).green()
        );
    }

    pub fn complete_step(&self, marker: i64, duration: Duration) {
        if self.quiet {
            return;
        }
        println!(
            "  {} done in {} (marker {})",
            style("✓").green(),
            style(format_duration(duration)).dim(),
            marker
        );
    }

    pub fn fail_step(&self, name: &str, error: &dyn std::error::Error) {
        eprintln!(
            "{} {} failed: {}",
            style("✗").red(),
            name,
            style(error.to_string()).red()
        );
    }

    pub fn nothing_to_do(&self, direction: Direction) {
        if self.quiet {
            return;
        }
        match direction {
            Direction::Up => println!("No pending migrations"),
            Direction::Down => println!("No applied migrations to revert"),
        }
    }

    pub fn summary(&self, steps: usize, marker: i64, total_duration: Duration) {
        if self.quiet {
            return;
        }
        println!(
            "{} {} migration{} in {} (marker {})",
            style("✓").green(),
            steps,
            if steps == 1 { "" } else { "s" },
            style(format_duration(total_duration)).green(),
            marker
        );
    }
}

pub fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let millis = d.subsec_millis();

    if total_secs == 0 {
        format!("{}ms", millis)
    } else if total_secs < 60 {
        if millis > 0 {
            format!("{}.{}s", total_secs, millis / 100)
        } else {
            format!("{}s", total_secs)
        }
    } else {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        if secs > 0 {
            format!("{}m{}s", mins, secs)
        } else {
            format!("{}m", mins)
        }
    }
}
