pub mod commands;

use clap::Parser;

pub use commands::cmd_init_with_args;

/// CLI arguments for the init command
#[derive(Parser, Debug, Clone, Default)]
pub struct InitArgs {
    /// Migrations directory, relative to the configuration file
    #[clap(long)]
    pub basepath: Option<String>,

    /// Connection string for the default environment (or $VAR)
    #[clap(long)]
    pub connection: Option<String>,

    /// Use defaults for all prompts (non-interactive mode)
    #[clap(long)]
    pub defaults: bool,
}
