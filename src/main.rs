use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use stepmigrate::commands::{self, MigrateArgs, init::InitArgs};
use stepmigrate::constants::{CONFIG_FILENAME, DEFAULT_ENVIRONMENT};
use stepmigrate::migration::Direction;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long, default_value = CONFIG_FILENAME, global = true)]
    config_file: PathBuf,

    /// Enable verbose output (info level)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress all non-essential output (error level only)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Enable debug output (debug level)
    #[arg(long, global = true)]
    debug: bool,

    /// Defaults to `up all` on the default environment
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Init migrations on current path
    Init(InitArgs),

    /// Create migration
    Create {
        /// What the migration does; becomes part of the file name
        description: Option<String>,
    },

    /// Migrate up (default command)
    Up(MigrateArgs),

    /// Migrate down
    Down(MigrateArgs),

    /// Show applied and pending migrations
    Status {
        /// Which environment to use
        #[arg(long, short = 'e', default_value = DEFAULT_ENVIRONMENT)]
        environment: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    initialize_logging(&cli);

    tokio::select! {
        result = run_main(cli) => result,
        _ = wait_for_shutdown_signal() => {
            // Markers are written synchronously, so the file holds the last
            // completed migration
            Err(anyhow::anyhow!(
                "Interrupted; the marker reflects the last completed migration"
            ))
        }
    }
}

async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn initialize_logging(cli: &Cli) {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn" // default level
    };

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level)
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_main(cli: Cli) -> Result<()> {
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Up(MigrateArgs::all_pending()));

    match command {
        Commands::Init(args) => commands::cmd_init_with_args(&cli.config_file, &args).await,
        Commands::Create { description } => {
            info!("Creating migration");
            commands::cmd_migrate_new(&cli.config_file, description.as_deref()).await?;
            Ok(())
        }
        Commands::Up(args) => {
            commands::cmd_migrate_apply(&cli.config_file, Direction::Up, &args, cli.quiet).await?;
            Ok(())
        }
        Commands::Down(args) => {
            commands::cmd_migrate_apply(&cli.config_file, Direction::Down, &args, cli.quiet)
                .await?;
            Ok(())
        }
        Commands::Status { environment } => {
            commands::cmd_migrate_status(&cli.config_file, &environment).await
        }
    }
}
