pub mod init;
pub mod migrate;

// Re-export all command functions
pub use init::cmd_init_with_args;
pub use migrate::{MigrateArgs, cmd_migrate_apply, cmd_migrate_new, cmd_migrate_status};
