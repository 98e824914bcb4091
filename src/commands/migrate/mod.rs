pub mod apply;
pub mod new;
pub mod status;

// Re-export all command functions
pub use apply::{MigrateArgs, cmd_migrate_apply};
pub use new::cmd_migrate_new;
pub use status::cmd_migrate_status;
