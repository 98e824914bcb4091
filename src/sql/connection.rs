use crate::constants::CONNECTION_ACQUIRE_TIMEOUT;
use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Mask password in database URL for display
pub fn mask_url_password(url: &str) -> String {
    let Some((protocol, rest)) = url.split_once("://") else {
        return url.to_string();
    };

    // Check if there's user info (user:pass@host or user@host)
    if let Some((user_info, host_and_path)) = rest.split_once('@')
        && let Some((username, _)) = user_info.split_once(':')
    {
        return format!("{}://{}:***@{}", protocol, username, host_and_path);
    }

    url.to_string()
}

/// Turn a configured connection descriptor into a connection string.
///
/// `$NAME` reads the environment variable `NAME`; anything else is used as is.
pub fn resolve_descriptor(descriptor: &str) -> Result<String> {
    match descriptor.strip_prefix('$') {
        Some(var) => std::env::var(var)
            .with_context(|| format!("Connection variable {} is not set", var)),
        None => Ok(descriptor.to_string()),
    }
}

/// Pool for an environment that only connects when a unit first needs it,
/// so runs with nothing to do never touch the database
pub fn connect_lazy(descriptor: &str) -> Result<PgPool> {
    let url = resolve_descriptor(descriptor)?;
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(CONNECTION_ACQUIRE_TIMEOUT)
        .connect_lazy(&url)
        .with_context(|| format!("Invalid connection string {}", mask_url_password(&url)))
}
