//! PostgreSQL adapter: SQL files as migration units.

pub mod connection;
pub mod sections;
pub mod unit;

pub use connection::{connect_lazy, mask_url_password};
pub use sections::{SqlScript, parse_sql_script};
pub use unit::{SqlUnitLoader, expand_model_placeholders};

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
