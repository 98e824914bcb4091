use std::time::Duration;

// Configuration file name, looked up in the working directory by default
pub const CONFIG_FILENAME: &str = ".migrate.json";

// Values written by `init` when the user accepts the defaults
pub const DEFAULT_ENVIRONMENT: &str = "default";
pub const DEFAULT_BASEPATH: &str = "migrations";

// Marker of an environment that has never applied anything
pub const INITIAL_MARKER: i64 = 0;

// Unit file naming: <ordering key>-<slug>.<extension>
pub const UNIT_KEY_SEPARATOR: char = '-';
pub const SQL_UNIT_EXTENSION: &str = "sql";

// Section markers inside SQL units
pub const UP_SECTION_MARKER: &str = "-- migrate:up";
pub const DOWN_SECTION_MARKER: &str = "-- migrate:down";
pub const NO_TRANSACTION_MARKER: &str = "-- migrate:no-transaction";

// Placeholder expanded to a model's qualified table name
pub const MODEL_PLACEHOLDER_OPEN: &str = "{{model:";
pub const MODEL_PLACEHOLDER_CLOSE: &str = "}}";

// Pool acquire timeout for unit connections
pub const CONNECTION_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

// Longest description accepted by `create`
pub const MAX_DESCRIPTION_LEN: usize = 100;
