pub mod sql_units;
