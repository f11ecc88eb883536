//! CLI module for rowfield
//!
//! Provides command-line interface for:
//! - fields: describe a table's schema
//! - find-field: resolve field names on the first matching row
//! - create-table: write a table from its schema file

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    create_from_loader, create_table, describe_table, fields, find_field, find_fields, run,
    run_command, Config,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_response;
