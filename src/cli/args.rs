//! CLI argument definitions using clap
//!
//! Commands:
//! - rowfield fields --config <path> --table <name>
//! - rowfield find-field --config <path> --table <name> [--where <clause>] <NAME>...
//! - rowfield create-table --config <path> --table <name> [--rows <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rowfield - inspect field layouts of tables in a local datastore
#[derive(Parser, Debug)]
#[command(name = "rowfield")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a table's fields and role-bound field names
    Fields {
        /// Path to configuration file
        #[arg(long, default_value = "./rowfield.json")]
        config: PathBuf,

        /// Table to describe
        #[arg(long)]
        table: String,
    },

    /// Resolve field names to ordinals on the first matching row
    FindField {
        /// Path to configuration file
        #[arg(long, default_value = "./rowfield.json")]
        config: PathBuf,

        /// Table to search
        #[arg(long)]
        table: String,

        /// Filter clause, e.g. "ACTION = '1st Notice'"
        #[arg(long = "where")]
        where_clause: Option<String>,

        /// Field names to resolve
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Create a table from its schema file, optionally seeding rows
    CreateTable {
        /// Path to configuration file
        #[arg(long, default_value = "./rowfield.json")]
        config: PathBuf,

        /// Table whose `<table>.schema.json` is read from the schema directory
        #[arg(long)]
        table: String,

        /// JSON array of row objects keyed by field name
        #[arg(long)]
        rows: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
