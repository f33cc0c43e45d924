use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ivy")]
#[command(about = "Inspect an ivy document store", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database root directory (each subdirectory is a table)
    #[arg(short, long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the tables
    Tables,

    /// List every record id in a table
    #[command(alias = "ls")]
    Ids { table: String },

    /// Print a record as JSON
    #[command(alias = "cat")]
    Show { table: String, id: String },

    /// Find records whose field equals a value
    Find {
        table: String,
        field: String,
        value: String,

        /// Print every match, not just the first
        #[arg(short, long)]
        all: bool,

        /// Compare as a string even if the value looks like a number
        #[arg(long)]
        string: bool,
    },

    /// Find records carrying all of the given tags
    Tags {
        table: String,

        #[arg(required = true, num_args = 1..)]
        tags: Vec<String>,
    },

    /// Delete a record
    #[command(alias = "rm")]
    Delete { table: String, id: String },

    /// Rebuild a table's tag index and report its size
    Reindex { table: String },
}
