//! Command line argument parsing for the `ember` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::StoreOptions;

#[derive(Parser)]
#[command(name = "ember")]
#[command(about = "Inspect a schema-validated JSON document store", long_about = None)]
pub struct CliParser {
    /// Record file stem; `.json` is appended. Defaults to `EMBER_FILE` or `database`.
    #[arg(long, short)]
    pub file: Option<PathBuf>,

    /// Schema file. Defaults to `EMBER_SCHEMA_FILE` or `schema.json`.
    #[arg(long, short)]
    pub schema_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Clone, Subcommand)]
pub enum CliCommand {
    /// List every table with its record count.
    Tables,

    /// Print the records of one table, one JSON object per line.
    Dump {
        table: String,
    },

    /// Show the schemas stored in the schema file.
    Schemas,
}

impl CliParser {
    pub fn options(&self) -> StoreOptions {
        //! Environment options with the command line flags applied on top.

        let mut options = StoreOptions::from_env();
        if let Some(file) = &self.file {
            options.file = file.clone();
        }
        if let Some(schema_file) = &self.schema_file {
            options.schema_file = schema_file.clone();
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dump_with_flags() {
        let cli = CliParser::try_parse_from(["ember", "--file", "data/app", "dump", "users"]).unwrap();

        assert_eq!(cli.file, Some(PathBuf::from("data/app")));
        assert!(matches!(cli.command, CliCommand::Dump { ref table } if table == "users"));
        assert_eq!(cli.options().record_path(), PathBuf::from("data/app.json"));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(CliParser::try_parse_from(["ember"]).is_err());
    }
}
