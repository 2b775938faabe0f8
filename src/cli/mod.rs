//! The `ember` command line.
//!
//! - ember tables            | list every table and its record count
//! - ember dump <table>      | print a table's records as JSON lines
//! - ember schemas           | show the schemas kept in the schema file
//!
//! Every command opens the store the same way a program would, so a missing
//! record file is created on the way.

use crate::cli::messages::{highlight_argument, system_message};
use crate::error::StoreResult;
use crate::persistence::Database;

mod colors;
pub mod logger;
mod messages;
pub mod parsers;

pub use parsers::{CliCommand, CliParser};

pub async fn run(cli: CliParser) -> StoreResult<()> {
    let options = cli.options();
    let mut database = Database::open(options).await?;

    match cli.command {
        CliCommand::Tables => show_tables(&database),
        CliCommand::Dump { table } => dump_table(&database, &table)?,
        CliCommand::Schemas => show_schemas(&mut database).await?,
    }

    Ok(())
}

fn show_tables(database: &Database) {
    let names = database.get_table_names();

    println!(
        "{}",
        system_message(
            "ember",
            format!(
                "{} table(s) in {}",
                names.len(),
                highlight_argument(&database.record_path().display().to_string())
            )
        )
    );

    println!();
    println!("{:20} {}", "TABLE", "RECORDS");
    for name in names {
        let count = database.len(&name).unwrap_or(0);
        println!("{:20} {}", highlight_argument(&name), count);
    }
}

fn dump_table(database: &Database, table: &str) -> StoreResult<()> {
    let records = database.fetch_all(table)?;

    for record in records.iter() {
        println!("{}", serde_json::to_string(record)?);
    }

    println!(
        "{}",
        system_message(
            "ember",
            format!("{} record(s) in {}", records.len(), highlight_argument(table))
        )
    );
    Ok(())
}

async fn show_schemas(database: &mut Database) -> StoreResult<()> {
    let names = database.load_schemas().await?;

    for name in names {
        if let Some(schema) = database.schema(&name) {
            println!(
                "{} (lastID {})\n    {}",
                highlight_argument(&name),
                schema.last_id(),
                schema
            );
        }
    }
    Ok(())
}
