//! Persistence as tables needs to have the following components
//! - Schema (ordered mapping of column names to their contracts, plus the id counter)
//! - Record (built from a candidate by the validation engine, one key per column)
//! - Table (an ordered run of Records)
//! - Database (owns every Table and Schema, writes them to JSON files)
//!

//  All modules of this lib
mod database;
mod row;
mod schema;
mod storage;
mod table;
mod validation;

//  External API
pub use database::{CommitOutcome, Database};
pub use row::Record;
pub use schema::{ColumnDefinition, DataType, Schema, SerializedColumn, SerializedSchema, ValidateFunc};
pub use table::Table;
