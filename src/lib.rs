//! An embedded, schema-validated document store.
//!
//! Tables are declared with a [`persistence::Schema`], every write is checked
//! against it, and the whole store lives in a plain JSON file that is only
//! rewritten on [`persistence::Database::commit`].

pub mod cli;
pub mod config;
pub mod error;
pub mod persistence;

pub use config::StoreOptions;
pub use error::{StoreError, StoreResult};
