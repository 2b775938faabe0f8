//! Construction options for a [`crate::persistence::Database`].
//!
//! Defaults mirror a bare `Database::open(StoreOptions::default())`: a record
//! file named `database.json` and a schema file named `schema.json`, both in
//! the working directory. [`StoreOptions::from_env`] lets the process
//! environment override them; loading a `.env` file into the environment is
//! left to the binary.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use log::warn;

pub const DEFAULT_FILE: &str = "database";
pub const DEFAULT_SCHEMA_FILE: &str = "schema.json";
pub const DEFAULT_CACHE_TIME: Duration = Duration::from_millis(1000 * 60 * 60);

const ENV_FILE: &str = "EMBER_FILE";
const ENV_SCHEMA_FILE: &str = "EMBER_SCHEMA_FILE";
const ENV_CACHE_TIME: &str = "EMBER_CACHE_TIME_MS";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreOptions {
    /// Record file stem; `.json` is appended to it.
    pub file: PathBuf,
    pub schema_file: PathBuf,
    /// Carried for callers; no operation reads it yet.
    pub cache_time: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            file: PathBuf::from(DEFAULT_FILE),
            schema_file: PathBuf::from(DEFAULT_SCHEMA_FILE),
            cache_time: DEFAULT_CACHE_TIME,
        }
    }
}

impl StoreOptions {
    pub fn new(file: impl Into<PathBuf>) -> StoreOptions {
        StoreOptions {
            file: file.into(),
            ..StoreOptions::default()
        }
    }

    pub fn schema_file(mut self, schema_file: impl Into<PathBuf>) -> StoreOptions {
        self.schema_file = schema_file.into();
        self
    }

    pub fn cache_time(mut self, cache_time: Duration) -> StoreOptions {
        self.cache_time = cache_time;
        self
    }

    pub fn from_env() -> StoreOptions {
        //! Build options from `EMBER_FILE`, `EMBER_SCHEMA_FILE` and
        //! `EMBER_CACHE_TIME_MS`. Unset variables keep their defaults.

        let mut options = StoreOptions::default();

        if let Ok(file) = env::var(ENV_FILE) {
            options.file = PathBuf::from(file);
        }
        if let Ok(schema_file) = env::var(ENV_SCHEMA_FILE) {
            options.schema_file = PathBuf::from(schema_file);
        }
        if let Ok(cache_time) = env::var(ENV_CACHE_TIME) {
            match cache_time.parse::<u64>() {
                Ok(millis) => options.cache_time = Duration::from_millis(millis),
                Err(_) => warn!(
                    "ignoring {}={}: not a number of milliseconds",
                    ENV_CACHE_TIME, cache_time
                ),
            }
        }

        options
    }

    pub fn record_path(&self) -> PathBuf {
        //! Full path of the record file, `<file>.json`.

        let mut path = self.file.as_os_str().to_owned();
        path.push(".json");
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = StoreOptions::default();

        assert_eq!(options.record_path(), PathBuf::from("database.json"));
        assert_eq!(options.schema_file, PathBuf::from("schema.json"));
        assert_eq!(options.cache_time, Duration::from_millis(3_600_000));
    }

    #[test]
    fn record_path_appends_extension() {
        let options = StoreOptions::new("data/app.v2");
        assert_eq!(options.record_path(), PathBuf::from("data/app.v2.json"));
    }
}
