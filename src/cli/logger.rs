//! A [`log`] backend for the `ember` binary.
//!
//! Library code only talks to the `log` facade; this prints those records
//! through the same themed format as every other CLI message.

use chrono::Local;
use colored::Colorize;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::cli::colors::ASH_GREY;
use crate::cli::messages::system_message;

const ENV_LOG: &str = "EMBER_LOG";

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let message = system_message(
            &record.level().as_str().to_lowercase(),
            format!("{} {}", timestamp.color(ASH_GREY), record.args()),
        );

        match record.level() {
            Level::Error | Level::Warn => eprintln!("{}", message),
            _ => println!("{}", message),
        }
    }

    fn flush(&self) {}
}

pub fn level_from_env() -> LevelFilter {
    //! Reads `EMBER_LOG`; anything missing or unknown means `info`.

    std::env::var(ENV_LOG)
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info)
}

pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
