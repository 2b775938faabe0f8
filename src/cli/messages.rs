//! Output formatting shared by every `ember` subcommand and the log backend.
//!
//! Table names, file paths and counts are highlighted; status lines carry a
//! bracketed source tag such as `[ember ]` or `[warn  ]`.

use colored::Colorize;

use crate::cli::colors::EMBER_ORANGE;

pub fn highlight_argument(argument: &str) -> String {
    //! Colors a table name or path so it stands out in a status line.

    format!("{}", argument.color(EMBER_ORANGE))
}

pub fn system_message(source_name: &str, message: String) -> String {
    //! A status line tagged with where it came from: a subcommand (`ember`)
    //! or a log level (`info`, `warn`, ...). The tag is padded so messages
    //! line up.

    let source_formatted = format!("{:6}", source_name.color(EMBER_ORANGE).bold());

    format!("[{}] {}", source_formatted, message)
}
