use clap::Parser;
use ember_store::cli::{self, CliParser, logger};
use log::error;

#[tokio::main]
async fn main() {
    let parser = CliParser::parse();
    dotenvy::dotenv().ok();

    if let Err(message) = logger::init(logger::level_from_env()) {
        eprintln!("err: {}", message);
    }

    if let Err(message) = cli::run(parser).await {
        error!("{}", message);
        std::process::exit(1);
    }
}
