//! restcli binary entry point.
//!
//! Responses and listings go to stdout; logs and errors go to stderr.
//! Any failure exits with status 1.

use clap::Parser;
use restcli::cli::{run, Args};
use restcli::services::Home;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let home = match Home::from_env(|name| std::env::var(name).ok()) {
        Ok(home) => home,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(args, &home).await {
        log::debug!("{:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
