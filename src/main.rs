mod bot;
mod cli;
mod config;
mod datetime;
mod format;
mod lifecycle;
mod model;
mod polls;
mod schedule;
mod session;
mod storage;
mod training;
mod transport;

use std::process;

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("encore=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
