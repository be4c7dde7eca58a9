use clap::Parser;
use tracing_subscriber::EnvFilter;

use sav_uplink::cli::{self, Cli};
use sav_uplink::config;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(message) = cli::run(cli) {
        eprintln!("error: {message}");
        std::process::exit(1);
    }
}
