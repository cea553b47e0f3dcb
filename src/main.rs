use std::env;

use clap::Parser;
use dowsing::cli::{run_cli, Cli};

fn main() {
    if env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt::init();
    } else {
        let format = tracing_subscriber::fmt::format()
            .with_level(false)
            .with_target(false)
            .without_time()
            .compact();
        tracing_subscriber::fmt().event_format(format).init();
    }

    if let Err(err) = run_cli(Cli::parse()) {
        eprintln!("💥 {} failed", env!("CARGO_PKG_NAME"));
        for cause in err.chain() {
            eprintln!("  Caused by: {cause}");
        }
        std::process::exit(1);
    }
}
