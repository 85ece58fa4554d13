// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use qrscan::config::Config;

mod cli;

#[derive(Parser)]
#[command(name = "qrscan")]
#[command(about = "QR code scanner for the terminal")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available cameras
    List,

    /// Scan until a QR code is decoded, print it, and exit
    Once {
        /// Camera index to use (from 'qrscan list')
        #[arg(short, long)]
        camera: Option<usize>,

        /// Give up after this many seconds
        #[arg(short, long, default_value = "30")]
        timeout: u64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=qrscan=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        Some(Commands::List) => cli::list_cameras(),
        Some(Commands::Once { camera, timeout }) => cli::scan_once(camera, timeout, &config),
        None => qrscan::terminal::run(&config),
    }
}
