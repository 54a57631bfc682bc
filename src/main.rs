//! Zentinel Mock HTTP Client - CLI Entry Point
//!
//! Checks a client settings file and prints the settings it resolves to.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use zentinel_mock_http_client::{ClientSettings, ResourceBundle};

#[derive(Parser, Debug)]
#[command(
    name = "zentinel-mock-http-client",
    about = "Check mock HTTP client settings",
    version
)]
struct Args {
    /// Path to settings file
    #[arg(short, long, default_value = "mock-client.yaml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    log_level: Level,

    /// Print default settings and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Print default config if requested
    if args.print_config {
        let default_config = include_str!("../demos/default-config.yaml");
        println!("{}", default_config);
        return Ok(());
    }

    info!(path = ?args.config, "Loading settings");
    let settings = ClientSettings::from_file(&args.config)?;

    let fixtures = settings.fixtures();
    if settings.fixtures_dir.is_dir() {
        info!(fixtures = fixtures.name(), "Fixtures directory found");
    } else {
        info!(fixtures = fixtures.name(), "Fixtures directory does not exist yet");
    }

    print!("{}", serde_yaml::to_string(&settings)?);
    Ok(())
}
