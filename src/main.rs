// Entrypoint for the sealfile CLI.
// - Keeps `main` small: parse flags, set up logging, run one seal.
// - Any failure is logged and turned into exit status 1.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sealfile::api::SealClient;
use sealfile::config::{Config, DEFAULT_CONFIG_PATH};
use sealfile::seal::seal_file;
use sealfile::seal_log::{SealLog, DEFAULT_LOG_PATH};
use sealfile::ui;

/// Register a file's SHA-256 digest with the seal service and record the
/// returned retrieval id in a local log.
#[derive(Parser, Debug)]
#[command(name = "sealfile", version, about, long_about = None)]
struct Cli {
    /// File to seal.
    #[arg(short, long, default_value = "demo.txt")]
    file: PathBuf,

    /// Settings file with `apikey` and `baseurl`.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Seal log to append to.
    #[arg(long, default_value = DEFAULT_LOG_PATH)]
    log: PathBuf,

    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    println!("Reading config");
    let config = Config::load(&cli.config)
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;

    let client = SealClient::new(&config)?;
    let log = SealLog::new(&cli.log);

    tracing::info!(file = %cli.file.display(), endpoint = %client.endpoint(), "sealing");
    let receipt = ui::with_spinner("Registering to blockchain...", || {
        seal_file(&client, &log, &cli.file)
    })
    .with_context(|| format!("sealing {}", cli.file.display()))?;

    ui::report(&receipt);
    Ok(())
}
