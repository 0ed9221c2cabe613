//! # agrimart CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use agrimart_cli::config::{run_config, ConfigArgs};
use agrimart_cli::inspect::{run_inspect, InspectArgs};
use agrimart_cli::serve::{run_serve, ServeArgs};
use agrimart_cli::sweep::{run_sweep, SweepArgs};

/// Agrimart marketplace operator tool.
///
/// Works against JSON market snapshots: runs the dispute escalation and
/// receipt auto-confirmation sweeps once or continuously, and prints the
/// effective configuration and the orders and disputes a snapshot holds.
#[derive(Parser, Debug)]
#[command(name = "agrimart", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show or check the marketplace configuration.
    Config(ConfigArgs),

    /// Run the sweeps once against a snapshot.
    Sweep(SweepArgs),

    /// Run the sweep worker against a snapshot until interrupted.
    Serve(ServeArgs),

    /// Print orders, disputes and stock held in a snapshot.
    Inspect(InspectArgs),
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
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "agrimart CLI starting");

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Config(args) => run_config(&args, config),
        Commands::Sweep(args) => run_sweep(&args, config),
        Commands::Serve(args) => run_serve(&args, config),
        Commands::Inspect(args) => run_inspect(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
