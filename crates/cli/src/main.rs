use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use roadmap_cli::{CliResult, Command, Report, Settings};

/// Roadmap - lay out milestone roadmaps as slide pages
#[derive(Parser)]
#[command(name = "roadmap")]
#[command(version = "0.1.0")]
#[command(about = "Lay out milestone roadmaps as slide pages", long_about = None)]
struct Args {
    /// Path to the layout configuration file (can also be set via ROADMAP_CONFIG env var)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Option<Command>,
}

/// Initialize logging from the RUST_LOG environment variable
///
/// Logs go to stderr so that stdout stays machine-readable.
///
/// Examples:
/// - `RUST_LOG=debug` - show debug and above
/// - `RUST_LOG=roadmap_layout::labels=trace` - trace label placement only
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    if let Err(e) = run_app() {
        eprintln!("error: {}", e.full_message());
        process::exit(1);
    }
}

/// Main application logic - separated for testability
fn run_app() -> CliResult<()> {
    let args = Args::parse();
    run_with_args(&args)
}

/// Run the application with the given arguments
fn run_with_args(args: &Args) -> CliResult<()> {
    let settings = Settings::load(args.config.clone())?;

    match &args.command {
        Some(cmd) => match cmd.execute(&settings)? {
            Report::Stdout(text) => println!("{}", text),
            Report::Stderr(text) => eprintln!("{}", text),
        },
        None => {
            println!("Welcome to Roadmap!");
            println!("Use 'roadmap --help' for usage information.");
        }
    }

    Ok(())
}
