mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::up::UpArgs;
use sentryup_core::compose;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sentryup",
    about = "Bootstrap a self-hosted Sentry 9.x instance from a Docker Compose file",
    version,
    propagate_version = true
)]
struct Cli {
    /// Compose file describing the Sentry topology
    #[arg(
        long,
        global = true,
        env = "SENTRYUP_COMPOSE_FILE",
        default_value = compose::DEFAULT_COMPOSE_FILE
    )]
    file: PathBuf,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full bootstrap: patch the secret key, start services,
    /// wait for Postgres, run migrations, create the admin user
    Up(UpArgs),

    /// Preflight checks only: engine binary, daemon, compose file
    Check,

    /// Stop and remove the running instance
    Down,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    // An interrupt mid-run exits 1 with a notice. Nothing is rolled back:
    // containers already started stay up and a patched compose file stays
    // patched.
    if let Err(e) = ctrlc::set_handler(|| {
        eprintln!("\nSetup interrupted by user.");
        std::process::exit(1);
    }) {
        tracing::warn!("could not install interrupt handler: {e}");
    }

    let result = match cli.command {
        Commands::Up(args) => cmd::up::run(&cli.file, args, cli.json),
        Commands::Check => cmd::check::run(&cli.file, cli.json),
        Commands::Down => cmd::down::run(&cli.file),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
