//! The bootstrap workflow: one strictly linear pass from preflight to the
//! summary report. Each fatal stage short-circuits; the three soft stages
//! (teardown, probe exhaustion, admin creation) warn and continue.

use crate::output::print_json;
use anyhow::Context;
use clap::Args;
use sentryup_core::engine::{output_tail, Engine};
use sentryup_core::probe::ProbeOutcome;
use sentryup_core::{compose, probe, secret};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the web service listens once the topology is up.
const SENTRY_URL: &str = "http://localhost:9000";

#[derive(Args, Debug, Clone)]
pub struct UpArgs {
    /// Seconds to let containers settle after `up -d`
    #[arg(long, default_value = "30")]
    pub wait_secs: u64,

    /// Postgres readiness probe attempt budget
    #[arg(long, default_value = "15")]
    pub probe_attempts: u32,

    /// Seconds between readiness probe attempts
    #[arg(long, default_value = "5")]
    pub probe_delay_secs: u64,

    /// Tear down any previous instance before starting
    #[arg(long)]
    pub clean: bool,

    /// Compose service that hosts the Sentry CLI
    #[arg(long, default_value = "sentry-web")]
    pub service: String,

    /// Admin account email
    #[arg(long, env = "SENTRYUP_ADMIN_EMAIL", default_value = "admin@localhost")]
    pub admin_email: String,

    /// Admin account password (change it after first login)
    #[arg(long, env = "SENTRYUP_ADMIN_PASSWORD", default_value = "admin123")]
    pub admin_password: String,
}

#[derive(Debug, Serialize)]
struct Summary {
    url: String,
    secret_key: String,
    backup_file: PathBuf,
    postgres_ready: bool,
    admin_created: bool,
    admin_email: String,
    compose_command: String,
}

pub fn run(file: &Path, args: UpArgs, json: bool) -> anyhow::Result<()> {
    // Precondition before dependency check: a wrong working directory is
    // reported as the missing compose file, not as a missing engine.
    compose::require(file)?;
    let engine = Engine::detect()?;
    let summary = bootstrap(&engine, file, &args)?;

    if json {
        print_json(&summary)?;
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn bootstrap(engine: &Engine, file: &Path, args: &UpArgs) -> anyhow::Result<Summary> {
    // The compose file is checked before anything else so a wrong working
    // directory aborts with zero side effects.
    compose::require(file)?;

    let version = engine
        .version()
        .context("container engine is not available")?;
    println!("Engine found: {version}");
    engine
        .daemon_check()
        .context("container engine daemon is not running")?;
    println!("Engine daemon is reachable");

    println!("Generating secret key...");
    let secret_key = secret::generate_secret_key();

    let backup_file =
        compose::patch_secret_key(file, &secret_key).context("failed to patch the compose file")?;
    println!(
        "Updated {} (backup: {})",
        file.display(),
        backup_file.display()
    );

    if args.clean {
        println!("Removing any previous instance...");
        // An absent prior instance is not an error worth stopping for.
        if let Err(e) = engine.compose_down(file) {
            eprintln!("warning: teardown failed, continuing: {e}");
        }
    }

    println!("Starting services in detached mode...");
    engine.compose_up(file)?;
    println!("Services started");

    if args.wait_secs > 0 {
        println!("Waiting {}s for services to settle...", args.wait_secs);
        std::thread::sleep(Duration::from_secs(args.wait_secs));
    }

    println!("Verifying Postgres is ready...");
    let outcome = poll_postgres(engine, file, args);
    let postgres_ready = match outcome {
        ProbeOutcome::Ready { attempt } => {
            println!("Postgres is accepting connections (attempt {attempt})");
            true
        }
        ProbeOutcome::Exhausted { attempts } => {
            eprintln!(
                "warning: Postgres did not report ready after {attempts} attempts, continuing anyway"
            );
            false
        }
    };

    println!("Running migrations (this may take a few minutes)...");
    let output = engine.compose_exec(file, &args.service, &["sentry", "upgrade", "--noinput"])?;
    if !output.status.success() {
        anyhow::bail!("migrations failed: {}", output_tail(&output));
    }
    println!("Migrations completed");

    println!("Creating superuser {}...", args.admin_email);
    let admin_created = create_admin(engine, file, args);

    Ok(Summary {
        url: SENTRY_URL.to_string(),
        secret_key,
        backup_file,
        postgres_ready,
        admin_created,
        admin_email: args.admin_email.clone(),
        compose_command: engine.compose_hint(file),
    })
}

fn poll_postgres(engine: &Engine, file: &Path, args: &UpArgs) -> ProbeOutcome {
    probe::poll(
        args.probe_attempts,
        Duration::from_secs(args.probe_delay_secs),
        || probe::postgres_ready(engine, file),
    )
}

/// Non-fatal by contract: the most common failure is an account that
/// already exists from an earlier run. The cause is printed rather than
/// swallowed so a genuine failure is at least visible.
fn create_admin(engine: &Engine, file: &Path, args: &UpArgs) -> bool {
    let result = engine.compose_exec(
        file,
        &args.service,
        &[
            "sentry",
            "createuser",
            "--email",
            &args.admin_email,
            "--password",
            &args.admin_password,
            "--superuser",
            "--no-input",
        ],
    );
    match result {
        Ok(output) if output.status.success() => {
            println!("Superuser created");
            true
        }
        Ok(output) => {
            eprintln!(
                "warning: createuser failed (account may already exist), continuing: {}",
                output_tail(&output)
            );
            false
        }
        Err(e) => {
            eprintln!("warning: createuser could not run, continuing: {e}");
            false
        }
    }
}

fn print_summary(summary: &Summary) {
    println!();
    println!("Sentry is now running at: {}", summary.url);
    println!("Secret key: {}", summary.secret_key);
    println!("Admin login: {}", summary.admin_email);
    println!();
    println!("IMPORTANT: change the default admin password after first login!");
    println!();
    println!("To stop:      {} down", summary.compose_command);
    println!("To view logs: {} logs -f", summary.compose_command);
    println!();
    println!("Setup completed successfully");
}
