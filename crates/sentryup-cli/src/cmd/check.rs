//! Preflight checks, runnable without touching anything: engine binary,
//! daemon reachability, compose file presence. All three are reported even
//! when an earlier one fails so the operator sees the whole picture at once.

use crate::output::print_json;
use sentryup_core::engine::Engine;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct CheckReport {
    engine: String,
    engine_version: Option<String>,
    engine_error: Option<String>,
    daemon_reachable: bool,
    daemon_error: Option<String>,
    compose_file: String,
    compose_file_present: bool,
}

impl CheckReport {
    fn passed(&self) -> bool {
        self.engine_version.is_some() && self.daemon_reachable && self.compose_file_present
    }
}

pub fn run(file: &Path, json: bool) -> anyhow::Result<()> {
    let report = build_report(file);

    if json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }

    if report.passed() {
        Ok(())
    } else {
        anyhow::bail!("preflight failed")
    }
}

/// A failed engine detection still yields a report — compose-file presence
/// is independent of the engine and must be visible either way.
fn build_report(file: &Path) -> CheckReport {
    let (engine, engine_version, engine_error, daemon_reachable, daemon_error) =
        match Engine::detect() {
            Ok(engine) => {
                let (version, version_error) = match engine.version() {
                    Ok(v) => (Some(v), None),
                    Err(e) => (None, Some(e.to_string())),
                };
                let (reachable, daemon_error) = match engine.daemon_check() {
                    Ok(()) => (true, None),
                    Err(e) => (false, Some(e.to_string())),
                };
                (
                    engine.describe(),
                    version,
                    version_error,
                    reachable,
                    daemon_error,
                )
            }
            Err(e) => ("none detected".to_string(), None, Some(e.to_string()), false, None),
        };

    CheckReport {
        engine,
        engine_version,
        engine_error,
        daemon_reachable,
        daemon_error,
        compose_file: file.display().to_string(),
        compose_file_present: file.exists(),
    }
}

fn print_report(report: &CheckReport) {
    println!("engine:       {}", report.engine);
    match (&report.engine_version, &report.engine_error) {
        (Some(version), _) => println!("version:      {version}"),
        (None, Some(err)) => println!("version:      FAILED ({err})"),
        (None, None) => {}
    }
    if report.daemon_reachable {
        println!("daemon:       reachable");
    } else {
        let detail = report.daemon_error.as_deref().unwrap_or("not checked");
        println!("daemon:       FAILED ({detail})");
    }
    let presence = if report.compose_file_present {
        "present"
    } else {
        "MISSING"
    };
    println!("compose file: {} ({presence})", report.compose_file);
}
