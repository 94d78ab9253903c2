//! Bounded readiness polling.
//!
//! Exhausting the attempt budget is a soft outcome: the bootstrap warns
//! and proceeds optimistically rather than aborting, since a slow Postgres
//! usually catches up before the migrations reach it.

use std::path::Path;
use std::time::Duration;

use crate::engine::Engine;

/// Substring of `pg_isready` output that signals a ready database.
pub const READY_MARKER: &str = "accepting connections";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The probe passed on the given 1-indexed attempt.
    Ready { attempt: u32 },
    /// The attempt budget ran out without a passing probe.
    Exhausted { attempts: u32 },
}

impl ProbeOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, ProbeOutcome::Ready { .. })
    }
}

/// Run `check` up to `attempts` times with `delay` between attempts,
/// stopping at the first success. No delay after the final attempt.
pub fn poll<F>(attempts: u32, delay: Duration, mut check: F) -> ProbeOutcome
where
    F: FnMut() -> bool,
{
    for attempt in 1..=attempts {
        if check() {
            return ProbeOutcome::Ready { attempt };
        }
        if attempt < attempts {
            std::thread::sleep(delay);
        }
    }
    ProbeOutcome::Exhausted { attempts }
}

/// One Postgres readiness check: exec `pg_isready` inside the `postgres`
/// service and look for the ready marker. Any exec failure counts as
/// not-ready — the service may simply not be up yet.
pub fn postgres_ready(engine: &Engine, compose_file: &Path) -> bool {
    match engine.compose_exec(
        compose_file,
        "postgres",
        &["pg_isready", "-U", "sentry", "-d", "sentry"],
    ) {
        Ok(output) => {
            output.status.success()
                && String::from_utf8_lossy(&output.stdout).contains(READY_MARKER)
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn poll_stops_on_first_success() {
        let mut calls = 0;
        let outcome = poll(5, Duration::ZERO, || {
            calls += 1;
            true
        });
        assert_eq!(outcome, ProbeOutcome::Ready { attempt: 1 });
        assert_eq!(calls, 1);
    }

    #[test]
    fn poll_reports_the_passing_attempt() {
        let mut calls = 0;
        let outcome = poll(5, Duration::ZERO, || {
            calls += 1;
            calls == 3
        });
        assert_eq!(outcome, ProbeOutcome::Ready { attempt: 3 });
        assert_eq!(calls, 3);
    }

    #[test]
    fn poll_exhaustion_is_bounded_and_soft() {
        let mut calls = 0;
        let outcome = poll(4, Duration::ZERO, || {
            calls += 1;
            false
        });
        assert_eq!(outcome, ProbeOutcome::Exhausted { attempts: 4 });
        assert_eq!(calls, 4);
        assert!(!outcome.is_ready());
    }

    #[test]
    fn zero_attempts_exhausts_without_calling() {
        let mut calls = 0;
        let outcome = poll(0, Duration::ZERO, || {
            calls += 1;
            true
        });
        assert_eq!(outcome, ProbeOutcome::Exhausted { attempts: 0 });
        assert_eq!(calls, 0);
    }

    fn stub_engine(dir: &TempDir, body: &str) -> Engine {
        let path = dir.path().join("engine.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        Engine::with_binary(path)
    }

    #[test]
    fn postgres_ready_requires_marker_and_success() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("docker-compose.sentry.yml");

        let ready = stub_engine(&dir, r#"echo "postgres:5432 - accepting connections""#);
        assert!(postgres_ready(&ready, &file));

        let refusing = stub_engine(&dir, r#"echo "postgres:5432 - no response"; exit 2"#);
        assert!(!postgres_ready(&refusing, &file));

        // Exit 0 without the marker still counts as not-ready.
        let silent = stub_engine(&dir, r#"echo "ok""#);
        assert!(!postgres_ready(&silent, &file));
    }
}
