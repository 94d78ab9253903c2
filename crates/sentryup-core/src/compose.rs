//! Textual patching of the compose file.
//!
//! The document is deliberately never parsed as YAML: substitution is a
//! single regex replacement, so every byte outside the secret-key
//! assignment passes through unchanged.

use crate::error::{Result, SetupError};
use crate::io;
use regex::{NoExpand, Regex};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Conventional compose file name the setup operates on.
pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.sentry.yml";

static SECRET_KEY_RE: OnceLock<Regex> = OnceLock::new();

fn secret_key_re() -> &'static Regex {
    SECRET_KEY_RE.get_or_init(|| Regex::new(r#"SENTRY_SECRET_KEY: ".*?""#).unwrap())
}

/// Fail early if the compose file is absent. Checked before any other
/// stage so a missing file aborts the run with zero writes performed.
pub fn require(compose_file: &Path) -> Result<()> {
    if compose_file.exists() {
        Ok(())
    } else {
        Err(SetupError::ComposeFileNotFound(compose_file.to_path_buf()))
    }
}

/// Replace the value of the `SENTRY_SECRET_KEY` assignment with
/// `secret_key`, writing an unmodified backup to `<path>.bak` first.
///
/// A document without the assignment is an error, not a silent no-op —
/// starting Sentry with a stale key signs sessions with a secret the
/// operator never saw. Nothing is written in that case.
///
/// Returns the backup path.
pub fn patch_secret_key(compose_file: &Path, secret_key: &str) -> Result<PathBuf> {
    require(compose_file)?;
    let content = std::fs::read_to_string(compose_file)?;

    if !secret_key_re().is_match(&content) {
        return Err(SetupError::SecretKeyMissing(compose_file.to_path_buf()));
    }

    let backup = io::write_backup(compose_file, content.as_bytes())?;

    let replacement = format!("SENTRY_SECRET_KEY: \"{secret_key}\"");
    let patched = secret_key_re().replace(&content, NoExpand(&replacement));
    io::atomic_write(compose_file, patched.as_bytes())?;

    Ok(backup)
}
