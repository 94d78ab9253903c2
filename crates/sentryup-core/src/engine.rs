//! Container-engine detection and compose invocation.
//!
//! The engine is an opaque collaborator: exit status and captured output
//! are the whole contract. Nothing here parses structured engine output.
//!
//! # Compose flavor priority
//! 1. `docker compose` — the v2 plugin, probed with `docker compose version`
//! 2. `docker-compose` — the standalone v1 binary

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::error::{Result, SetupError};

/// Overrides the engine binary outright. The override is invoked with
/// plugin syntax (`<bin> compose …`); integration tests use this to point
/// the workflow at a stub script.
pub const ENGINE_ENV: &str = "SENTRYUP_ENGINE";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ComposeFlavor {
    /// `docker compose` via the v2 plugin.
    Plugin,
    /// Standalone `docker-compose` binary.
    Standalone(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Engine {
    docker: PathBuf,
    compose: ComposeFlavor,
}

impl Engine {
    /// Detect the container engine and compose flavor.
    ///
    /// `SENTRYUP_ENGINE` wins over PATH lookup. A missing `docker` binary
    /// and a missing compose implementation are distinct errors so the
    /// operator knows which piece to install.
    pub fn detect() -> Result<Engine> {
        if let Some(bin) = std::env::var_os(ENGINE_ENV) {
            return Ok(Engine::with_binary(PathBuf::from(bin)));
        }
        let docker = which::which("docker").map_err(|_| SetupError::EngineNotInstalled)?;
        if plugin_available(&docker) {
            return Ok(Engine {
                docker,
                compose: ComposeFlavor::Plugin,
            });
        }
        if let Ok(standalone) = which::which("docker-compose") {
            return Ok(Engine {
                docker,
                compose: ComposeFlavor::Standalone(standalone),
            });
        }
        Err(SetupError::ComposeUnavailable)
    }

    /// Use `bin` for both engine probes and compose subcommands.
    pub fn with_binary(bin: PathBuf) -> Engine {
        Engine {
            docker: bin,
            compose: ComposeFlavor::Plugin,
        }
    }

    /// Human-readable description of what was detected.
    pub fn describe(&self) -> String {
        match &self.compose {
            ComposeFlavor::Plugin => format!("{} (compose plugin)", self.docker.display()),
            ComposeFlavor::Standalone(bin) => {
                format!("{} + {}", self.docker.display(), bin.display())
            }
        }
    }

    /// `<engine> --version` — verifies the binary is actually invocable.
    /// Returns the version line.
    pub fn version(&self) -> Result<String> {
        let output = self.capture(Command::new(&self.docker).arg("--version"))?;
        if !output.status.success() {
            return Err(SetupError::EngineSpawnFailed(output_tail(&output)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// `<engine> info` — verifies the background daemon is reachable.
    /// Independent of `version()`: the binary can be installed while the
    /// daemon is stopped.
    pub fn daemon_check(&self) -> Result<()> {
        let output = self.capture(Command::new(&self.docker).arg("info"))?;
        if !output.status.success() {
            return Err(SetupError::DaemonUnreachable(output_tail(&output)));
        }
        Ok(())
    }

    /// Bring the topology up in detached mode.
    pub fn compose_up(&self, compose_file: &Path) -> Result<()> {
        let output = self.capture(self.compose_command(compose_file).args(["up", "-d"]))?;
        if !output.status.success() {
            return Err(SetupError::ComposeUpFailed(output_tail(&output)));
        }
        Ok(())
    }

    /// Stop and remove the topology.
    pub fn compose_down(&self, compose_file: &Path) -> Result<()> {
        let output = self.capture(self.compose_command(compose_file).arg("down"))?;
        if !output.status.success() {
            return Err(SetupError::ComposeDownFailed(output_tail(&output)));
        }
        Ok(())
    }

    /// Exec a command inside a running service. `-T` keeps the exec
    /// non-interactive — sentryup never has a TTY to hand over.
    ///
    /// A non-zero exit from the execed command is not an error here; the
    /// caller decides what a failure means (fatal for migrations, a
    /// warning for user creation).
    pub fn compose_exec(
        &self,
        compose_file: &Path,
        service: &str,
        args: &[&str],
    ) -> Result<Output> {
        self.capture(
            self.compose_command(compose_file)
                .args(["exec", "-T", service])
                .args(args),
        )
    }

    /// The compose invocation as the operator would type it, for the
    /// follow-up hints in the summary report.
    pub fn compose_hint(&self, compose_file: &Path) -> String {
        match &self.compose {
            ComposeFlavor::Plugin => {
                format!("docker compose -f {}", compose_file.display())
            }
            ComposeFlavor::Standalone(_) => {
                format!("docker-compose -f {}", compose_file.display())
            }
        }
    }

    fn compose_command(&self, compose_file: &Path) -> Command {
        let mut cmd = match &self.compose {
            ComposeFlavor::Plugin => {
                let mut cmd = Command::new(&self.docker);
                cmd.arg("compose");
                cmd
            }
            ComposeFlavor::Standalone(bin) => Command::new(bin),
        };
        cmd.arg("-f").arg(compose_file);
        cmd
    }

    fn capture(&self, cmd: &mut Command) -> Result<Output> {
        tracing::debug!(command = ?cmd, "invoking container engine");
        cmd.stdin(Stdio::null())
            .output()
            .map_err(|e| SetupError::EngineSpawnFailed(e.to_string()))
    }
}

fn plugin_available(docker: &Path) -> bool {
    Command::new(docker)
        .args(["compose", "version"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Combine stdout and stderr, trimmed, keeping at most the last 4KB.
/// Compose error output can run long; the tail carries the actual cause.
pub fn output_tail(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let (stdout, stderr) = (stdout.trim(), stderr.trim());
    let combined = if stderr.is_empty() {
        stdout.to_string()
    } else if stdout.is_empty() {
        stderr.to_string()
    } else {
        format!("{stdout}\n{stderr}")
    };
    const MAX_TAIL: usize = 4096;
    if combined.len() <= MAX_TAIL {
        return combined;
    }
    let mut start = combined.len() - MAX_TAIL;
    while !combined.is_char_boundary(start) {
        start += 1;
    }
    combined[start..].to_string()
}
