use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("compose file not found: {0} — run sentryup from the directory containing it")]
    ComposeFileNotFound(PathBuf),

    #[error("no SENTRY_SECRET_KEY entry found in {0}")]
    SecretKeyMissing(PathBuf),

    #[error("no container engine found: install Docker and make sure 'docker' is on PATH")]
    EngineNotInstalled,

    #[error("docker is installed but compose is not: install the compose plugin or docker-compose")]
    ComposeUnavailable,

    #[error("container engine daemon is not reachable: {0}")]
    DaemonUnreachable(String),

    #[error("failed to invoke container engine: {0}")]
    EngineSpawnFailed(String),

    #[error("failed to start services: {0}")]
    ComposeUpFailed(String),

    #[error("failed to tear down services: {0}")]
    ComposeDownFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SetupError>;
