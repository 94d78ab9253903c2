use anyhow::Context;
use sentryup_core::compose;
use sentryup_core::engine::Engine;
use std::path::Path;

/// Stop and remove the instance. Unlike the pre-start teardown inside
/// `up --clean`, a failure here is fatal — the operator asked for it
/// explicitly and needs to know it did not happen.
pub fn run(file: &Path) -> anyhow::Result<()> {
    compose::require(file)?;
    let engine = Engine::detect()?;
    engine
        .compose_down(file)
        .context("failed to stop the instance")?;
    println!("Instance stopped and removed");
    Ok(())
}
