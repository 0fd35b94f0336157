//! Process bootstrap shared by the dispatch binaries.

use anyhow::Result;
use tracing::{error, info, Level};

pub mod metrics;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Initialise tracing, then run `f` once, logging its outcome and duration.
pub fn run<T, F>(name: &str, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    init_tracing();
    info!(%name, "starting");
    let timer = metrics::BuildTimer::start();
    let out = f();
    let elapsed_ms = timer.elapsed().as_millis() as u64;
    match &out {
        Ok(_) => info!(%name, elapsed_ms, "finished"),
        Err(err) => error!(%name, elapsed_ms, error = format!("{err:#}"), "failed"),
    }
    out
}
