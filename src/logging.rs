use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "AI_SUM_LOG";
const DEFAULT_LEVEL: &str = "warn";

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_new(DEFAULT_LEVEL))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

/// Install the stderr subscriber. stdout stays reserved for command output.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_env_filter())
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
