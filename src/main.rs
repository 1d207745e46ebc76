mod cli;
mod commands;
mod env_loader;
mod error;
mod logging;
mod summary;

use error::SummarizeError;

const EXIT_FAILURE: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    let dotenv = env_loader::load_dotenv();
    logging::init();
    if let Some(path) = &dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    if let Err(err) = cli::run() {
        eprintln!("error: {err:#}");
        let code = match err.downcast_ref::<SummarizeError>() {
            Some(inner) if inner.is_usage_error() => EXIT_USAGE,
            _ => EXIT_FAILURE,
        };
        std::process::exit(code);
    }
}
