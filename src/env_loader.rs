use std::env;
use std::path::PathBuf;

/// The app home's `.env`: `$AI_SUM_HOME/.env`, else `~/.ai-sum/.env`.
fn fallback_dotenv_path(app_home: Option<PathBuf>, home_dir: Option<PathBuf>) -> Option<PathBuf> {
    match app_home {
        Some(app_home) => Some(app_home.join(".env")),
        None => home_dir.map(|home| home.join(".ai-sum").join(".env")),
    }
}

/// Loads the working directory's `.env`, falling back to the app home one.
/// Returns the file that was applied, if any. Variables already set win.
pub fn load_dotenv() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        return Some(path);
    }

    let path = fallback_dotenv_path(
        env::var_os("AI_SUM_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from),
        dirs::home_dir(),
    )?;
    if path.is_file() && dotenvy::from_path(&path).is_ok() {
        return Some(path);
    }
    None
}
