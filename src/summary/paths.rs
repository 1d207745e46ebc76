use anyhow::Result;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub app_home: PathBuf,
    pub history_file: PathBuf,
    pub inflight_lock: PathBuf,
    pub logs_dir: PathBuf,
    pub config_file: PathBuf,
}

fn required_home_dir() -> Result<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        return Ok(home);
    }
    Err(anyhow::anyhow!("HOME directory could not be resolved"))
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

pub fn resolve_paths() -> Result<AppPaths> {
    let app_home = match env::var("AI_SUM_HOME") {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => required_home_dir()?.join(".ai-sum"),
    };

    let history_file = env_or_default_path("AI_SUM_HISTORY_FILE", app_home.join("history.json"));
    let logs_dir = env_or_default_path("AI_SUM_LOGS_DIR", app_home.join("logs"));
    let config_file = env_or_default_path("AI_SUM_CONFIG_PATH", app_home.join("config.toml"));
    let inflight_lock = app_home.join("inflight.lock");

    Ok(AppPaths {
        app_home,
        history_file,
        inflight_lock,
        logs_dir,
        config_file,
    })
}
