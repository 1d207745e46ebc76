use crate::summary::models::DEFAULT_MODEL;
use crate::summary::util::is_valid_timestamp_format;
use anyhow::{Result, anyhow};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use url::Url;

pub const DEFAULT_API_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_PROXY_URL: &str = "https://api.allorigins.win/raw";
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H.%M.%S";

const API_KEY_VARS: &[&str] = &["OPENROUTER_API_KEY", "VITE_OPENROUTER_API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub endpoint: String,
    pub default_model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout_secs: u64,
    pub site_url: String,
    pub app_title: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_API_ENDPOINT.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            timeout_secs: 60,
            site_url: "http://localhost".to_string(),
            app_title: "AI Summarizer".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub proxy_url: String,
    pub timeout_secs: u64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// `local` or an IANA zone name such as `Asia/Jakarta`.
    pub timezone: String,
    pub timestamp_format: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            timezone: "local".to_string(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub extract: ExtractConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeZoneSetting {
    Local,
    Named(Tz),
}

impl HistoryConfig {
    pub fn zone(&self) -> Result<TimeZoneSetting> {
        let trimmed = self.timezone.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("local") {
            return Ok(TimeZoneSetting::Local);
        }
        trimmed
            .parse::<Tz>()
            .map(TimeZoneSetting::Named)
            .map_err(|err| anyhow!("invalid history timezone `{trimmed}`: {err}"))
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
struct PartialAppConfig {
    api: Option<ApiConfig>,
    extract: Option<ExtractConfig>,
    history: Option<HistoryConfig>,
}

fn env_non_empty(var: &str) -> Option<String> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

fn env_or_f64(var: &str, fallback: f64) -> f64 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<f64>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_u64(var: &str, fallback: u64) -> u64 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u64>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_u32(var: &str, fallback: u32) -> u32 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u32>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    env_non_empty(var).unwrap_or_else(|| fallback.to_string())
}

/// The OpenRouter credential, if any of the accepted variables carries one.
pub fn resolve_api_key() -> Option<String> {
    API_KEY_VARS.iter().find_map(|var| env_non_empty(var))
}

fn require_absolute_url(label: &str, raw: &str) -> Result<()> {
    let parsed = Url::parse(raw.trim()).map_err(|err| anyhow!("invalid {label} `{raw}`: {err}"))?;
    if parsed.cannot_be_a_base() {
        return Err(anyhow!("invalid {label} `{raw}`: must be an absolute http(s) URL"));
    }
    Ok(())
}

pub fn validate(cfg: &AppConfig) -> Result<()> {
    require_absolute_url("api endpoint", &cfg.api.endpoint)?;
    require_absolute_url("extract proxy url", &cfg.extract.proxy_url)?;
    if cfg.api.default_model.trim().is_empty() {
        return Err(anyhow!("invalid default model: cannot be empty"));
    }
    if cfg.api.max_tokens == 0 {
        return Err(anyhow!("invalid max tokens: must be >= 1"));
    }
    let t = cfg.api.temperature;
    if !(0.0..=2.0).contains(&t) {
        return Err(anyhow!("invalid temperature: require 0.0 <= temperature <= 2.0"));
    }
    if cfg.api.timeout_secs == 0 {
        return Err(anyhow!("invalid api timeout: must be >= 1 second"));
    }
    if cfg.extract.timeout_secs == 0 {
        return Err(anyhow!("invalid extract timeout: must be >= 1 second"));
    }
    if cfg.history.timestamp_format.trim().is_empty() {
        return Err(anyhow!("invalid timestamp format: cannot be empty"));
    }
    if !is_valid_timestamp_format(&cfg.history.timestamp_format) {
        return Err(anyhow!(
            "invalid timestamp format `{}`: not a strftime pattern",
            cfg.history.timestamp_format
        ));
    }
    cfg.history.zone()?;
    Ok(())
}

fn apply_file_config(base: &mut AppConfig, raw: &str, origin: &Path) -> Result<()> {
    let parsed: PartialAppConfig = toml::from_str(raw)
        .map_err(|err| anyhow!("failed to parse config {}: {err}", origin.display()))?;
    if let Some(api) = parsed.api {
        base.api = api;
    }
    if let Some(extract) = parsed.extract {
        base.extract = extract;
    }
    if let Some(history) = parsed.history {
        base.history = history;
    }
    Ok(())
}

fn merge_file_config(base: &mut AppConfig, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let raw = fs::read_to_string(path)?;
    apply_file_config(base, &raw, path)
}

fn apply_env_overrides(cfg: &mut AppConfig) {
    cfg.api.endpoint = env_or_string("AI_SUM_API_URL", &cfg.api.endpoint);
    cfg.api.default_model = env_or_string("AI_SUM_MODEL", &cfg.api.default_model);
    cfg.api.max_tokens = env_or_u32("AI_SUM_MAX_TOKENS", cfg.api.max_tokens);
    cfg.api.temperature = env_or_f64("AI_SUM_TEMPERATURE", cfg.api.temperature);
    cfg.api.timeout_secs = env_or_u64("AI_SUM_TIMEOUT_SECS", cfg.api.timeout_secs);
    cfg.api.site_url = env_or_string("AI_SUM_SITE_URL", &cfg.api.site_url);
    cfg.api.app_title = env_or_string("AI_SUM_APP_TITLE", &cfg.api.app_title);
    cfg.extract.proxy_url = env_or_string("AI_SUM_PROXY_URL", &cfg.extract.proxy_url);
    cfg.extract.timeout_secs =
        env_or_u64("AI_SUM_EXTRACT_TIMEOUT_SECS", cfg.extract.timeout_secs);
    cfg.history.timezone = env_or_string("AI_SUM_TIMEZONE", &cfg.history.timezone);
    cfg.history.timestamp_format =
        env_or_string("AI_SUM_TIMESTAMP_FORMAT", &cfg.history.timestamp_format);
}

pub fn load_config(config_file: &Path) -> Result<AppConfig> {
    let mut cfg = AppConfig::default();
    merge_file_config(&mut cfg, config_file)?;
    apply_env_overrides(&mut cfg);
    validate(&cfg)?;
    Ok(cfg)
}
