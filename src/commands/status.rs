use anyhow::Result;
use std::env;

use crate::commands::{CommandReport, load_environment};
use crate::summary::config::resolve_api_key;
use crate::summary::history::HistoryStore;

mod generated {
    include!(concat!(env!("OUT_DIR"), "/env_allowlist.rs"));
}

pub fn run() -> Result<CommandReport> {
    let (paths, cfg) = load_environment()?;
    let mut report = CommandReport::new("status");

    report.detail(format!("build_id={}", env!("BUILD_UUID")));
    report.detail(format!("app_home={}", paths.app_home.display()));
    report.detail(format!("config_file={}", paths.config_file.display()));
    report.detail(format!("history_file={}", paths.history_file.display()));
    report.detail(format!("logs_dir={}", paths.logs_dir.display()));
    report.detail(format!("api.endpoint={}", cfg.api.endpoint));
    report.detail(format!("api.default_model={}", cfg.api.default_model));
    report.detail(format!("api.max_tokens={}", cfg.api.max_tokens));
    report.detail(format!("api.temperature={}", cfg.api.temperature));
    report.detail(format!("extract.proxy_url={}", cfg.extract.proxy_url));
    report.detail(format!("history.timezone={}", cfg.history.timezone));

    for key in generated::GENERATED_ENV_ALLOWLIST {
        if env::var_os(key).is_some() {
            report.detail(format!("env.{key}=set"));
        }
    }

    if resolve_api_key().is_some() {
        report.detail("credential=present");
    } else {
        report.issue("OPENROUTER_API_KEY is not set; summarize will refuse to run");
    }

    match HistoryStore::load(&paths.history_file) {
        Ok(store) => report.detail(format!("history_entries={}", store.len())),
        Err(err) => report.issue(format!("history unreadable: {err:#}")),
    }

    report.data(&cfg)?;
    Ok(report)
}
