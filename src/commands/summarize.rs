use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::commands::{CommandReport, load_environment};
use crate::error::SummarizeError;
use crate::summary::audit;
use crate::summary::config::{ExtractConfig, resolve_api_key};
use crate::summary::extract::{self, ProxyFetcher};
use crate::summary::history::HistoryStore;
use crate::summary::models::resolve_model;
use crate::summary::paths::AppPaths;
use crate::summary::request::OpenRouterClient;
use crate::summary::session::{SummarySession, TimestampStyle};

#[derive(Debug, Clone)]
pub enum TextSource {
    Inline(String),
    File(PathBuf),
    Url(String),
    Stdin,
}

#[derive(Debug, Clone)]
pub struct SummarizeOptions {
    pub source: TextSource,
    pub model: Option<String>,
}

/// Holds the cross-process in-flight lock until dropped.
struct InflightLock {
    file: File,
}

impl InflightLock {
    fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        if file.try_lock_exclusive().is_err() {
            return Err(SummarizeError::Busy.into());
        }
        Ok(Self { file })
    }
}

impl Drop for InflightLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn read_input(
    paths: &AppPaths,
    source: &TextSource,
    extract_cfg: &ExtractConfig,
    report: &mut CommandReport,
) -> Result<String> {
    match source {
        TextSource::Inline(text) => Ok(text.clone()),
        TextSource::File(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        TextSource::Stdin => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
        TextSource::Url(raw) => {
            let fetcher = ProxyFetcher::new(extract_cfg)?;
            match extract::extract(raw, &fetcher) {
                Ok(page) => {
                    audit::record_ok(paths, "extract", page.url.as_str());
                    report.detail(format!("source_url={}", page.url));
                    report.detail(format!(
                        "extract.selector={}",
                        page.selector.unwrap_or("body")
                    ));
                    Ok(page.text)
                }
                Err(err) => {
                    audit::record_error(paths, "extract", &err);
                    Err(err.into())
                }
            }
        }
    }
}

pub fn run(opts: &SummarizeOptions) -> Result<CommandReport> {
    let (paths, cfg) = load_environment()?;
    let api_key = resolve_api_key().ok_or(SummarizeError::MissingCredential)?;
    let model_id = resolve_model(opts.model.as_deref().unwrap_or(&cfg.api.default_model))?;

    let mut report = CommandReport::new("summarize");
    let input = read_input(&paths, &opts.source, &cfg.extract, &mut report)?;

    let style = TimestampStyle {
        zone: cfg.history.zone()?,
        format: cfg.history.timestamp_format.clone(),
    };
    let client = OpenRouterClient::new(&cfg.api, api_key)?;
    // History is read under the lock so a concurrent run cannot write between load and add.
    let _lock = if input.trim().is_empty() {
        None
    } else {
        Some(InflightLock::acquire(&paths.inflight_lock)?)
    };
    let history = HistoryStore::load(&paths.history_file).map_err(SummarizeError::storage)?;

    let mut session = SummarySession::new(history, cfg.api.clone(), style);
    session.select_model(model_id);
    session.set_input_text(input);

    let entry = match session.summarize(&client) {
        Ok(entry) => entry,
        Err(err) => {
            audit::record_error(&paths, "summarize", &err);
            return Err(err.into());
        }
    };
    audit::record_ok(&paths, "summarize", format!("entry {} via {}", entry.id, entry.model_id));

    report.detail(format!("id={}", entry.id));
    report.detail(format!("model={}", entry.model_id));
    report.detail(format!("history_file={}", paths.history_file.display()));
    report.detail(format!("history_entries={}", session.history().len()));
    report.output(entry.summary.clone());
    report.data(&entry)?;
    Ok(report)
}
