use crate::error::SummarizeError;
use crate::summary::paths::AppPaths;
use crate::summary::util::now_epoch_secs;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;

pub const AUDIT_FILE: &str = "audit.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Ok,
    Error,
}

/// One line of `audit.log`. Failed runs carry the stable error code so the
/// log can be grepped without parsing messages.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub at_epoch_secs: u64,
    pub command: &'static str,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    pub detail: String,
}

impl AuditEvent {
    fn now(command: &'static str, outcome: Outcome, detail: String) -> Result<Self> {
        Ok(Self {
            at_epoch_secs: now_epoch_secs()?,
            command,
            outcome,
            code: None,
            detail,
        })
    }
}

pub fn append_event(paths: &AppPaths, event: &AuditEvent) -> Result<()> {
    fs::create_dir_all(&paths.logs_dir)
        .with_context(|| format!("failed to create {}", paths.logs_dir.display()))?;
    let line = format!("{}\n", serde_json::to_string(event)?);
    let path = paths.logs_dir.join(AUDIT_FILE);
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.write_all(line.as_bytes())?;
    Ok(())
}

/// Audit writes never fail the command that triggered them.
fn write_or_warn(paths: &AppPaths, event: Result<AuditEvent>) {
    let result = event.and_then(|event| append_event(paths, &event));
    if let Err(err) = result {
        tracing::warn!(error = %format!("{err:#}"), "failed to append audit event");
    }
}

pub fn record_ok(paths: &AppPaths, command: &'static str, detail: impl Into<String>) {
    write_or_warn(paths, AuditEvent::now(command, Outcome::Ok, detail.into()));
}

pub fn record_error(paths: &AppPaths, command: &'static str, err: &SummarizeError) {
    let event = AuditEvent::now(command, Outcome::Error, err.to_string()).map(|mut event| {
        event.code = Some(err.code().as_str());
        event
    });
    write_or_warn(paths, event);
}
