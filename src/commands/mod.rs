pub mod extract;
pub mod history;
pub mod models;
pub mod status;
pub mod summarize;

use crate::summary::config::{AppConfig, load_config};
use crate::summary::paths::{AppPaths, resolve_paths};
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    /// Primary result text, printed on stdout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub details: Vec<String>,
    pub issues: Vec<String>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            output: None,
            data: None,
            details: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }

    pub fn output(&mut self, text: impl Into<String>) {
        self.output = Some(text.into());
    }

    pub fn data(&mut self, value: impl Serialize) -> Result<()> {
        self.data = Some(serde_json::to_value(value)?);
        Ok(())
    }
}

pub(crate) fn load_environment() -> Result<(AppPaths, AppConfig)> {
    let paths = resolve_paths()?;
    let cfg = load_config(&paths.config_file)?;
    Ok((paths, cfg))
}
