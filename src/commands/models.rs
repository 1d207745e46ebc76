use anyhow::Result;

use crate::commands::{CommandReport, load_environment};
use crate::summary::models::MODEL_CATALOG;

pub fn run() -> Result<CommandReport> {
    let (_, cfg) = load_environment()?;
    let mut report = CommandReport::new("models");

    let default_model = cfg.api.default_model.as_str();
    let lines: Vec<String> = MODEL_CATALOG
        .iter()
        .map(|m| {
            let marker = if m.id == default_model { "*" } else { " " };
            format!(
                "{marker} {:<18} {:<42} {} ({})",
                m.alias, m.id, m.label, m.description
            )
        })
        .collect();

    report.output(lines.join("\n"));
    report.data(MODEL_CATALOG)?;
    report.detail(format!("default_model={default_model}"));
    Ok(report)
}
