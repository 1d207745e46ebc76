use anyhow::Result;

use crate::commands::CommandReport;
use crate::summary::history::{HistoryEntry, HistoryStore};
use crate::summary::paths::resolve_paths;

#[derive(Debug, Clone)]
pub enum HistoryAction {
    List,
    Show { id: i64 },
    Delete { id: i64 },
    Clear,
}

fn list_line(entry: &HistoryEntry) -> String {
    format!(
        "{}  {}  {}  {}",
        entry.id, entry.timestamp, entry.model_id, entry.original_text_snippet
    )
}

pub fn run(action: &HistoryAction) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut store = HistoryStore::load(&paths.history_file)?;
    let mut report = CommandReport::new("history");
    report.detail(format!("history_file={}", paths.history_file.display()));

    match action {
        HistoryAction::List => {
            if store.is_empty() {
                report.output("no summaries in history");
            } else {
                let lines: Vec<String> = store.entries().iter().map(list_line).collect();
                report.output(lines.join("\n"));
            }
            report.data(store.entries())?;
        }
        HistoryAction::Show { id } => match store.get(*id) {
            Some(entry) => {
                report.detail(format!("id={}", entry.id));
                report.detail(format!("timestamp={}", entry.timestamp));
                report.detail(format!("model={}", entry.model_id));
                report.detail(format!("source={}", entry.original_text_snippet));
                report.output(entry.summary.clone());
                report.data(entry)?;
            }
            None => report.issue(format!("no history entry with id {id}")),
        },
        HistoryAction::Delete { id } => {
            if store.remove(*id)? {
                report.detail(format!("deleted id={id}"));
            } else {
                report.detail(format!("no history entry with id {id}; nothing deleted"));
            }
        }
        HistoryAction::Clear => {
            store.clear()?;
            report.detail("history cleared");
        }
    }

    report.detail(format!("history_entries={}", store.len()));
    Ok(report)
}
