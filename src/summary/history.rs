use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    pub summary: String,
    #[serde(alias = "originalText")]
    pub original_text_snippet: String,
    pub timestamp: String,
    #[serde(alias = "model")]
    pub model_id: String,
}

/// Newest-first list of past summaries mirrored to a single JSON file.
///
/// Every mutation writes the whole list to disk before the in-memory copy
/// changes, so a failed write leaves both sides as they were.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = read_entries(&path)?;
        Ok(Self { path, entries })
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// An id for a new entry created at `now_millis`, strictly above the newest one.
    pub fn next_id(&self, now_millis: i64) -> i64 {
        match self.entries.iter().map(|entry| entry.id).max() {
            Some(newest) if newest >= now_millis => newest + 1,
            _ => now_millis,
        }
    }

    pub fn add(&mut self, entry: HistoryEntry) -> Result<()> {
        let mut next = Vec::with_capacity(self.entries.len() + 1);
        next.push(entry);
        next.extend(self.entries.iter().cloned());
        write_entries(&self.path, &next)?;
        self.entries = next;
        tracing::debug!(entries = self.entries.len(), "history entry added");
        Ok(())
    }

    /// Returns whether an entry was removed. Unknown ids leave the file untouched.
    pub fn remove(&mut self, id: i64) -> Result<bool> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let next: Vec<HistoryEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.id != id)
            .cloned()
            .collect();
        write_entries(&self.path, &next)?;
        self.entries = next;
        tracing::debug!(id, entries = self.entries.len(), "history entry removed");
        Ok(true)
    }

    /// Empties the list and deletes the record itself.
    pub fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                return Err(err).with_context(|| format!("failed to remove {}", self.path.display()));
            }
        }
        self.entries.clear();
        tracing::debug!("history cleared");
        Ok(())
    }
}

fn read_entries(path: &Path) -> Result<Vec<HistoryEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let parsed: Vec<HistoryEntry> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(parsed)
}

fn write_entries(path: &Path, entries: &[HistoryEntry]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;

    let data = serde_json::to_string_pretty(entries)?;
    let mut staged = NamedTempFile::new_in(&parent)
        .with_context(|| format!("failed to stage history in {}", parent.display()))?;
    staged.write_all(format!("{data}\n").as_bytes())?;
    staged
        .persist(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
