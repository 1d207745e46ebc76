#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const API_KEY_VARS: &[&str] = &["OPENROUTER_API_KEY", "VITE_OPENROUTER_API_KEY"];

/// A command confined to `tmp`: its own app home, HOME and working dir, and
/// no inherited credential or overrides.
pub fn ai_sum(tmp: &TempDir) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("ai-sum");
    cmd.current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("AI_SUM_HOME", app_home(tmp.path()))
        .env_remove("AI_SUM_HISTORY_FILE")
        .env_remove("AI_SUM_CONFIG_PATH")
        .env_remove("AI_SUM_API_URL")
        .env_remove("AI_SUM_PROXY_URL")
        .env_remove("AI_SUM_MODEL")
        .env_remove("AI_SUM_LOG");
    for var in API_KEY_VARS {
        cmd.env_remove(var);
    }
    cmd
}

pub fn app_home(root: &Path) -> PathBuf {
    root.join("home")
}

pub fn history_file(root: &Path) -> PathBuf {
    app_home(root).join("history.json")
}

pub fn write_history(root: &Path, raw: &str) {
    let path = history_file(root);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir home");
    fs::write(path, raw).expect("write history");
}

pub fn read_history(root: &Path) -> serde_json::Value {
    let raw = fs::read_to_string(history_file(root)).expect("read history");
    serde_json::from_str(&raw).expect("history json")
}
