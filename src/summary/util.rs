use crate::summary::config::TimeZoneSetting;
use anyhow::{Result, anyhow};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use std::fmt::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};

pub const SNIPPET_CHARS: usize = 100;

pub fn now_epoch_secs() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

/// First `SNIPPET_CHARS` characters of `input`, with `...` appended when cut.
pub fn text_snippet(input: &str) -> String {
    let mut chars = input.chars();
    let head: String = chars.by_ref().take(SNIPPET_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

pub fn is_valid_timestamp_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

pub fn format_timestamp(at: DateTime<Utc>, zone: TimeZoneSetting, format: &str) -> Result<String> {
    if !is_valid_timestamp_format(format) {
        return Err(anyhow!("invalid timestamp format `{format}`"));
    }
    let mut out = String::new();
    let written = match zone {
        TimeZoneSetting::Local => write!(out, "{}", at.with_timezone(&Local).format(format)),
        TimeZoneSetting::Named(tz) => write!(out, "{}", at.with_timezone(&tz).format(format)),
    };
    written.map_err(|_| anyhow!("failed to render timestamp with `{format}`"))?;
    Ok(out)
}

/// Collapse every whitespace run to one space and trim the ends.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn snippet_keeps_short_text_untouched() {
        assert_eq!(text_snippet("short text"), "short text");
        let exact = "x".repeat(SNIPPET_CHARS);
        assert_eq!(text_snippet(&exact), exact);
    }

    #[test]
    fn snippet_truncates_by_characters_not_bytes() {
        let long = "é".repeat(SNIPPET_CHARS + 5);
        let got = text_snippet(&long);
        assert!(got.ends_with("..."));
        assert_eq!(got.chars().count(), SNIPPET_CHARS + 3);
    }

    #[test]
    fn timestamp_uses_named_zone() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 30, 5).unwrap();
        let got = format_timestamp(
            at,
            TimeZoneSetting::Named(chrono_tz::Asia::Jakarta),
            "%d/%m/%Y, %H.%M.%S",
        )
        .expect("format");
        assert_eq!(got, "01/03/2024, 07.30.05");
    }

    #[test]
    fn unknown_specifier_is_an_error_not_a_panic() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 30, 5).unwrap();
        assert!(!is_valid_timestamp_format("%d %Q"));
        assert!(format_timestamp(at, TimeZoneSetting::Local, "%d %Q").is_err());
    }

    #[test]
    fn collapse_whitespace_flattens_newlines_and_tabs() {
        assert_eq!(collapse_whitespace("  a\n\n b\t\tc  "), "a b c");
    }
}
