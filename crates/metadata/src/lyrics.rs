use std::sync::OnceLock;

use regex::Regex;

static TIMESTAMP_RE: OnceLock<Regex> = OnceLock::new();
static HEADER_RE: OnceLock<Regex> = OnceLock::new();

/// Turns LRC-style lyrics into plain lines.
///
/// Line endings are unified, `[mm:ss]` / `[mm:ss.fff]` timestamps and the
/// `[ti:]`, `[ar:]`, `[al:]`, `[by:]` headers are removed, every line is
/// trimmed and empty lines are dropped. Text without LRC markup passes
/// through trimmed.
pub fn clean_lyrics(raw: &str) -> String {
    let timestamp = TIMESTAMP_RE.get_or_init(|| {
        Regex::new(r"\[\d{1,2}:\d{2}(?:\.\d{1,3})?\]").expect("timestamp pattern")
    });
    let header = HEADER_RE
        .get_or_init(|| Regex::new(r"\[(?:ti|ar|al|by):[^\]]*\]").expect("header pattern"));

    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text = timestamp.replace_all(&text, "");
    let text = header.replace_all(&text, "");

    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
