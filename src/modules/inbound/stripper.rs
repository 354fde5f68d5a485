// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use regex::Regex;
use std::sync::LazyLock;

static ON_WROTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*on\s.*wrote:\s*$").expect("regex is valid"));
// First half of an attribution line that wrapped before `wrote:`.
static ON_WRAPPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*on\s.*\d").expect("regex is valid"));
static WROTE_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)wrote:\s*$").expect("regex is valid"));
static ORIGINAL_MESSAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*-{2,}.*original message").expect("regex is valid"));
static FROM_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*from:.*@").expect("regex is valid"));
static SENT_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*sent:.*\b(19|20)\d{2}\b").expect("regex is valid"));

/// Keeps only what precedes the first quoted-reply marker or signature delimiter.
/// An empty result means the message carried nothing new.
pub fn strip(text: &str) -> String {
    let lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
    let cut = lines
        .iter()
        .enumerate()
        .position(|(index, line)| is_marker(line, lines.get(index + 1).copied()))
        .unwrap_or(lines.len());
    lines[..cut].join("\n").trim().to_string()
}

fn is_marker(line: &str, next: Option<&str>) -> bool {
    if ON_WROTE.is_match(line) {
        return true;
    }
    if ON_WRAPPED.is_match(line) && next.is_some_and(|n| WROTE_TAIL.is_match(n)) {
        return true;
    }
    line.trim_start().starts_with('>')
        || line.trim() == "--"
        || ORIGINAL_MESSAGE.is_match(line)
        || FROM_HEADER.is_match(line)
        || SENT_HEADER.is_match(line)
}
