//! Text preparation shared by the parser and transcript tooling.

use crate::frame::FRAME_PREFIXES;

const FENCE: &str = "```";

/// Converts `\r\n` and lone `\r` line endings to `\n`.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Removes one layer of fenced-code markers when they wrap the whole text.
///
/// The opening fence may carry a language tag (```` ```text ````). Text that
/// is not fully wrapped is returned unchanged.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed
        .strip_prefix(FENCE)
        .and_then(|rest| rest.strip_suffix(FENCE))
    else {
        return text;
    };
    match inner.split_once('\n') {
        Some((_tag, body)) => body.trim_end_matches('\n'),
        None => text,
    }
}

/// Splits a transcript into frame-sized blocks.
///
/// A new block starts at every line that begins with a frame prefix. Lines
/// before the first header form their own block. Blocks are trimmed and
/// empty blocks dropped.
pub fn split_messages(text: &str) -> Vec<String> {
    let text = normalize_newlines(text);
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        let is_header = FRAME_PREFIXES.iter().any(|p| line.starts_with(p));
        if is_header && !current.is_empty() {
            blocks.push(current.join("\n").trim().to_string());
            current.clear();
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(current.join("\n").trim().to_string());
    }

    blocks.retain(|b| !b.is_empty());
    blocks
}
