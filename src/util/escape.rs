//! Canonical JSON string escaping.

use std::fmt::Write;

/// Escapes `s` for inclusion in a JSON string literal.
///
/// `"`, `\` and the short control escapes use their two-character forms;
/// all other control characters, plus the line and paragraph separators
/// (which are line breaks in JavaScript source), use `\uXXXX`.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{2028}' || c == '\u{2029}' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Escapes `s` and wraps it in double quotes.
pub fn quote(s: &str) -> String {
    format!("\"{}\"", escape(s))
}
