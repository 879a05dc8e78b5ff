//! Whitespace and indentation normalisation.
//!
//! The formatter never reshuffles tokens: it walks adjacent pairs of
//! significant tokens and emits an edit wherever the whitespace between
//! them differs from the canonical spacing. Malformed stretches are left
//! verbatim. Formatting can be restricted to a byte range, which is
//! widened to whole lines.

use crate::edit::Edit;
use crate::scanner::{ScanOptions, Scanner};
use crate::syntax::{ScanError, SyntaxKind};
use serde::{Deserialize, Serialize};

/// Formatting options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Width of one indentation level, in spaces. Zero falls back to 4.
    pub tab_size: usize,
    /// Indent with spaces instead of tabs.
    pub insert_spaces: bool,
    /// Line ending for inserted line breaks, used when the document does
    /// not yet contain one. Empty falls back to "\n".
    pub eol: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            tab_size: 4,
            insert_spaces: false,
            eol: "\n".to_string(),
        }
    }
}

/// Formats the whole document. Leading whitespace before the first token
/// is stripped.
pub fn format(text: &str, options: &FormatOptions) -> Vec<Edit> {
    format_impl(text, None, options)
}

/// Formats the lines touched by the byte range `offset..offset + length`.
pub fn format_range(text: &str, offset: usize, length: usize, options: &FormatOptions) -> Vec<Edit> {
    format_impl(text, Some((offset, length)), options)
}

fn format_impl(text: &str, range: Option<(usize, usize)>, options: &FormatOptions) -> Vec<Edit> {
    let (range_start, range_end, initial_indent_level) = match range {
        Some((offset, length)) => {
            // Widen to the start of the first line, so its existing
            // indentation seeds the indent level, and across trailing
            // whitespace at the end of the last line.
            let mut start = offset.min(text.len());
            while start > 0 && !is_eol(text, start - 1) {
                start -= 1;
            }
            let mut end = (offset + length).min(text.len());
            let mut probe = end;
            while probe < text.len() && matches!(text.as_bytes()[probe], b' ' | b'\t') {
                probe += 1;
            }
            if probe == text.len() || is_eol(text, probe) {
                end = probe;
            }
            let level = compute_indent_level(&text[start..end], options);
            (start, end, level)
        }
        None => (0, text.len(), 0),
    };
    let fragment = &text[range_start..range_end];

    let eol = detect_eol(options, text);
    let tab_size = if options.tab_size > 0 {
        options.tab_size
    } else {
        4
    };
    let indent_value = if options.insert_spaces {
        " ".repeat(tab_size)
    } else {
        "\t".to_string()
    };

    let new_line_and_indent = |indent_level: i32| -> String {
        let total = initial_indent_level as i32 + indent_level;
        format!("{}{}", eol, indent_value.repeat(total.max(0) as usize))
    };

    let mut edits: Vec<Edit> = Vec::new();
    // Edits at the very end of the range are only allowed when the range
    // runs to the end of the document; elsewhere the next line continues
    // and must not be touched.
    let add_edit = |edits: &mut Vec<Edit>, has_error: bool, content: &str, start: usize, end: usize| {
        if !has_error
            && (start < range_end || (start == range_end && range_end == text.len()))
            && &text[start..end] != content
        {
            edits.push(Edit {
                offset: start,
                length: end - start,
                content: content.to_string(),
            });
        }
    };

    let mut cursor = TokenCursor {
        scanner: Scanner::new(fragment, ScanOptions { trivia: true }),
        line_break: false,
        has_error: false,
    };

    let mut indent_level = 0i32;
    let mut first_token = cursor.scan_next();

    if first_token != SyntaxKind::EOF {
        let first_token_start = cursor.scanner.token_offset() + range_start;
        let initial_indent = indent_value.repeat(initial_indent_level);
        add_edit(
            &mut edits,
            cursor.has_error,
            &initial_indent,
            range_start,
            first_token_start,
        );
    }

    while first_token != SyntaxKind::EOF {
        let mut first_token_end =
            cursor.scanner.token_offset() + cursor.scanner.token_length() + range_start;
        let mut second_token = cursor.scan_next();

        let mut replace_content = String::new();
        // Comments on the same line as the previous token stay there,
        // separated by a single space.
        while !cursor.line_break && second_token.is_comment() {
            let comment_start = cursor.scanner.token_offset() + range_start;
            add_edit(&mut edits, cursor.has_error, " ", first_token_end, comment_start);
            first_token_end =
                cursor.scanner.token_offset() + cursor.scanner.token_length() + range_start;
            replace_content = if second_token == SyntaxKind::LINE_COMMENT {
                new_line_and_indent(indent_level)
            } else {
                String::new()
            };
            second_token = cursor.scan_next();
        }

        if second_token == SyntaxKind::BRACE_END {
            if first_token != SyntaxKind::BRACE_START {
                indent_level -= 1;
                replace_content = new_line_and_indent(indent_level);
            }
        } else if second_token == SyntaxKind::BRACKET_END {
            if first_token != SyntaxKind::BRACKET_START {
                indent_level -= 1;
                replace_content = new_line_and_indent(indent_level);
            }
        } else {
            match first_token {
                SyntaxKind::BRACE_START | SyntaxKind::BRACKET_START => {
                    indent_level += 1;
                    replace_content = new_line_and_indent(indent_level);
                }
                SyntaxKind::COMMA | SyntaxKind::LINE_COMMENT => {
                    replace_content = new_line_and_indent(indent_level);
                }
                SyntaxKind::BLOCK_COMMENT => {
                    replace_content = if cursor.line_break {
                        new_line_and_indent(indent_level)
                    } else {
                        " ".to_string()
                    };
                }
                SyntaxKind::COLON => {
                    replace_content = " ".to_string();
                }
                SyntaxKind::STRING if second_token == SyntaxKind::COLON => {
                    replace_content = String::new();
                }
                SyntaxKind::STRING
                | SyntaxKind::NULL
                | SyntaxKind::TRUE
                | SyntaxKind::FALSE
                | SyntaxKind::NUMBER
                | SyntaxKind::BRACE_END
                | SyntaxKind::BRACKET_END => {
                    if second_token.is_comment() {
                        replace_content = " ".to_string();
                    } else if second_token != SyntaxKind::COMMA && second_token != SyntaxKind::EOF {
                        // Tokens that cannot legally be adjacent; leave the
                        // stretch untouched.
                        cursor.has_error = true;
                    }
                }
                SyntaxKind::UNKNOWN => {
                    cursor.has_error = true;
                }
                _ => {}
            }
            if cursor.line_break && second_token.is_comment() {
                replace_content = new_line_and_indent(indent_level);
            }
        }

        let second_token_start = cursor.scanner.token_offset() + range_start;
        add_edit(
            &mut edits,
            cursor.has_error,
            &replace_content,
            first_token_end,
            second_token_start,
        );
        first_token = second_token;
    }

    edits
}

struct TokenCursor<'s> {
    scanner: Scanner<'s>,
    line_break: bool,
    has_error: bool,
}

impl TokenCursor<'_> {
    fn scan_next(&mut self) -> SyntaxKind {
        let mut token = Scanner::scan(&mut self.scanner);
        self.line_break = false;
        while matches!(token, SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE) {
            self.line_break = self.line_break || token == SyntaxKind::NEWLINE;
            token = Scanner::scan(&mut self.scanner);
        }
        self.has_error =
            token == SyntaxKind::UNKNOWN || self.scanner.token_error() != ScanError::None;
        token
    }
}

pub(crate) fn is_eol(text: &str, pos: usize) -> bool {
    matches!(text.as_bytes().get(pos).copied(), Some(b'\n') | Some(b'\r'))
}

// Existing leading whitespace of the fragment, in indent units rounded down.
fn compute_indent_level(fragment: &str, options: &FormatOptions) -> usize {
    let tab_size = if options.tab_size > 0 {
        options.tab_size
    } else {
        4
    };
    let mut chars = 0;
    for c in fragment.chars() {
        match c {
            ' ' => chars += 1,
            '\t' => chars += tab_size,
            _ => break,
        }
    }
    chars / tab_size
}

// Line breaks are inserted in the style the document already uses; the
// option only decides for documents without one.
fn detect_eol(options: &FormatOptions, text: &str) -> String {
    let bytes = text.as_bytes();
    for (i, b) in bytes.iter().copied().enumerate() {
        match b {
            b'\r' => {
                if bytes.get(i + 1) == Some(&b'\n') {
                    return "\r\n".to_string();
                }
                return "\r".to_string();
            }
            b'\n' => return "\n".to_string(),
            _ => {}
        }
    }
    if options.eol.is_empty() {
        "\n".to_string()
    } else {
        options.eol.clone()
    }
}
