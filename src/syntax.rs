//! Declaration of the syntax tokens and lexer implementation.

#![allow(non_camel_case_types)]

use logos::{Lexer, Logos};

/// Scan-level error code attached to the token that triggered it.
///
/// The lexer never aborts: a malformed token is still produced, spanning
/// as much input as the construct consumed, with the error recorded here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanError {
    None,
    UnexpectedEndOfComment,
    UnexpectedEndOfString,
    UnexpectedEndOfNumber,
    InvalidUnicode,
    InvalidEscapeCharacter,
    InvalidCharacter,
}

impl Default for ScanError {
    fn default() -> Self {
        ScanError::None
    }
}

/// Per-token scratch state written by the lexer callbacks.
///
/// Reset by the scanner before every `next()` call.
#[derive(Debug, Default)]
pub struct TokenContext {
    pub(crate) error: ScanError,
    pub(crate) value: Option<String>,
}

/// Enum containing all the tokens of the JSONC syntax.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[logos(extras = TokenContext)]
#[repr(u16)]
pub enum SyntaxKind {
    #[regex(r"[ \t\x0b\x0c\u{00A0}\u{1680}\u{2000}-\u{200B}\u{202F}\u{205F}\u{3000}\u{FEFF}]+")]
    WHITESPACE = 0,

    // "\r\n" is a single token, "\n\r" is two.
    #[regex(r"\r\n|[\n\r\u{2028}\u{2029}]")]
    NEWLINE,

    #[regex(r"//[^\n\r\u{2028}\u{2029}]*")]
    LINE_COMMENT,

    #[token("/*", lex_block_comment)]
    BLOCK_COMMENT,

    #[token("{")]
    BRACE_START,

    #[token("}")]
    BRACE_END,

    #[token("[")]
    BRACKET_START,

    #[token("]")]
    BRACKET_END,

    #[token(":")]
    COLON,

    #[token(",")]
    COMMA,

    #[token("\"", lex_string)]
    STRING,

    #[regex(r"[0-9-]", lex_number)]
    NUMBER,

    #[token("true")]
    TRUE,

    #[token("false")]
    FALSE,

    #[token("null")]
    NULL,

    // Maximal run of characters that cannot start any other token, so that
    // `foo-bar`, `nulllll` and `.0` each scan as a single unknown token.
    // Keywords win same-length ties through their higher priority.
    #[regex(
        r#"[^ \t\x0b\x0c\u{00A0}\u{1680}\u{2000}-\u{200B}\u{202F}\u{205F}\u{3000}\u{FEFF}\n\r\u{2028}\u{2029}{}\[\],:"/0-9-][^ \t\x0b\x0c\u{00A0}\u{1680}\u{2000}-\u{200B}\u{202F}\u{205F}\u{3000}\u{FEFF}\n\r\u{2028}\u{2029}{}\[\],:"/]*"#,
        priority = 1
    )]
    UNKNOWN,

    #[error]
    ERROR,

    // Sentinel produced by the scanner once the lexer is exhausted.
    EOF,
}

impl SyntaxKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::WHITESPACE
                | SyntaxKind::NEWLINE
                | SyntaxKind::LINE_COMMENT
                | SyntaxKind::BLOCK_COMMENT
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(self, SyntaxKind::LINE_COMMENT | SyntaxKind::BLOCK_COMMENT)
    }
}

fn lex_block_comment(lex: &mut Lexer<SyntaxKind>) {
    let rem = lex.remainder();
    match rem.find("*/") {
        Some(i) => lex.bump(i + 2),
        None => {
            lex.bump(rem.len());
            lex.extras.error = ScanError::UnexpectedEndOfComment;
        }
    }
}

// The trigger pattern matches a single digit or "-"; the callback consumes
// the rest of the number. Returns false for a bare "-", which then surfaces
// as a single-character unknown token.
fn lex_number(lex: &mut Lexer<SyntaxKind>) -> bool {
    let rem = lex.remainder().as_bytes();
    let mut pos = 0usize;

    let leading = if lex.slice() == "-" {
        match rem.first() {
            Some(b) if b.is_ascii_digit() => {
                pos += 1;
                rem[0]
            }
            _ => return false,
        }
    } else {
        lex.slice().as_bytes()[0]
    };

    // After a leading zero no further integer digits are consumed, which is
    // how "01" scans as two numeric tokens.
    if leading != b'0' {
        while pos < rem.len() && rem[pos].is_ascii_digit() {
            pos += 1;
        }
    }

    let mut error = ScanError::None;
    if pos < rem.len() && rem[pos] == b'.' {
        pos += 1;
        if pos < rem.len() && rem[pos].is_ascii_digit() {
            while pos < rem.len() && rem[pos].is_ascii_digit() {
                pos += 1;
            }
        } else {
            // The token keeps the dangling dot; no exponent is attempted.
            lex.bump(pos);
            lex.extras.error = ScanError::UnexpectedEndOfNumber;
            lex.extras.value = Some(lex.slice().to_string());
            return true;
        }
    }

    // The exponent is consumed tentatively: "1e" spans both characters but
    // its value stays "1".
    let mut end = pos;
    if pos < rem.len() && (rem[pos] == b'e' || rem[pos] == b'E') {
        pos += 1;
        if pos < rem.len() && (rem[pos] == b'+' || rem[pos] == b'-') {
            pos += 1;
        }
        if pos < rem.len() && rem[pos].is_ascii_digit() {
            while pos < rem.len() && rem[pos].is_ascii_digit() {
                pos += 1;
            }
            end = pos;
        } else {
            error = ScanError::UnexpectedEndOfNumber;
        }
    }

    let value_len = lex.slice().len() + end;
    lex.bump(pos);
    lex.extras.error = error;
    lex.extras.value = Some(lex.slice()[..value_len].to_string());
    true
}

fn lex_string(lex: &mut Lexer<SyntaxKind>) {
    let rem = lex.remainder();
    let mut value = String::new();
    let mut error = ScanError::None;
    let mut pending_surrogate: Option<u16> = None;
    let mut pos = 0usize;

    loop {
        let ch = match rem[pos..].chars().next() {
            Some(ch) => ch,
            None => {
                error = ScanError::UnexpectedEndOfString;
                break;
            }
        };
        if ch == '"' {
            pos += 1;
            break;
        }
        if ch == '\\' {
            pos += 1;
            let ch2 = match rem[pos..].chars().next() {
                Some(ch2) => ch2,
                None => {
                    error = ScanError::UnexpectedEndOfString;
                    break;
                }
            };
            pos += ch2.len_utf8();
            if ch2 != 'u' {
                flush_surrogate(&mut value, &mut pending_surrogate);
            }
            match ch2 {
                '"' => value.push('"'),
                '\\' => value.push('\\'),
                '/' => value.push('/'),
                'b' => value.push('\u{0008}'),
                'f' => value.push('\u{000C}'),
                'n' => value.push('\n'),
                'r' => value.push('\r'),
                't' => value.push('\t'),
                'u' => match scan_hex4(rem, &mut pos) {
                    Some(unit) => push_utf16_unit(&mut value, &mut pending_surrogate, unit),
                    None => error = ScanError::InvalidUnicode,
                },
                other => {
                    // Invalid escapes keep the escaped character literally.
                    error = ScanError::InvalidEscapeCharacter;
                    value.push(other);
                }
            }
            continue;
        }
        if (ch as u32) < 0x20 {
            if ch == '\r' || ch == '\n' {
                // The literal ends before the line break.
                error = ScanError::UnexpectedEndOfString;
                break;
            }
            error = ScanError::InvalidCharacter;
        }
        flush_surrogate(&mut value, &mut pending_surrogate);
        value.push(ch);
        pos += ch.len_utf8();
    }

    flush_surrogate(&mut value, &mut pending_surrogate);
    lex.bump(pos);
    lex.extras.error = error;
    lex.extras.value = Some(value);
}

// Consumes up to four hex digits; fewer than four is an invalid escape.
fn scan_hex4(rem: &str, pos: &mut usize) -> Option<u16> {
    let bytes = rem.as_bytes();
    let mut unit = 0u16;
    let mut count = 0;
    while count < 4 {
        let digit = match bytes.get(*pos).and_then(|b| (*b as char).to_digit(16)) {
            Some(d) => d,
            None => break,
        };
        unit = unit * 16 + digit as u16;
        *pos += 1;
        count += 1;
    }
    if count == 4 {
        Some(unit)
    } else {
        None
    }
}

// `\uXXXX` escapes are UTF-16 code units; adjacent surrogate halves combine
// into one character, unpaired halves decode to U+FFFD.
fn push_utf16_unit(value: &mut String, pending: &mut Option<u16>, unit: u16) {
    if let Some(high) = pending.take() {
        if (0xDC00..=0xDFFF).contains(&unit) {
            let c = 0x10000 + (((high as u32) - 0xD800) << 10) + ((unit as u32) - 0xDC00);
            value.push(std::char::from_u32(c).unwrap_or('\u{FFFD}'));
            return;
        }
        value.push('\u{FFFD}');
    }
    if (0xD800..=0xDBFF).contains(&unit) {
        *pending = Some(unit);
    } else if (0xDC00..=0xDFFF).contains(&unit) {
        value.push('\u{FFFD}');
    } else {
        value.push(std::char::from_u32(unit as u32).unwrap_or('\u{FFFD}'));
    }
}

fn flush_surrogate(value: &mut String, pending: &mut Option<u16>) {
    if pending.take().is_some() {
        value.push('\u{FFFD}');
    }
}
