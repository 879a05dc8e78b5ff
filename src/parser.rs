//! Streaming JSONC walker.
//!
//! The walker drives a [`Visitor`] across the token stream while enforcing
//! JSON grammar. It does not stop at unexpected or invalid tokens: errors
//! are reported through the visitor with their byte offsets and lengths,
//! the walker resynchronises and continues.

use crate::scanner::{ScanOptions, Scanner};
use crate::syntax::{ScanError, SyntaxKind};
use crate::util::escape::quote;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Options controlling which JSONC extensions the walker accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Accept line and block comments.
    pub comments: bool,
    /// Accept a trailing comma before `}` and `]`.
    pub trailing_commas: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            comments: true,
            trailing_commas: true,
        }
    }
}

/// Grammar-level error codes reported through [`Visitor::on_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ParseErrorCode {
    #[error("invalid symbol")]
    InvalidSymbol,
    #[error("invalid number format")]
    InvalidNumberFormat,
    #[error("property name expected")]
    PropertyNameExpected,
    #[error("value expected")]
    ValueExpected,
    #[error(r#"":" expected"#)]
    ColonExpected,
    #[error(r#""," expected"#)]
    CommaExpected,
    #[error(r#""}}" expected"#)]
    CloseBraceExpected,
    #[error(r#""]" expected"#)]
    CloseBracketExpected,
    #[error("end of file expected")]
    EndOfFileExpected,
    #[error("comments are not allowed")]
    InvalidCommentToken,
    #[error("unexpected end of comment")]
    UnexpectedEndOfComment,
    #[error("unexpected end of string")]
    UnexpectedEndOfString,
    #[error("unexpected end of number")]
    UnexpectedEndOfNumber,
    #[error("invalid unicode sequence")]
    InvalidUnicode,
    #[error("invalid escape character")]
    InvalidEscapeCharacter,
    #[error("invalid character")]
    InvalidCharacter,
}

/// A reported parse error with its source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{code} at offset {offset}")]
pub struct ParseError {
    pub code: ParseErrorCode,
    pub offset: usize,
    pub length: usize,
}

/// A literal JSON value as delivered by the walker.
///
/// Numbers keep their source text so that exponents and precision survive
/// round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(String),
    String(String),
}

/// Callbacks driven by [`walk`]. All methods default to no-ops.
pub trait Visitor {
    fn on_object_begin(&mut self, offset: usize) {
        let _ = offset;
    }
    fn on_object_end(&mut self, offset: usize, length: usize) {
        let _ = (offset, length);
    }
    fn on_array_begin(&mut self, offset: usize) {
        let _ = offset;
    }
    fn on_array_end(&mut self, offset: usize, length: usize) {
        let _ = (offset, length);
    }
    /// A property name, already unescaped.
    fn on_property(&mut self, name: &str, offset: usize, length: usize) {
        let _ = (name, offset, length);
    }
    fn on_value(&mut self, value: &Scalar, offset: usize, length: usize, kind: SyntaxKind) {
        let _ = (value, offset, length, kind);
    }
    fn on_separator(&mut self, ch: char, offset: usize, length: usize) {
        let _ = (ch, offset, length);
    }
    fn on_comment(&mut self, offset: usize, length: usize) {
        let _ = (offset, length);
    }
    fn on_error(&mut self, code: ParseErrorCode, offset: usize, length: usize) {
        let _ = (code, offset, length);
    }
}

/// Walks `source`, reporting structure, literals, comments and errors to
/// `visitor`. Returns `false` only for the empty string.
pub fn walk(source: &str, options: ParseOptions, visitor: &mut dyn Visitor) -> bool {
    let mut walker = Walker {
        scanner: Scanner::new(source, ScanOptions { trivia: false }),
        visitor,
        options,
        last_error: None,
    };

    walker.scan_next();
    if walker.scanner.token() == SyntaxKind::EOF {
        return !source.is_empty();
    }
    if !walker.parse_value() {
        walker.handle_error(ParseErrorCode::ValueExpected, &[], &[]);
        return true;
    }
    if walker.scanner.token() != SyntaxKind::EOF {
        walker.handle_error(ParseErrorCode::EndOfFileExpected, &[], &[]);
    }
    true
}

struct Walker<'s, 'v> {
    scanner: Scanner<'s>,
    visitor: &'v mut dyn Visitor,
    options: ParseOptions,
    last_error: Option<(usize, ParseErrorCode)>,
}

impl Walker<'_, '_> {
    /// Advances to the next significant token, reporting scan errors,
    /// comments and stray unknown tokens along the way.
    fn scan_next(&mut self) -> SyntaxKind {
        loop {
            let token = Scanner::scan(&mut self.scanner);
            let offset = self.scanner.token_offset();
            let length = self.scanner.token_length();
            if let Some(code) = translate_scan_error(self.scanner.token_error()) {
                self.report(code, offset, length);
            }
            match token {
                SyntaxKind::LINE_COMMENT | SyntaxKind::BLOCK_COMMENT => {
                    self.visitor.on_comment(offset, length);
                    if !self.options.comments {
                        self.report(ParseErrorCode::InvalidCommentToken, offset, length);
                    }
                }
                SyntaxKind::UNKNOWN => {
                    self.report(ParseErrorCode::InvalidSymbol, offset, length);
                }
                _ => return token,
            }
        }
    }

    fn report(&mut self, code: ParseErrorCode, offset: usize, length: usize) {
        if self.last_error == Some((offset, code)) {
            return;
        }
        self.last_error = Some((offset, code));
        self.visitor.on_error(code, offset, length);
    }

    /// Reports an error at the current token and optionally skips forward
    /// to a synchronising token.
    fn handle_error(
        &mut self,
        code: ParseErrorCode,
        skip_until_after: &[SyntaxKind],
        skip_until: &[SyntaxKind],
    ) {
        self.report(
            code,
            self.scanner.token_offset(),
            self.scanner.token_length(),
        );
        if skip_until_after.is_empty() && skip_until.is_empty() {
            return;
        }
        let mut token = self.scanner.token();
        while token != SyntaxKind::EOF {
            if skip_until_after.contains(&token) {
                self.scan_next();
                break;
            }
            if skip_until.contains(&token) {
                break;
            }
            token = self.scan_next();
        }
    }

    fn parse_value(&mut self) -> bool {
        match self.scanner.token() {
            SyntaxKind::BRACE_START => self.parse_object(),
            SyntaxKind::BRACKET_START => self.parse_array(),
            SyntaxKind::STRING => self.parse_string(true),
            _ => self.parse_literal(),
        }
    }

    fn parse_string(&mut self, is_value: bool) -> bool {
        let offset = self.scanner.token_offset();
        let length = self.scanner.token_length();
        let value = self.scanner.token_value().to_string();
        if is_value {
            self.visitor
                .on_value(&Scalar::String(value), offset, length, SyntaxKind::STRING);
        } else {
            self.visitor.on_property(&value, offset, length);
        }
        self.scan_next();
        true
    }

    fn parse_literal(&mut self) -> bool {
        let token = self.scanner.token();
        let offset = self.scanner.token_offset();
        let length = self.scanner.token_length();
        let value = match token {
            SyntaxKind::NUMBER => {
                let raw = self.scanner.token_value().to_string();
                if raw.parse::<f64>().is_err() {
                    self.report(ParseErrorCode::InvalidNumberFormat, offset, length);
                }
                Scalar::Number(raw)
            }
            SyntaxKind::NULL => Scalar::Null,
            SyntaxKind::TRUE => Scalar::Bool(true),
            SyntaxKind::FALSE => Scalar::Bool(false),
            _ => return false,
        };
        self.visitor.on_value(&value, offset, length, token);
        self.scan_next();
        true
    }

    fn parse_property(&mut self) -> bool {
        if self.scanner.token() != SyntaxKind::STRING {
            self.handle_error(
                ParseErrorCode::PropertyNameExpected,
                &[],
                &[SyntaxKind::BRACE_END, SyntaxKind::COMMA],
            );
            return false;
        }
        self.parse_string(false);
        if self.scanner.token() == SyntaxKind::COLON {
            self.visitor.on_separator(
                ':',
                self.scanner.token_offset(),
                self.scanner.token_length(),
            );
            self.scan_next();
            if !self.parse_value() {
                self.handle_error(
                    ParseErrorCode::ValueExpected,
                    &[],
                    &[SyntaxKind::BRACE_END, SyntaxKind::COMMA],
                );
            }
        } else {
            self.handle_error(
                ParseErrorCode::ColonExpected,
                &[],
                &[SyntaxKind::BRACE_END, SyntaxKind::COMMA],
            );
        }
        true
    }

    fn parse_object(&mut self) -> bool {
        self.visitor.on_object_begin(self.scanner.token_offset());
        self.scan_next();
        let mut needs_comma = false;
        while !matches!(self.scanner.token(), SyntaxKind::BRACE_END | SyntaxKind::EOF) {
            if self.scanner.token() == SyntaxKind::COMMA {
                if !needs_comma {
                    self.handle_error(ParseErrorCode::ValueExpected, &[], &[]);
                }
                self.visitor.on_separator(
                    ',',
                    self.scanner.token_offset(),
                    self.scanner.token_length(),
                );
                self.scan_next();
                if self.scanner.token() == SyntaxKind::BRACE_END && self.options.trailing_commas {
                    break;
                }
            } else if needs_comma {
                self.handle_error(ParseErrorCode::CommaExpected, &[], &[]);
            }
            if !self.parse_property() {
                self.handle_error(
                    ParseErrorCode::ValueExpected,
                    &[],
                    &[SyntaxKind::BRACE_END, SyntaxKind::COMMA],
                );
            }
            needs_comma = true;
        }
        self.visitor.on_object_end(
            self.scanner.token_offset(),
            self.scanner.token_length(),
        );
        if self.scanner.token() != SyntaxKind::BRACE_END {
            self.handle_error(ParseErrorCode::CloseBraceExpected, &[SyntaxKind::BRACE_END], &[]);
        } else {
            self.scan_next();
        }
        true
    }

    fn parse_array(&mut self) -> bool {
        self.visitor.on_array_begin(self.scanner.token_offset());
        self.scan_next();
        let mut needs_comma = false;
        while !matches!(
            self.scanner.token(),
            SyntaxKind::BRACKET_END | SyntaxKind::EOF
        ) {
            if self.scanner.token() == SyntaxKind::COMMA {
                if !needs_comma {
                    self.handle_error(ParseErrorCode::ValueExpected, &[], &[]);
                }
                self.visitor.on_separator(
                    ',',
                    self.scanner.token_offset(),
                    self.scanner.token_length(),
                );
                self.scan_next();
                if self.scanner.token() == SyntaxKind::BRACKET_END && self.options.trailing_commas
                {
                    break;
                }
            } else if needs_comma {
                self.handle_error(ParseErrorCode::CommaExpected, &[], &[]);
            }
            if !self.parse_value() {
                self.handle_error(
                    ParseErrorCode::ValueExpected,
                    &[],
                    &[SyntaxKind::BRACKET_END, SyntaxKind::COMMA],
                );
            }
            needs_comma = true;
        }
        self.visitor.on_array_end(
            self.scanner.token_offset(),
            self.scanner.token_length(),
        );
        if self.scanner.token() != SyntaxKind::BRACKET_END {
            self.handle_error(
                ParseErrorCode::CloseBracketExpected,
                &[SyntaxKind::BRACKET_END],
                &[],
            );
        } else {
            self.scan_next();
        }
        true
    }
}

fn translate_scan_error(error: ScanError) -> Option<ParseErrorCode> {
    match error {
        ScanError::None => None,
        ScanError::UnexpectedEndOfComment => Some(ParseErrorCode::UnexpectedEndOfComment),
        ScanError::UnexpectedEndOfString => Some(ParseErrorCode::UnexpectedEndOfString),
        ScanError::UnexpectedEndOfNumber => Some(ParseErrorCode::UnexpectedEndOfNumber),
        ScanError::InvalidUnicode => Some(ParseErrorCode::InvalidUnicode),
        ScanError::InvalidEscapeCharacter => Some(ParseErrorCode::InvalidEscapeCharacter),
        ScanError::InvalidCharacter => Some(ParseErrorCode::InvalidCharacter),
    }
}

/// Parses `source` and assembles the canonical minified JSON text.
///
/// String values are re-escaped canonically, numbers keep their source
/// text, and a property whose value is missing is dropped. Errors do not
/// stop the assembly; they are returned alongside the output.
pub fn parse(source: &str, options: ParseOptions) -> (String, Vec<ParseError>) {
    let mut minifier = Minifier {
        out: String::with_capacity(source.len()),
        stack: Vec::new(),
        pending_key: None,
        errors: Vec::new(),
    };
    walk(source, options, &mut minifier);
    (minifier.out, minifier.errors)
}

struct Minifier {
    out: String,
    // one flag per open container: does it already hold an item?
    stack: Vec<bool>,
    pending_key: Option<String>,
    errors: Vec<ParseError>,
}

impl Minifier {
    fn begin_item(&mut self) {
        if let Some(has_item) = self.stack.last_mut() {
            if *has_item {
                self.out.push(',');
            }
            *has_item = true;
        }
        if let Some(key) = self.pending_key.take() {
            self.out.push_str(&key);
            self.out.push(':');
        }
    }
}

impl Visitor for Minifier {
    fn on_object_begin(&mut self, _offset: usize) {
        self.begin_item();
        self.out.push('{');
        self.stack.push(false);
    }

    fn on_object_end(&mut self, _offset: usize, _length: usize) {
        self.pending_key = None;
        self.stack.pop();
        self.out.push('}');
    }

    fn on_array_begin(&mut self, _offset: usize) {
        self.begin_item();
        self.out.push('[');
        self.stack.push(false);
    }

    fn on_array_end(&mut self, _offset: usize, _length: usize) {
        self.stack.pop();
        self.out.push(']');
    }

    fn on_property(&mut self, name: &str, _offset: usize, _length: usize) {
        // Overwrites an earlier property that never received a value;
        // nothing was written for it, so the comma state is untouched.
        self.pending_key = Some(quote(name));
    }

    fn on_value(&mut self, value: &Scalar, _offset: usize, _length: usize, _kind: SyntaxKind) {
        self.begin_item();
        match value {
            Scalar::Null => self.out.push_str("null"),
            Scalar::Bool(true) => self.out.push_str("true"),
            Scalar::Bool(false) => self.out.push_str("false"),
            Scalar::Number(raw) => self.out.push_str(raw),
            Scalar::String(s) => self.out.push_str(&quote(s)),
        }
    }

    fn on_error(&mut self, code: ParseErrorCode, offset: usize, length: usize) {
        self.errors.push(ParseError {
            code,
            offset,
            length,
        });
    }
}
