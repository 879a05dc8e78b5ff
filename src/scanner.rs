//! Restartable token cursor over the lexer.

use crate::syntax::{ScanError, SyntaxKind, TokenContext};
use logos::{Lexer, Logos};
use serde::{Deserialize, Serialize};

/// Options controlling which tokens the scanner reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// When false, whitespace and line-break tokens are suppressed.
    /// Comments are reported either way.
    pub trivia: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions { trivia: true }
    }
}

/// A single scanned token.
///
/// The concatenation of all token texts in scan order reproduces the
/// source; `value` carries the decoded form for strings and the numeric
/// text for numbers whose token text overshoots (e.g. `1e`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub offset: usize,
    pub length: usize,
    pub value: Option<String>,
    pub error: ScanError,
}

/// A stateful cursor producing one token per `scan()` call, never failing:
/// malformed input surfaces as tokens carrying a [`ScanError`].
pub struct Scanner<'s> {
    lexer: Lexer<'s, SyntaxKind>,
    source: &'s str,
    trivia: bool,
    token: SyntaxKind,
    offset: usize,
    length: usize,
    value: Option<String>,
    error: ScanError,
}

impl<'s> Scanner<'s> {
    pub fn new(source: &'s str, options: ScanOptions) -> Self {
        Scanner {
            lexer: SyntaxKind::lexer(source),
            source,
            trivia: options.trivia,
            token: SyntaxKind::UNKNOWN,
            offset: 0,
            length: 0,
            value: None,
            error: ScanError::None,
        }
    }

    /// Advances to the next reported token and returns its kind.
    /// Returns [`SyntaxKind::EOF`] once the input is exhausted.
    pub fn scan(&mut self) -> SyntaxKind {
        loop {
            self.lexer.extras = TokenContext::default();
            match self.lexer.next() {
                Some(kind) => {
                    let span = self.lexer.span();
                    self.token = if kind == SyntaxKind::ERROR {
                        SyntaxKind::UNKNOWN
                    } else {
                        kind
                    };
                    self.offset = span.start;
                    self.length = span.end - span.start;
                    self.value = self.lexer.extras.value.take();
                    self.error = self.lexer.extras.error;
                }
                None => {
                    self.token = SyntaxKind::EOF;
                    self.offset = self.source.len();
                    self.length = 0;
                    self.value = None;
                    self.error = ScanError::None;
                }
            }
            if !self.trivia
                && matches!(self.token, SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE)
            {
                continue;
            }
            return self.token;
        }
    }

    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    pub fn token_offset(&self) -> usize {
        self.offset
    }

    pub fn token_length(&self) -> usize {
        self.length
    }

    /// The raw source text of the current token.
    pub fn token_text(&self) -> &str {
        &self.source[self.offset..self.offset + self.length]
    }

    /// The decoded value for strings and numbers, the raw text otherwise.
    pub fn token_value(&self) -> &str {
        match &self.value {
            Some(v) => v,
            None => self.token_text(),
        }
    }

    pub fn token_error(&self) -> ScanError {
        self.error
    }

    pub fn source(&self) -> &'s str {
        self.source
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        match self.scan() {
            SyntaxKind::EOF => None,
            kind => Some(Token {
                kind,
                offset: self.offset,
                length: self.length,
                value: self.value.clone(),
                error: self.error,
            }),
        }
    }
}
