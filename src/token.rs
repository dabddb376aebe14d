//! Token definitions for minicalc
//!
//! Tokens are produced once by the lexer and consumed once by the parser.

use serde::Serialize;
use std::fmt;

/// Location in source code for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self { start, end, line, column }
    }
}

/// Token categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Number,
    Identifier,
    Operator,
    Keyword,
    Delimiter,
    String,
    // Recognized by the lexer but never emitted
    Comment,
    Whitespace,
    Eof,
    Invalid,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Number => "number",
            TokenKind::Identifier => "identifier",
            TokenKind::Operator => "operator",
            TokenKind::Keyword => "keyword",
            TokenKind::Delimiter => "delimiter",
            TokenKind::String => "string",
            TokenKind::Comment => "comment",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Eof => "EOF",
            TokenKind::Invalid => "invalid",
        };
        write!(f, "{}", name)
    }
}

/// A token with its kind, raw text and location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: String, span: Span) -> Self {
        Self { kind, text, span }
    }

    pub fn line(&self) -> usize {
        self.span.line
    }

    pub fn column(&self) -> usize {
        self.span.column
    }

    /// True if this is an operator or delimiter token with exactly `text`
    pub fn is_symbol(&self, text: &str) -> bool {
        matches!(self.kind, TokenKind::Operator | TokenKind::Delimiter) && self.text == text
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == word
    }

    /// Decoded contents of a string token, with quotes stripped and escapes applied
    pub fn string_value(&self) -> Option<String> {
        if self.kind != TokenKind::String {
            return None;
        }

        let mut chars = self.text.chars();
        let quote = chars.next()?;
        let mut value = String::new();

        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(other) => value.push(other),
                    None => break,
                },
                c if c == quote => break,
                c => value.push(c),
            }
        }

        Some(value)
    }

    /// Human readable form used in error messages
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => self.text.clone(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<10} {:<12} {}:{}",
            self.kind.to_string(),
            format!("'{}'", self.text),
            self.span.line,
            self.span.column
        )
    }
}

/// Reserved words. Only `var` is used by the grammar.
pub const KEYWORDS: &[&str] = &[
    "if", "else", "while", "for", "function", "return", "var", "let", "const", "true", "false",
    "null",
];

/// Keywords that may start a statement; the parser resynchronizes on these
pub const STATEMENT_KEYWORDS: &[&str] =
    &["var", "let", "const", "if", "while", "for", "function", "return"];

/// Multi-character operators, matched before single-character ones
pub const MULTI_CHAR_OPERATORS: &[&str] = &["==", "!=", "<=", ">=", "&&", "||", "++", "--", "+=", "-="];

pub const SINGLE_CHAR_OPERATORS: &str = "+-*/%=<>!&|";

pub const DELIMITERS: &str = "(){}[];,.:";

/// Check if a word is reserved
pub fn is_keyword(ident: &str) -> bool {
    KEYWORDS.contains(&ident)
}
