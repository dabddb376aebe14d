//! Lexer for minicalc
//!
//! Converts source code into a stream of tokens. Lexing never fails:
//! characters outside the language become `Invalid` tokens and are
//! rejected later by the parser.

use log::trace;

use crate::token::{
    is_keyword, Span, Token, TokenKind, DELIMITERS, MULTI_CHAR_OPERATORS, SINGLE_CHAR_OPERATORS,
};

/// The lexer state
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer from source code
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire source. The result always ends with one `Eof` token.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token() {
            tokens.push(token);
        }

        tokens.push(Token::new(
            TokenKind::Eof,
            String::new(),
            Span::new(self.current_pos, self.current_pos, self.line, self.column),
        ));

        trace!("lexed {} tokens", tokens.len());
        tokens
    }

    /// Get the next significant token
    fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace_and_comments();

        let &(start_pos, ch) = self.chars.peek()?;
        let start_line = self.line;
        let start_column = self.column;

        let kind = match ch {
            '"' | '\'' => self.scan_string(ch),
            c if c.is_ascii_digit() => self.scan_number(),
            c if c.is_alphabetic() || c == '_' => self.scan_identifier(),
            _ => self.scan_symbol(ch),
        };

        Some(Token::new(
            kind,
            self.source[start_pos..self.current_pos].to_string(),
            Span::new(start_pos, self.current_pos, start_line, start_column),
        ))
    }

    /// Advance and return the current character, keeping line/column in step
    fn advance(&mut self) -> Option<char> {
        let (pos, ch) = self.chars.next()?;
        self.current_pos = pos + ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Peek at the next character without advancing
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, ch)| ch)
    }

    fn rest(&self) -> &'a str {
        &self.source[self.current_pos..]
    }

    /// Skip whitespace, line comments and block comments
    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.peek_char() {
            match ch {
                c if c.is_whitespace() => {
                    self.advance();
                }

                '/' if self.rest().starts_with("//") => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }

                '/' if self.rest().starts_with("/*") => {
                    self.advance();
                    self.advance();
                    // An unterminated comment runs to end of input
                    while self.peek_char().is_some() {
                        if self.rest().starts_with("*/") {
                            self.advance();
                            self.advance();
                            break;
                        }
                        self.advance();
                    }
                }

                _ => break,
            }
        }
    }

    /// Scan a string literal delimited by `quote`. Unterminated strings
    /// consume the rest of the input.
    fn scan_string(&mut self, quote: char) -> TokenKind {
        self.advance();

        while let Some(c) = self.advance() {
            match c {
                '\\' => {
                    self.advance();
                }
                c if c == quote => break,
                _ => {}
            }
        }

        TokenKind::String
    }

    /// Scan a run of digits containing at most one decimal point
    fn scan_number(&mut self) -> TokenKind {
        let mut seen_dot = false;

        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.advance();
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        TokenKind::Number
    }

    /// Scan an identifier or keyword
    fn scan_identifier(&mut self) -> TokenKind {
        let start = self.current_pos;

        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        if is_keyword(&self.source[start..self.current_pos]) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        }
    }

    /// Scan an operator or delimiter, greedy on two-character operators
    fn scan_symbol(&mut self, ch: char) -> TokenKind {
        if MULTI_CHAR_OPERATORS.iter().any(|op| self.rest().starts_with(op)) {
            self.advance();
            self.advance();
            return TokenKind::Operator;
        }

        self.advance();
        if SINGLE_CHAR_OPERATORS.contains(ch) {
            TokenKind::Operator
        } else if DELIMITERS.contains(ch) {
            TokenKind::Delimiter
        } else {
            trace!("invalid character {:?} at {}:{}", ch, self.line, self.column);
            TokenKind::Invalid
        }
    }
}

/// Tokenize `source` in one call
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}
