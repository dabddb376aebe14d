//! Error types for minicalc
//!
//! Provides structured error handling with source locations.

use crate::token::Span;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Error kinds in minicalc
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum ErrorKind {
    // Syntax errors
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(String),
    #[error("expected {0}, got '{1}'")]
    ExpectedToken(String, String),
    #[error("expected expression, got '{0}'")]
    ExpectedExpression(String),

    // Runtime errors
    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("unsupported operator '{0}'")]
    UnsupportedOperator(String),

    #[error("input too complex: nesting exceeds {0} levels")]
    TooComplex(usize),
}

impl ErrorKind {
    /// Name of the error class this kind belongs to
    pub fn category(&self) -> &'static str {
        match self {
            ErrorKind::UnexpectedCharacter(_)
            | ErrorKind::ExpectedToken(..)
            | ErrorKind::ExpectedExpression(_) => "SyntaxError",
            ErrorKind::UndefinedVariable(_) => "UndefinedVariableError",
            ErrorKind::DivisionByZero => "DivisionByZeroError",
            ErrorKind::UnsupportedOperator(_) => "UnsupportedOperatorError",
            ErrorKind::TooComplex(_) => "TooComplexError",
        }
    }

    pub fn is_syntax(&self) -> bool {
        self.category() == "SyntaxError"
    }
}

/// A minicalc error with location information
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalcError {
    pub kind: ErrorKind,
    pub span: Option<Span>,
    pub source_line: Option<String>,
}

impl CalcError {
    pub fn new(kind: ErrorKind, span: Option<Span>) -> Self {
        Self {
            kind,
            span,
            source_line: None,
        }
    }

    pub fn with_source(mut self, source: &str) -> Self {
        if let Some(span) = &self.span {
            let lines: Vec<&str> = source.lines().collect();
            if span.line > 0 && span.line <= lines.len() {
                self.source_line = Some(lines[span.line - 1].to_string());
            }
        }
        self
    }
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(span) = &self.span {
            write!(
                f,
                "[line {}:{}] {}: {}",
                span.line,
                span.column,
                self.kind.category(),
                self.kind
            )?;

            if let Some(ref line) = self.source_line {
                write!(f, "\n  | {}", line)?;
                write!(f, "\n  | {}^", " ".repeat(span.column.saturating_sub(1)))?;
            }
        } else {
            write!(f, "{}: {}", self.kind.category(), self.kind)?;
        }
        Ok(())
    }
}

impl std::error::Error for CalcError {}

/// Result type for minicalc operations
pub type Result<T> = std::result::Result<T, CalcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_caret() {
        let err = CalcError::new(
            ErrorKind::ExpectedExpression(";".to_string()),
            Some(Span::new(8, 9, 1, 9)),
        )
        .with_source("var x = ;");

        let rendered = err.to_string();
        assert!(rendered.starts_with("[line 1:9] SyntaxError: expected expression, got ';'"));
        assert!(rendered.ends_with("\n  |         ^"));
    }

    #[test]
    fn test_display_without_span() {
        let err = CalcError::new(ErrorKind::DivisionByZero, None);
        assert_eq!(err.to_string(), "DivisionByZeroError: division by zero");
    }

    #[test]
    fn test_categories() {
        assert!(ErrorKind::UnexpectedCharacter("@".into()).is_syntax());
        assert!(!ErrorKind::UndefinedVariable("x".into()).is_syntax());
        assert_eq!(ErrorKind::TooComplex(4).category(), "TooComplexError");
    }
}
