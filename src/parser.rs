//! Parser for minicalc
//!
//! Recursive descent over the token stream, one method per precedence
//! level from lowest (assignment) to highest (primary). Every binary level
//! is left-associative.

use log::debug;

use crate::ast::{BinaryOp, Node, UnaryOp};
use crate::config::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_EVAL_DEPTH};
use crate::error::{CalcError, ErrorKind, Result};
use crate::token::{Span, Token, TokenKind, STATEMENT_KEYWORDS};

/// The parser state
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
    max_depth: usize,
    /// Depth of the node most recently built, counting the enclosing block
    built_depth: usize,
    max_tree_depth: usize,
}

/// Outcome of a parse that recovers from errors
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// Every declaration that parsed cleanly, in order
    pub ast: Node,
    pub errors: Vec<CalcError>,
}

impl ParseOutcome {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Parser {
    /// Create a new parser from tokens
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let span = tokens
                .last()
                .map(|t| Span::new(t.span.end, t.span.end, t.span.line, t.span.column + 1))
                .unwrap_or(Span::new(0, 0, 1, 1));
            tokens.push(Token::new(TokenKind::Eof, String::new(), span));
        }

        Self {
            tokens,
            current: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            built_depth: 0,
            max_tree_depth: DEFAULT_MAX_EVAL_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Ceiling on the depth of the built tree. Operator chains deepen the
    /// tree without recursing in the parser, so they are bounded here.
    pub fn with_max_tree_depth(mut self, max_tree_depth: usize) -> Self {
        self.max_tree_depth = max_tree_depth;
        self
    }

    /// Parse the tokens into a `Block`, stopping at the first syntax error
    pub fn parse(&mut self) -> Result<Node> {
        let span = self.peek().span;
        let mut statements = Vec::new();

        while !self.is_at_end() {
            statements.push(self.declaration()?);
        }

        Ok(Node::Block { statements, span })
    }

    /// Parse the tokens into a `Block`, resynchronizing after each failed
    /// declaration so that later statements are still parsed
    pub fn parse_with_recovery(&mut self) -> ParseOutcome {
        let span = self.peek().span;
        let mut statements = Vec::new();
        let mut errors = Vec::new();

        while !self.is_at_end() {
            let start = self.current;
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    debug!("syntax error, resynchronizing: {}", err);
                    errors.push(err);
                    self.depth = 0;
                    self.synchronize(start);
                }
            }
        }

        ParseOutcome {
            ast: Node::Block { statements, span },
            errors,
        }
    }

    // ==================== Declarations ====================

    fn declaration(&mut self) -> Result<Node> {
        if self.peek().is_keyword("var") {
            self.var_declaration()
        } else {
            let expr = self.expression()?;
            self.match_symbol(";");
            Ok(expr)
        }
    }

    fn var_declaration(&mut self) -> Result<Node> {
        let span = self.advance().span; // consume 'var'

        let name = self.expect_ident("variable name after 'var'")?;

        let initializer = if self.match_symbol("=") {
            let init = self.expression()?;
            self.built(self.built_depth + 1, span)?;
            Some(Box::new(init))
        } else {
            self.built(2, span)?;
            None
        };

        if !self.is_at_end() {
            self.expect_symbol(";", "';' after variable declaration")?;
        }

        Ok(Node::VarDecl { name, initializer, span })
    }

    // ==================== Expressions ====================

    fn expression(&mut self) -> Result<Node> {
        self.nested(Self::assignment)
    }

    fn assignment(&mut self) -> Result<Node> {
        let is_assignment = self.peek().kind == TokenKind::Identifier
            && self.peek_next().map_or(false, |t| t.is_symbol("="));

        if is_assignment {
            let target = self.advance().clone();
            self.advance(); // consume '='
            let value = self.nested(Self::assignment)?;
            self.built(self.built_depth + 1, target.span)?;
            return Ok(Node::Assignment {
                name: target.text,
                value: Box::new(value),
                span: target.span,
            });
        }

        self.logic_or()
    }

    fn logic_or(&mut self) -> Result<Node> {
        self.binary_level(&["||"], Self::logic_and)
    }

    fn logic_and(&mut self) -> Result<Node> {
        self.binary_level(&["&&"], Self::equality)
    }

    fn equality(&mut self) -> Result<Node> {
        self.binary_level(&["==", "!="], Self::comparison)
    }

    fn comparison(&mut self) -> Result<Node> {
        self.binary_level(&[">", ">=", "<", "<="], Self::additive)
    }

    fn additive(&mut self) -> Result<Node> {
        self.binary_level(&["+", "-"], Self::multiplicative)
    }

    fn multiplicative(&mut self) -> Result<Node> {
        self.binary_level(&["*", "/", "%"], Self::unary)
    }

    /// One left-associative precedence level: `next (op next)*`
    fn binary_level(&mut self, symbols: &[&str], next: fn(&mut Self) -> Result<Node>) -> Result<Node> {
        let mut left = next(self)?;
        let mut left_depth = self.built_depth;

        loop {
            let token = self.peek();
            let op = if token.kind == TokenKind::Operator && symbols.contains(&token.text.as_str()) {
                BinaryOp::from_symbol(&token.text)
            } else {
                None
            };
            let Some(op) = op else {
                break;
            };

            let op_span = self.advance().span;
            let right = next(self)?;
            left_depth = self.built(left_depth.max(self.built_depth) + 1, op_span)?;
            left = Node::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span: op_span,
            };
        }

        Ok(left)
    }

    fn unary(&mut self) -> Result<Node> {
        let op = if self.peek().is_symbol("-") {
            Some(UnaryOp::Neg)
        } else if self.peek().is_symbol("!") {
            Some(UnaryOp::Not)
        } else {
            None
        };

        if let Some(op) = op {
            let span = self.advance().span;
            let operand = self.nested(Self::unary)?;
            self.built(self.built_depth + 1, span)?;
            return Ok(Node::Unary {
                op,
                operand: Box::new(operand),
                span,
            });
        }

        self.primary()
    }

    fn primary(&mut self) -> Result<Node> {
        let token = self.peek().clone();

        match token.kind {
            TokenKind::Number => {
                self.advance();
                let value = token.text.parse::<f64>().map_err(|_| {
                    CalcError::new(ErrorKind::ExpectedExpression(token.text.clone()), Some(token.span))
                })?;
                self.built(2, token.span)?;
                Ok(Node::Number { value, span: token.span })
            }
            TokenKind::Identifier => {
                self.advance();
                self.built(2, token.span)?;
                Ok(Node::Identifier { name: token.text, span: token.span })
            }
            TokenKind::Delimiter if token.text == "(" => {
                self.advance();
                let expr = self.expression()?;
                self.expect_symbol(")", "')' after expression")?;
                Ok(expr)
            }
            TokenKind::Invalid => Err(CalcError::new(
                ErrorKind::UnexpectedCharacter(token.text),
                Some(token.span),
            )),
            _ => Err(CalcError::new(
                ErrorKind::ExpectedExpression(token.describe()),
                Some(token.span),
            )),
        }
    }

    // ==================== Recovery ====================

    /// Skip tokens until just past a `;` or up to a statement keyword.
    /// `start` is where the failed declaration began; the offending token is
    /// only skipped unconditionally when nothing was consumed since.
    fn synchronize(&mut self, start: usize) {
        if self.current == start {
            self.advance();
        }

        while !self.is_at_end() {
            if self.previous().is_symbol(";") {
                return;
            }
            let next = self.peek();
            if next.kind == TokenKind::Keyword && STATEMENT_KEYWORDS.contains(&next.text.as_str()) {
                return;
            }
            self.advance();
        }
    }

    // ==================== Helpers ====================

    /// Run `rule` one nesting level deeper, failing once the ceiling is passed
    fn nested(&mut self, rule: fn(&mut Self) -> Result<Node>) -> Result<Node> {
        if self.depth >= self.max_depth {
            return Err(CalcError::new(
                ErrorKind::TooComplex(self.max_depth),
                Some(self.peek().span),
            ));
        }

        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    /// Record the depth of a freshly built node, failing once it passes the
    /// tree ceiling. Depths count the enclosing block as level 1.
    fn built(&mut self, depth: usize, span: Span) -> Result<usize> {
        if depth > self.max_tree_depth {
            return Err(CalcError::new(
                ErrorKind::TooComplex(self.max_tree_depth),
                Some(span),
            ));
        }
        self.built_depth = depth;
        Ok(depth)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.current + 1)
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn match_symbol(&mut self, symbol: &str) -> bool {
        if self.peek().is_symbol(symbol) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, symbol: &str, expectation: &str) -> Result<&Token> {
        if self.peek().is_symbol(symbol) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expectation))
        }
    }

    fn expect_ident(&mut self, expectation: &str) -> Result<String> {
        if self.peek().kind == TokenKind::Identifier {
            Ok(self.advance().text.clone())
        } else {
            Err(self.unexpected(expectation))
        }
    }

    fn unexpected(&self, expectation: &str) -> CalcError {
        let token = self.peek();
        let kind = match token.kind {
            TokenKind::Invalid => ErrorKind::UnexpectedCharacter(token.text.clone()),
            _ => ErrorKind::ExpectedToken(expectation.to_string(), token.describe()),
        };
        CalcError::new(kind, Some(token.span))
    }
}

/// Parse a token sequence, failing on the first syntax error
pub fn parse(tokens: Vec<Token>) -> Result<Node> {
    Parser::new(tokens).parse()
}
