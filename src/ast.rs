//! Abstract Syntax Tree definitions for minicalc
//!
//! A closed set of node types. Each node owns its children and records the
//! span of the token that introduced it.

use serde::Serialize;
use std::fmt;

use crate::token::Span;

/// AST nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    /// Number literal: 42, 3.14
    Number { value: f64, span: Span },

    /// Variable reference: foo
    Identifier { name: String, span: Span },

    /// Binary operation: a + b, x && y
    Binary {
        left: Box<Node>,
        op: BinaryOp,
        right: Box<Node>,
        span: Span,
    },

    /// Unary operation: -x, !y
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
        span: Span,
    },

    /// Assignment: x = expr
    Assignment {
        name: String,
        value: Box<Node>,
        span: Span,
    },

    /// Declaration: var x = expr;
    VarDecl {
        name: String,
        initializer: Option<Box<Node>>,
        span: Span,
    },

    /// Ordered statement list; the program root
    Block { statements: Vec<Node>, span: Span },
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Number { span, .. } => *span,
            Node::Identifier { span, .. } => *span,
            Node::Binary { span, .. } => *span,
            Node::Unary { span, .. } => *span,
            Node::Assignment { span, .. } => *span,
            Node::VarDecl { span, .. } => *span,
            Node::Block { span, .. } => *span,
        }
    }

    /// Indented, one-node-per-line rendering of the tree
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        match self {
            Node::Number { value, .. } => {
                out.push_str(&format!("{}Number({})\n", indent, value));
            }
            Node::Identifier { name, .. } => {
                out.push_str(&format!("{}Identifier({})\n", indent, name));
            }
            Node::Binary { left, op, right, .. } => {
                out.push_str(&format!("{}Binary({})\n", indent, op));
                left.dump_into(out, depth + 1);
                right.dump_into(out, depth + 1);
            }
            Node::Unary { op, operand, .. } => {
                out.push_str(&format!("{}Unary({})\n", indent, op));
                operand.dump_into(out, depth + 1);
            }
            Node::Assignment { name, value, .. } => {
                out.push_str(&format!("{}Assignment({})\n", indent, name));
                value.dump_into(out, depth + 1);
            }
            Node::VarDecl { name, initializer, .. } => {
                out.push_str(&format!("{}VarDecl({})\n", indent, name));
                if let Some(init) = initializer {
                    init.dump_into(out, depth + 1);
                }
            }
            Node::Block { statements, .. } => {
                out.push_str(&format!("{}Block[{}]\n", indent, statements.len()));
                for stmt in statements {
                    stmt.dump_into(out, depth + 1);
                }
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dump())
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    Mod, // %
    Eq,  // ==
    Ne,  // !=
    Lt,  // <
    Le,  // <=
    Gt,  // >
    Ge,  // >=
    And, // &&
    Or,  // ||
}

impl BinaryOp {
    /// Map operator text to a binary operator
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Le,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Ge,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Mod => write!(f, "%"),
            BinaryOp::Eq => write!(f, "=="),
            BinaryOp::Ne => write!(f, "!="),
            BinaryOp::Lt => write!(f, "<"),
            BinaryOp::Le => write!(f, "<="),
            BinaryOp::Gt => write!(f, ">"),
            BinaryOp::Ge => write!(f, ">="),
            BinaryOp::And => write!(f, "&&"),
            BinaryOp::Or => write!(f, "||"),
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Neg, // -
    Not, // !
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(0, 0, 1, 1)
    }

    #[test]
    fn test_dump() {
        let tree = Node::Block {
            statements: vec![Node::VarDecl {
                name: "x".to_string(),
                initializer: Some(Box::new(Node::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(Node::Number { value: 2.5, span: span() }),
                    span: span(),
                })),
                span: span(),
            }],
            span: span(),
        };

        assert_eq!(tree.dump(), "Block[1]\n  VarDecl(x)\n    Unary(-)\n      Number(2.5)\n");
    }

    #[test]
    fn test_operator_symbols() {
        for symbol in ["+", "-", "*", "/", "%", "==", "!=", "<", "<=", ">", ">=", "&&", "||"] {
            let op = BinaryOp::from_symbol(symbol).unwrap();
            assert_eq!(op.to_string(), symbol);
        }
        assert_eq!(BinaryOp::from_symbol("+="), None);
    }
}
