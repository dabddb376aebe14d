//! Tree-walking evaluator for minicalc
//!
//! Walks a parsed `Node` against a caller-owned `Environment`. A failing
//! evaluation keeps whatever bindings were already made before the failure.

use log::{debug, trace};

use crate::ast::{BinaryOp, Node, UnaryOp};
use crate::config::DEFAULT_MAX_EVAL_DEPTH;
use crate::environment::Environment;
use crate::error::{CalcError, ErrorKind, Result};
use crate::token::Span;
use crate::value::Value;

/// Evaluator state; only the current recursion depth
pub struct Evaluator {
    depth: usize,
    max_depth: usize,
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            depth: 0,
            max_depth: DEFAULT_MAX_EVAL_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Evaluate `node`, reading and binding variables in `env`
    pub fn evaluate(&mut self, node: &Node, env: &mut Environment) -> Result<Value> {
        if self.depth >= self.max_depth {
            return Err(CalcError::new(
                ErrorKind::TooComplex(self.max_depth),
                Some(node.span()),
            ));
        }

        self.depth += 1;
        let result = self.eval_node(node, env);
        self.depth -= 1;
        result
    }

    fn eval_node(&mut self, node: &Node, env: &mut Environment) -> Result<Value> {
        match node {
            Node::Number { value, .. } => Ok(Value::Number(*value)),

            Node::Identifier { name, span } => env
                .get(name)
                .map_err(|err| CalcError::new(err.kind, Some(*span))),

            Node::Binary { left, op, right, span } => {
                // Both sides are always evaluated, `&&` and `||` included
                let left = self.evaluate(left, env)?;
                let right = self.evaluate(right, env)?;
                apply_binary(*op, left, right).map_err(|kind| CalcError::new(kind, Some(*span)))
            }

            Node::Unary { op, operand, .. } => {
                let operand = self.evaluate(operand, env)?;
                Ok(apply_unary(*op, operand))
            }

            Node::Assignment { name, value, .. } => {
                let value = self.evaluate(value, env)?;
                debug!("assign {} = {}", name, value);
                env.assign(name, value);
                Ok(value)
            }

            Node::VarDecl { name, initializer, .. } => {
                let value = match initializer {
                    Some(init) => self.evaluate(init, env)?,
                    None => Value::Null,
                };
                debug!("declare {} = {}", name, value);
                env.define(name.clone(), value);
                Ok(value)
            }

            Node::Block { statements, .. } => {
                let mut last = Value::Null;
                for stmt in statements {
                    trace!("evaluating statement at line {}", stmt.span().line);
                    last = self.evaluate(stmt, env)?;
                }
                Ok(last)
            }
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_unary(op: UnaryOp, operand: Value) -> Value {
    match op {
        UnaryOp::Neg => Value::Number(-operand.as_number()),
        UnaryOp::Not => Value::Bool(!operand.is_truthy()),
    }
}

/// `%` is the truncated floating-point remainder, so `7.5 % 2` is `1.5`
/// and the result takes the sign of the dividend.
fn apply_binary(op: BinaryOp, left: Value, right: Value) -> std::result::Result<Value, ErrorKind> {
    let (a, b) = (left.as_number(), right.as_number());

    let value = match op {
        BinaryOp::Add => Value::Number(a + b),
        BinaryOp::Sub => Value::Number(a - b),
        BinaryOp::Mul => Value::Number(a * b),
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(ErrorKind::DivisionByZero);
            }
            Value::Number(a / b)
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(ErrorKind::DivisionByZero);
            }
            Value::Number(a % b)
        }
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::Le => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::Ge => Value::Bool(a >= b),
        BinaryOp::Eq => Value::Bool(left.loosely_equals(&right)),
        BinaryOp::Ne => Value::Bool(!left.loosely_equals(&right)),
        BinaryOp::And => Value::Bool(left.is_truthy() && right.is_truthy()),
        BinaryOp::Or => Value::Bool(left.is_truthy() || right.is_truthy()),
    };

    Ok(value)
}

/// Apply an operator given by its source text. Operators the language
/// lexes but gives no meaning to (`+=`, `++`, `&`, ...) fail with
/// `UnsupportedOperator`.
pub fn apply_operator(symbol: &str, left: Value, right: Value, span: Option<Span>) -> Result<Value> {
    let op = BinaryOp::from_symbol(symbol).ok_or_else(|| {
        CalcError::new(ErrorKind::UnsupportedOperator(symbol.to_string()), span)
    })?;
    apply_binary(op, left, right).map_err(|kind| CalcError::new(kind, span))
}

/// Evaluate `node` against `env` with default limits
pub fn evaluate(node: &Node, env: &mut Environment) -> Result<Value> {
    Evaluator::new().evaluate(node, env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn eval_in(source: &str, env: &mut Environment) -> Result<Value> {
        let ast = parse(tokenize(source)).unwrap();
        evaluate(&ast, env)
    }

    fn eval(source: &str) -> Result<Value> {
        eval_in(source, &mut Environment::new())
    }

    fn number(source: &str) -> f64 {
        match eval(source).unwrap() {
            Value::Number(n) => n,
            other => panic!("expected number, got {:?}", other),
        }
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(number("2 + 3 * 4"), 14.0);
        assert_eq!(number("(2 + 3) * 4"), 20.0);
        assert_eq!(number("10 / 2 - 1"), 4.0);
        assert_eq!(number("100 % 7"), 2.0);
        assert_eq!(number("-3 - -3"), 0.0);
        assert_eq!(number("7 / 2"), 3.5);
    }

    #[test]
    fn test_comparisons_and_logic() {
        assert_eq!(eval("3 > 2").unwrap(), Value::Bool(true));
        assert_eq!(eval("3 <= 2").unwrap(), Value::Bool(false));
        assert_eq!(eval("1 + 1 == 2").unwrap(), Value::Bool(true));
        assert_eq!(eval("1 != 1").unwrap(), Value::Bool(false));
        assert_eq!(eval("1 && 0").unwrap(), Value::Bool(false));
        assert_eq!(eval("0 || 5").unwrap(), Value::Bool(true));
        assert_eq!(eval("!0").unwrap(), Value::Bool(true));
        assert_eq!(eval("(2 > 1) + 1").unwrap(), Value::Number(2.0));
    }

    #[test]
    fn test_no_short_circuit() {
        let mut env = Environment::new();
        assert_eq!(eval_in("0 && (x = 7)", &mut env).unwrap(), Value::Bool(false));
        assert_eq!(env.get("x").unwrap(), Value::Number(7.0));

        let err = eval("1 || missing").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndefinedVariable("missing".to_string()));
    }

    #[test]
    fn test_division_by_zero() {
        let err = eval("5 / 0;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
        assert_eq!(eval("5 % 0").unwrap_err().kind, ErrorKind::DivisionByZero);
        assert_eq!(eval("5 / -0").unwrap_err().kind, ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_remainder_is_truncated_float() {
        assert_eq!(number("7.5 % 2"), 1.5);
        assert_eq!(number("-7 % 3"), -1.0);
    }

    #[test]
    fn test_undefined_variable_names_identifier() {
        let err = eval("1 + nope").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndefinedVariable("nope".to_string()));
        assert_eq!(err.span.unwrap().column, 5);
    }

    #[test]
    fn test_declarations_and_assignment() {
        let mut env = Environment::new();
        eval_in("var a = 5; var b = 10; var soma = a + b;", &mut env).unwrap();
        assert_eq!(env.get("soma").unwrap(), Value::Number(15.0));

        assert_eq!(eval_in("var empty;", &mut env).unwrap(), Value::Null);
        assert_eq!(env.get("empty").unwrap(), Value::Null);

        // assignment to an undeclared name declares it
        assert_eq!(eval_in("c = a * 2", &mut env).unwrap(), Value::Number(10.0));
        assert_eq!(env.get("c").unwrap(), Value::Number(10.0));
    }

    #[test]
    fn test_block_value() {
        assert_eq!(eval("").unwrap(), Value::Null);
        assert_eq!(eval("1; 2; 3").unwrap(), Value::Number(3.0));
    }

    #[test]
    fn test_partial_effects_survive_failure() {
        let mut env = Environment::new();
        let err = eval_in("var a = 1; var b = a / 0; var c = 3;", &mut env).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
        assert!(env.contains("a"));
        assert!(!env.contains("b"));
        assert!(!env.contains("c"));
    }

    #[test]
    fn test_apply_operator() {
        let two = Value::Number(2.0);
        assert_eq!(apply_operator("*", two, two, None).unwrap(), Value::Number(4.0));

        let err = apply_operator("+=", two, two, None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedOperator("+=".to_string()));
    }

    #[test]
    fn test_depth_ceiling() {
        let source = vec!["1"; 40].join(" + ");
        let ast = parse(tokenize(&source)).unwrap();
        let mut env = Environment::new();

        let err = Evaluator::new().with_max_depth(10).evaluate(&ast, &mut env).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TooComplex(10));

        let value = Evaluator::new().evaluate(&ast, &mut env).unwrap();
        assert_eq!(value, Value::Number(40.0));
    }
}
