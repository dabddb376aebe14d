//! minicalc - a small expression language
//!
//! Source text flows through a lexer, a recursive-descent parser and a
//! tree-walking evaluator. An [`Interpreter`] keeps the variable
//! environment alive between runs.

pub mod token;
pub mod lexer;
pub mod parser;
pub mod ast;
pub mod value;
pub mod environment;
pub mod evaluator;
pub mod interpreter;
pub mod config;
pub mod error;

pub use config::Config;
pub use environment::Environment;
pub use error::{CalcError, ErrorKind, Result};
pub use evaluator::evaluate;
pub use interpreter::Interpreter;
pub use lexer::{tokenize, Lexer};
pub use parser::{parse, Parser};
pub use value::Value;

/// Convenience function to evaluate source in a fresh environment
pub fn run(source: &str) -> Result<Value> {
    let tokens = tokenize(source);
    let program = parse(tokens)?;
    let mut env = Environment::new();
    evaluate(&program, &mut env)
}

/// Version of minicalc
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
