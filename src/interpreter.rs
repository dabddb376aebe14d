//! Interpreter session for minicalc
//!
//! Ties the lexer, parser and evaluator together over one persistent
//! environment and keeps a record of successful runs. Nothing returned from
//! here is an `Err`: stage failures are folded into the result structs.

use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

use log::{debug, info};
use serde::Serialize;

use crate::ast::Node;
use crate::config::Config;
use crate::environment::Environment;
use crate::error::{CalcError, Result};
use crate::evaluator::Evaluator;
use crate::lexer::tokenize;
use crate::parser::Parser;
use crate::token::{Token, TokenKind};
use crate::value::Value;

/// A successful run kept in the session history
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub source: String,
    pub tokens: Vec<Token>,
    pub ast: Node,
    pub result: Value,
    pub elapsed: Duration,
}

/// Outcome of [`Interpreter::run`]
#[derive(Debug, Clone)]
pub struct RunResult {
    pub tokens: Vec<Token>,
    /// `None` when parsing failed
    pub ast: Option<Node>,
    /// `None` when any stage failed
    pub result: Option<Value>,
    /// Bindings after the run, including partial effects of a failed one
    pub environment: BTreeMap<String, Value>,
    pub elapsed: Duration,
    pub error: Option<CalcError>,
}

impl RunResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// An error from one line of [`Interpreter::run_program`]
#[derive(Debug, Clone, PartialEq)]
pub struct LineError {
    /// 1-based index of the failing input line
    pub line: usize,
    pub error: CalcError,
}

/// Outcome of [`Interpreter::run_program`]
#[derive(Debug, Clone)]
pub struct ProgramResult {
    pub results: Vec<RunResult>,
    pub errors: Vec<LineError>,
    pub environment: BTreeMap<String, Value>,
    pub total_elapsed: Duration,
}

/// Outcome of [`Interpreter::run_script`]
#[derive(Debug, Clone)]
pub struct ScriptResult {
    pub result: Option<Value>,
    /// Every syntax error, or the single runtime error that stopped evaluation
    pub errors: Vec<CalcError>,
    pub elapsed: Duration,
}

/// Token counts for a piece of source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    /// All tokens except the trailing `Eof`
    pub tokens: usize,
    pub identifiers: usize,
    pub operators: usize,
    pub numbers: usize,
    /// `operators + identifiers`
    pub complexity: usize,
}

impl Metrics {
    pub fn from_tokens(tokens: &[Token]) -> Self {
        let mut metrics = Metrics::default();

        for token in tokens {
            match token.kind {
                TokenKind::Eof => continue,
                TokenKind::Identifier => metrics.identifiers += 1,
                TokenKind::Operator => metrics.operators += 1,
                TokenKind::Number => metrics.numbers += 1,
                _ => {}
            }
            metrics.tokens += 1;
        }

        metrics.complexity = metrics.operators + metrics.identifiers;
        metrics
    }
}

/// Outcome of [`Interpreter::analyze`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub tokens: Vec<Token>,
    /// Tree dump, `None` when parsing failed
    pub ast_dump: Option<String>,
    pub metrics: Metrics,
    pub error: Option<CalcError>,
}

/// One interpreter session: an environment plus run history
pub struct Interpreter {
    config: Config,
    environment: Environment,
    history: VecDeque<RunRecord>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            environment: Environment::new(),
            history: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Successful runs, oldest first
    pub fn history(&self) -> &VecDeque<RunRecord> {
        &self.history
    }

    /// Lex, parse and evaluate `source` against the session environment
    pub fn run(&mut self, source: &str) -> RunResult {
        let start = Instant::now();
        debug!("run: {:?}", source);

        let tokens = tokenize(source);

        let ast = match self.parser(tokens.clone()).parse() {
            Ok(ast) => ast,
            Err(err) => {
                return self.failed(tokens, None, err.with_source(source), start);
            }
        };

        match self.evaluator().evaluate(&ast, &mut self.environment) {
            Ok(value) => {
                let elapsed = start.elapsed();
                self.record(RunRecord {
                    source: source.to_string(),
                    tokens: tokens.clone(),
                    ast: ast.clone(),
                    result: value,
                    elapsed,
                });
                RunResult {
                    tokens,
                    ast: Some(ast),
                    result: Some(value),
                    environment: self.environment.snapshot(),
                    elapsed,
                    error: None,
                }
            }
            Err(err) => self.failed(tokens, Some(ast), err.with_source(source), start),
        }
    }

    /// Run each line as its own statement, continuing past failures
    pub fn run_program<I, S>(&mut self, lines: I) -> ProgramResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let start = Instant::now();
        let mut results = Vec::new();
        let mut errors = Vec::new();

        for (index, line) in lines.into_iter().enumerate() {
            let result = self.run(line.as_ref());
            if let Some(error) = &result.error {
                errors.push(LineError {
                    line: index + 1,
                    error: error.clone(),
                });
            }
            results.push(result);
        }

        info!("program finished: {} lines, {} errors", results.len(), errors.len());

        ProgramResult {
            results,
            errors,
            environment: self.environment.snapshot(),
            total_elapsed: start.elapsed(),
        }
    }

    /// Parse a whole source with recovery, reporting every syntax error, and
    /// evaluate it only if it parsed cleanly
    pub fn run_script(&mut self, source: &str) -> ScriptResult {
        let start = Instant::now();
        let tokens = tokenize(source);
        let outcome = self.parser(tokens.clone()).parse_with_recovery();

        if !outcome.is_ok() {
            return ScriptResult {
                result: None,
                errors: outcome
                    .errors
                    .into_iter()
                    .map(|err| err.with_source(source))
                    .collect(),
                elapsed: start.elapsed(),
            };
        }

        let ast = outcome.ast;
        match self.evaluator().evaluate(&ast, &mut self.environment) {
            Ok(value) => {
                let elapsed = start.elapsed();
                self.record(RunRecord {
                    source: source.to_string(),
                    tokens,
                    ast,
                    result: value,
                    elapsed,
                });
                ScriptResult {
                    result: Some(value),
                    errors: Vec::new(),
                    elapsed,
                }
            }
            Err(err) => ScriptResult {
                result: None,
                errors: vec![err.with_source(source)],
                elapsed: start.elapsed(),
            },
        }
    }

    /// Tokens, tree dump and metrics for `source`. Touches neither the
    /// environment nor the history.
    pub fn analyze(&self, source: &str) -> Analysis {
        let tokens = tokenize(source);
        let metrics = Metrics::from_tokens(&tokens);

        let (ast_dump, error) = match self.parser(tokens.clone()).parse() {
            Ok(ast) => (Some(ast.dump()), None),
            Err(err) => (None, Some(err.with_source(source))),
        };

        Analysis {
            tokens,
            ast_dump,
            metrics,
            error,
        }
    }

    /// Forget all bindings and history
    pub fn reset(&mut self) {
        debug!(
            "reset: dropping {} bindings and {} history records",
            self.environment.len(),
            self.history.len()
        );
        self.environment.clear();
        self.history.clear();
    }

    /// Evaluate an already parsed tree against the session environment
    pub fn evaluate(&mut self, ast: &Node) -> Result<Value> {
        self.evaluator().evaluate(ast, &mut self.environment)
    }

    fn parser(&self, tokens: Vec<Token>) -> Parser {
        Parser::new(tokens)
            .with_max_depth(self.config.max_depth)
            .with_max_tree_depth(self.config.max_eval_depth)
    }

    fn evaluator(&self) -> Evaluator {
        Evaluator::new().with_max_depth(self.config.max_eval_depth)
    }

    fn record(&mut self, record: RunRecord) {
        self.history.push_back(record);
        if let Some(limit) = self.config.history_limit {
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }
    }

    fn failed(&self, tokens: Vec<Token>, ast: Option<Node>, error: CalcError, start: Instant) -> RunResult {
        debug!("run failed: {}", error.kind);
        RunResult {
            tokens,
            ast,
            result: None,
            environment: self.environment.snapshot(),
            elapsed: start.elapsed(),
            error: Some(error),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
