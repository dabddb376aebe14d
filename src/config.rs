//! Interpreter configuration

use std::env;

use log::warn;

/// Default ceiling on parser nesting (parentheses, unary chains, assignments)
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Default ceiling on tree depth, enforced when the parser builds a tree
/// and again when the evaluator walks it. Left-leaning operator chains nest
/// in the tree without nesting in the parser, so this is larger.
pub const DEFAULT_MAX_EVAL_DEPTH: usize = 500;

pub const MAX_DEPTH_VAR: &str = "MINICALC_MAX_DEPTH";
pub const MAX_EVAL_DEPTH_VAR: &str = "MINICALC_MAX_EVAL_DEPTH";
pub const HISTORY_LIMIT_VAR: &str = "MINICALC_HISTORY_LIMIT";

/// Tunables for a single interpreter session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Deepest parser nesting accepted before failing with `TooComplex`
    pub max_depth: usize,
    /// Deepest tree the parser builds or the evaluator walks before failing
    /// with `TooComplex`
    pub max_eval_depth: usize,
    /// Number of run records kept; `None` keeps every run
    pub history_limit: Option<usize>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_eval_depth: DEFAULT_MAX_EVAL_DEPTH,
            history_limit: None,
        }
    }

    /// Defaults overridden by `MINICALC_MAX_DEPTH`, `MINICALC_MAX_EVAL_DEPTH`
    /// and `MINICALC_HISTORY_LIMIT`. Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Some(depth) = read_var(MAX_DEPTH_VAR) {
            config.max_depth = depth;
        }
        if let Some(depth) = read_var(MAX_EVAL_DEPTH_VAR) {
            config.max_eval_depth = depth;
        }
        if let Some(limit) = read_var(HISTORY_LIMIT_VAR) {
            config.history_limit = Some(limit);
        }

        config
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_eval_depth(mut self, max_eval_depth: usize) -> Self {
        self.max_eval_depth = max_eval_depth;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn read_var(name: &str) -> Option<usize> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring {}={:?}: not a non-negative integer", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.max_eval_depth, DEFAULT_MAX_EVAL_DEPTH);
        assert_eq!(config.history_limit, None);
    }

    #[test]
    fn test_builders() {
        let config = Config::new()
            .with_max_depth(8)
            .with_max_eval_depth(16)
            .with_history_limit(3);
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.max_eval_depth, 16);
        assert_eq!(config.history_limit, Some(3));
    }
}
