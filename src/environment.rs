//! Variable environment for minicalc
//!
//! A single flat namespace. Declaring or assigning a name always (re)binds
//! it; there are no nested scopes and no shadowing.

use std::collections::{BTreeMap, HashMap};

use crate::error::{CalcError, ErrorKind, Result};
use crate::value::Value;

/// Name to value bindings for one interpreter session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    values: HashMap<String, Value>,
}

impl Environment {
    /// Create an empty environment
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Bind `name`, replacing any previous binding
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Rebind `name`, creating it if absent
    pub fn assign(&mut self, name: &str, value: Value) {
        match self.values.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.values.insert(name.to_string(), value);
            }
        }
    }

    /// Get a variable's value
    pub fn get(&self, name: &str) -> Result<Value> {
        self.values.get(name).copied().ok_or_else(|| {
            CalcError::new(ErrorKind::UndefinedVariable(name.to_string()), None)
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Sorted copy of every binding
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.values
            .iter()
            .map(|(name, value)| (name.clone(), *value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_get() {
        let mut env = Environment::new();
        env.define("a", Value::Number(5.0));
        assert_eq!(env.get("a").unwrap(), Value::Number(5.0));
    }

    #[test]
    fn test_undefined() {
        let env = Environment::new();
        let err = env.get("ghost").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndefinedVariable("ghost".to_string()));
    }

    #[test]
    fn test_redefine_rebinds() {
        let mut env = Environment::new();
        env.define("a", Value::Number(1.0));
        env.define("a", Value::Null);
        assert_eq!(env.get("a").unwrap(), Value::Null);
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_assign_creates_binding() {
        let mut env = Environment::new();
        env.assign("fresh", Value::Bool(true));
        assert!(env.contains("fresh"));
    }

    #[test]
    fn test_snapshot_is_sorted_and_clear_empties() {
        let mut env = Environment::new();
        env.define("b", Value::Number(2.0));
        env.define("a", Value::Number(1.0));
        let names: Vec<String> = env.snapshot().into_keys().collect();
        assert_eq!(names, vec!["a", "b"]);

        env.clear();
        assert!(env.is_empty());
    }
}
