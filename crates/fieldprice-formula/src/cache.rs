//! [`FormulaCache`] -- compiled formulas keyed by their text.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::ast::Expr;
use crate::eval::{evaluate, evaluate_number};
use crate::parser::parse;
use crate::types::{Bindings, Result, Value};

/// Process-lifetime cache of parsed formulas.
///
/// Reads take a shared lock. Inserts take the write lock only for the insert
/// itself, so two threads may parse the same text concurrently; the second
/// insert simply replaces an identical tree. Texts that fail to parse are not
/// cached.
#[derive(Debug, Default)]
pub struct FormulaCache {
    compiled: RwLock<HashMap<String, Arc<Expr>>>,
}

impl FormulaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the compiled form of `formula`, parsing it on first use.
    pub fn compile(&self, formula: &str) -> Result<Arc<Expr>> {
        let key = formula.trim();
        {
            let compiled = self.compiled.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(expr) = compiled.get(key) {
                return Ok(Arc::clone(expr));
            }
        }

        debug!(formula = key, "compiling formula");
        let expr = Arc::new(parse(key)?);
        self.compiled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), Arc::clone(&expr));
        Ok(expr)
    }

    /// Compiles (or reuses) `formula` and evaluates it to a finite number.
    pub fn evaluate(&self, formula: &str, bindings: &Bindings) -> Result<f64> {
        let expr = self.compile(formula)?;
        evaluate_number(&expr, bindings)
    }

    /// Compiles (or reuses) `formula` and evaluates it to any value.
    pub fn evaluate_value(&self, formula: &str, bindings: &Bindings) -> Result<Value> {
        let expr = self.compile(formula)?;
        evaluate(&expr, bindings)
    }

    /// Number of cached formulas.
    pub fn len(&self) -> usize {
        self.compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached formula.
    pub fn clear(&self) {
        self.compiled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FormulaError;
    use pretty_assertions::assert_eq;

    #[test]
    fn compiles_once_per_text() {
        let cache = FormulaCache::new();
        let a = cache.compile("value * 2").unwrap();
        let b = cache.compile("  value * 2 ").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn syntax_errors_are_not_cached() {
        let cache = FormulaCache::new();
        assert!(cache.compile("value *").unwrap_err().is_syntax());
        assert!(cache.is_empty());
    }

    #[test]
    fn evaluate_uses_bindings() {
        let cache = FormulaCache::new();
        let mut vars = Bindings::new();
        vars.insert("value".into(), Value::Number(3.0));
        assert_eq!(cache.evaluate("value * 2", &vars), Ok(6.0));
        vars.insert("value".into(), Value::Number(5.0));
        assert_eq!(cache.evaluate("value * 2", &vars), Ok(10.0));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn evaluate_requires_a_number() {
        let cache = FormulaCache::new();
        assert_eq!(
            cache.evaluate("true || false", &Bindings::new()),
            Err(FormulaError::NonNumericResult("boolean"))
        );
        assert_eq!(
            cache.evaluate_value("true || false", &Bindings::new()),
            Ok(Value::Bool(true))
        );
    }

    #[test]
    fn shared_across_threads() {
        let cache = Arc::new(FormulaCache::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    let mut vars = Bindings::new();
                    vars.insert("value".into(), Value::Number(f64::from(i)));
                    cache.evaluate("value + 1", &vars).unwrap()
                })
            })
            .collect();
        let mut results: Vec<f64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        results.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(results, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = FormulaCache::new();
        cache.compile("1 + 1").unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
