// Predicate registry: name -> check

use crate::validators;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A string predicate: `(string form of the value, argument) -> passed`
pub type PredicateFn = Arc<dyn Fn(&str, Option<&Value>) -> bool + Send + Sync>;

/// Name under which the structural array predicate is registered
pub const IS_ARRAY: &str = "isArray";

#[derive(Clone)]
pub enum Predicate {
    /// Plain check over the string form of a value
    Check(PredicateFn),
    /// `isArray`: JSON array, with nested checks over its elements
    Array,
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Check(_) => f.write_str("Predicate::Check"),
            Predicate::Array => f.write_str("Predicate::Array"),
        }
    }
}

static DEFAULT_REGISTRY: Lazy<Arc<PredicateRegistry>> =
    Lazy::new(|| Arc::new(PredicateRegistry::with_defaults()));

/// The process-wide registry of built-in predicates
pub fn default_registry() -> Arc<PredicateRegistry> {
    DEFAULT_REGISTRY.clone()
}

/// Named predicates available to rule sets
#[derive(Clone, Default)]
pub struct PredicateRegistry {
    predicates: HashMap<String, Predicate>,
}

impl PredicateRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in string predicates plus `isArray` and `notEmpty`
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (name, check) in validators::BUILTIN {
            registry.register(*name, *check);
        }
        registry
            .predicates
            .insert(IS_ARRAY.to_string(), Predicate::Array);
        registry
    }

    /// Register (or replace) a string predicate
    pub fn register<F>(&mut self, name: impl Into<String>, check: F) -> &mut Self
    where
        F: Fn(&str, Option<&Value>) -> bool + Send + Sync + 'static,
    {
        self.predicates
            .insert(name.into(), Predicate::Check(Arc::new(check)));
        self
    }

    /// Builder form of [`register`](Self::register)
    pub fn with<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str, Option<&Value>) -> bool + Send + Sync + 'static,
    {
        self.register(name, check);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Predicate> {
        self.predicates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.predicates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateRegistry")
            .field("predicates", &self.names())
            .finish()
    }
}
