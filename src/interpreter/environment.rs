// File: src/interpreter/environment.rs
//
// Variable storage for one call frame of a Rockstar program.
//
// Rockstar has no nested scopes: the top level owns one environment for the
// whole run, and every function call gets a brand-new one. Blocks (If, loops)
// run directly against the environment of the frame they appear in.

use super::value::Value;
use std::collections::{BTreeMap, HashMap};

/// Variables of a single frame, keyed by canonical name
///
/// # Examples
///
/// ```ignore
/// let mut env = Environment::new();
/// env.set("my#heart".to_string(), Value::Int(10));
/// assert_eq!(env.get("my#heart"), Some(&Value::Int(10)));
///
/// env.set("my#heart".to_string(), Value::Str("gone".to_string()));  // type may change
/// ```
#[derive(Clone, Debug, Default)]
pub struct Environment {
    vars: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Environment { vars: HashMap::new() }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Store a value, replacing whatever was there before
    pub fn set(&mut self, name: String, value: Value) {
        self.vars.insert(name, value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// All variables ordered by name, for reporting final state
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.vars.iter().map(|(name, value)| (name.clone(), value.clone())).collect()
    }
}
