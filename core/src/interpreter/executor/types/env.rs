//! Variable environment

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::values::Value;
use crate::interpreter::executor::errors::RuntimeError;
use crate::interpreter::parser::semantic_validator::validate_variable_name;

/// Name to value mapping owned by one execution context
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment {
    vars: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.vars.get_mut(name)
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

    /// Declare a new variable. Fails if the name is invalid or already bound.
    pub fn declare(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        if self.contains(name) {
            return Err(RuntimeError::AlreadyDefined(name.to_string()));
        }
        self.bind(name, value)
    }

    /// Overwrite an existing variable
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        match self.vars.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RuntimeError::Undeclared(name.to_string())),
        }
    }

    /// Create or overwrite a variable after validating its name
    pub fn bind(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        validate_variable_name(name)?;
        self.vars.insert(name.to_string(), value);
        Ok(())
    }

    /// Variables sorted by name
    pub fn snapshot(&self) -> BTreeMap<&str, &Value> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }
}

impl FromIterator<(String, Value)> for Environment {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

/// `{a=int: 1, s=str: hi}`
impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.snapshot().into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}: {}", name, value.value_type(), value)?;
        }
        f.write_str("}")
    }
}
