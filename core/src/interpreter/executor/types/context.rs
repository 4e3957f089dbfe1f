//! Execution context kinds

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a VM is running
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum Scope {
    /// Top-level program
    Main,
    /// Body of a function call, `depth` counting from 1 for a call made at top level
    Function { name: String, depth: usize },
}

impl Scope {
    pub fn depth(&self) -> usize {
        match self {
            Scope::Main => 0,
            Scope::Function { depth, .. } => *depth,
        }
    }

    pub fn is_main(&self) -> bool {
        matches!(self, Scope::Main)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Main => f.write_str("main"),
            Scope::Function { name, depth } => write!(f, "function {} (depth {})", name, depth),
        }
    }
}

/// Statements an execution context accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub allows_return: bool,
    pub allows_func_definition: bool,
    pub allows_conditionals: bool,
}

impl Capabilities {
    pub fn main() -> Self {
        Self {
            allows_return: false,
            allows_func_definition: true,
            allows_conditionals: true,
        }
    }

    pub fn function(allows_conditionals: bool) -> Self {
        Self {
            allows_return: true,
            allows_func_definition: false,
            allows_conditionals,
        }
    }
}
