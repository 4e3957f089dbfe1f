//! Virtual Machine state
//!
//! One VM is one execution context: the top-level program, or a single
//! function call. A VM is never reused; every call builds a fresh one.

use std::collections::HashMap;
use std::rc::Rc;

use super::errors::RuntimeError;
use super::functions::{Function, FunctionTable};
use super::output::Host;
use super::types::{Capabilities, Cursor, Environment, LoopFrame, Scope, Value};
use crate::interpreter::parser::Program;

/* ===================== VM ===================== */

pub struct VM {
    /// Variables visible to this context
    pub env: Environment,

    /// Functions defined so far, shared read-only with callees
    pub functions: FunctionTable,

    /// Active `while` loops, innermost last
    pub loops: Vec<LoopFrame>,

    pub cursor: Cursor,

    /// Value stored by the last executed `return`
    pub return_value: Option<Value>,

    pub scope: Scope,
    pub capabilities: Capabilities,
    pub host: Rc<Host>,
}

impl VM {
    /// Top-level VM over `program`, starting from `env`
    pub fn new(program: Rc<Program>, env: Environment, host: Rc<Host>) -> Self {
        VM {
            env,
            functions: Rc::new(HashMap::new()),
            loops: Vec::new(),
            cursor: Cursor::new(program),
            return_value: None,
            scope: Scope::Main,
            capabilities: Capabilities::main(),
            host,
        }
    }

    /// Fresh VM for one invocation of `function`
    ///
    /// The callee starts from a copy of the caller's environment with the
    /// parameter bindings layered on top.
    pub fn for_call(
        caller: &VM,
        function: &Function,
        bindings: Vec<(String, Value)>,
    ) -> Result<Self, RuntimeError> {
        let mut env = caller.env.clone();
        for (param, value) in bindings {
            env.bind(&param, value)?;
        }

        Ok(VM {
            env,
            functions: Rc::clone(&caller.functions),
            loops: Vec::new(),
            cursor: Cursor::new(Rc::clone(&function.body)),
            return_value: None,
            scope: Scope::Function {
                name: function.name.clone(),
                depth: caller.depth() + 1,
            },
            capabilities: Capabilities::function(caller.host.config.conditionals_in_functions),
            host: Rc::clone(&caller.host),
        })
    }

    /// Number of function calls between this context and the top level
    pub fn depth(&self) -> usize {
        self.scope.depth()
    }

    pub fn program(&self) -> &Rc<Program> {
        self.cursor.program()
    }

    /// Address of the `end` closing the block opened at `address`
    pub fn block_end(&self, address: usize, operation: &str) -> Result<usize, RuntimeError> {
        self.program()
            .block_end(address)
            .ok_or_else(|| RuntimeError::UnmatchedBlock(operation.to_string()))
    }
}

/* ===================== Step Result ===================== */

/// Result of executing one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A statement ran; `ok` is false if it reported a recoverable failure
    Continue { ok: bool },
    /// No statement left at the program counter
    Done,
}
