//! Function registry and invocation
//!
//! A `func` statement captures the statements strictly between itself and its
//! matching `end` as a standalone [`Program`]. Every call runs that program in
//! a brand new [`VM`], so recursive and repeated calls never share a cursor,
//! loop stack, environment or return slot.

use std::collections::HashMap;
use std::ops::Range;
use std::rc::Rc;

use tracing::debug;

use super::errors::RuntimeError;
use super::exec_loop::run_until_done;
use super::types::Value;
use super::vm::VM;
use crate::interpreter::parser::semantic_validator::{
    validate_function_name, validate_variable_name,
};
use crate::interpreter::parser::{Keyword, Program, Statement};

pub type FunctionTable = Rc<HashMap<String, Rc<Function>>>;

/* ===================== Definition ===================== */

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Rc<Program>,
    /// Address range of the body in the defining program
    pub span: Range<usize>,
    /// Source text of the body
    pub source: String,
}

impl Function {
    /// Capture the function opened by `statement` at `address`, closed at `end`
    pub fn define(
        statement: &Statement,
        program: &Program,
        address: usize,
        end: usize,
    ) -> Result<Function, RuntimeError> {
        let mut args = statement.arguments.as_slice();
        if let [rest @ .., last] = args {
            if last == Keyword::Do.as_str() {
                args = rest;
            }
        }

        let [name, params @ ..] = args else {
            return Err(RuntimeError::MissingArgument {
                operation: statement.operation.clone(),
                expected: "<Name> <params...>",
            });
        };

        validate_function_name(name)?;
        for param in params {
            validate_variable_name(param)?;
        }

        let span = address + 1..end;
        let body = program.slice(span.clone());
        let source = body.source_text();

        Ok(Function {
            name: name.clone(),
            params: params.to_vec(),
            body: Rc::new(body),
            span,
            source,
        })
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/* ===================== Invocation ===================== */

/// What a finished call hands back to its caller
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    /// Value of the last `return` executed, if any
    pub value: Option<Value>,
    /// True if every statement of the body succeeded
    pub ok: bool,
}

/// Invoke `name` with argument tokens resolved in the caller's environment
///
/// An argument naming an existing variable passes that variable's value;
/// anything else is classified as a literal.
pub fn call_function(
    caller: &VM,
    name: &str,
    args: &[String],
) -> Result<CallOutcome, RuntimeError> {
    let function = caller
        .functions
        .get(name)
        .cloned()
        .ok_or_else(|| RuntimeError::UnknownOperation(name.to_string()))?;

    if args.len() != function.arity() {
        return Err(RuntimeError::ArityMismatch {
            name: function.name.clone(),
            expected: function.arity(),
            found: args.len(),
        });
    }

    let max_depth = caller.host.config.max_call_depth;
    if caller.depth() >= max_depth {
        return Err(RuntimeError::CallDepthExceeded(max_depth));
    }

    let bindings = function
        .params
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            let value = caller
                .env
                .get(arg)
                .cloned()
                .unwrap_or_else(|| Value::parse(arg));
            (param.clone(), value)
        })
        .collect();

    let mut callee = VM::for_call(caller, &function, bindings)?;
    debug!(function = %function.name, depth = callee.depth(), "call");

    let ok = run_until_done(&mut callee)?;
    let value = callee.return_value.take();

    debug!(function = %function.name, depth = callee.depth(), ok, returned = ?value, "return");
    Ok(CallOutcome { value, ok })
}
