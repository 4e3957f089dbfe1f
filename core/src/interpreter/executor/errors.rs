//! Runtime error types
//!
//! Statement handlers fail with a [`RuntimeError`]. The execution loop decides
//! what happens next: recoverable errors are reported and mark the statement as
//! failed, everything else is located as a [`StatementError`] and aborts the run.

use thiserror::Error;

use super::stdlib::MathError;
use super::types::{Scope, ValueError};
use crate::interpreter::parser::semantic_validator::ValidationError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("no such operation '{0}'")]
    UnknownOperation(String),

    #[error("'{operation}' expects {expected}")]
    MissingArgument {
        operation: String,
        expected: &'static str,
    },

    #[error("function {name} takes {expected} argument(s), {found} given")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("trying to initialise an existing variable {0}")]
    AlreadyDefined(String),

    #[error("trying to access an inexisting variable {0}")]
    Undeclared(String),

    #[error("variable not found: {0}")]
    Missing(String),

    #[error(transparent)]
    InvalidName(#[from] ValidationError),

    #[error("cannot {operation} {name}: {source}")]
    Mutation {
        name: String,
        operation: &'static str,
        source: ValueError,
    },

    #[error("invalid math expression '{expression}': {source}")]
    InvalidExpression {
        expression: String,
        source: MathError,
    },

    #[error("'{0}' is not a literal, variable, function call or eval expression")]
    UnresolvedExpression(String),

    #[error("'{0}' block has no matching end")]
    UnmatchedBlock(String),

    #[error("'{0}' without a preceding if block")]
    OrphanBranch(String),

    #[error("return outside of a function")]
    ReturnOutsideFunction,

    #[error("functions can only be defined at top level")]
    NestedFunction,

    #[error("conditionals are not allowed inside function bodies")]
    ConditionalInFunction,

    #[error("function {0} did not return a value")]
    NoReturnValue(String),

    #[error("maximum call depth of {0} exceeded")]
    CallDepthExceeded(usize),

    /// Fatal error raised while running a nested body, already located
    #[error(transparent)]
    Nested(Box<StatementError>),
}

impl RuntimeError {
    /// Recoverable errors fail the statement but let the program continue
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RuntimeError::Missing(_))
    }
}

impl From<StatementError> for RuntimeError {
    fn from(err: StatementError) -> Self {
        RuntimeError::Nested(Box::new(err))
    }
}

/// Fatal error located at the statement that raised it
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Error: {error}\n  at line {line}, address {address} in {scope}: {text}")]
pub struct StatementError {
    pub address: usize,
    pub line: usize,
    pub scope: Scope,
    pub text: String,
    pub error: RuntimeError,
}
