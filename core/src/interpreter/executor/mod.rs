//! # Executor - Address-Based Interpreter
//!
//! Runs a parsed [`Program`](crate::interpreter::parser::Program) by walking it
//! with a program counter.
//!
//! ## Core Principles
//!
//! 1. **Flat control flow**: loops, conditionals and function definitions are
//!    jumps to addresses resolved once by the block matcher
//! 2. **Statement-level execution**: `step()` runs exactly one statement
//! 3. **Fresh context per call**: every function invocation gets its own
//!    [`VM`] seeded from a copy of the caller's environment
//! 4. **Two failure severities**: recoverable errors fail a statement and are
//!    reported, fatal errors abort the run as a [`StatementError`]

pub mod errors;
pub mod exec_loop;
pub mod expressions;
pub mod functions;
pub mod output;
pub mod statements;
pub mod stdlib;
pub mod types;
pub mod vm;

#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use errors::{RuntimeError, StatementError};
pub use exec_loop::{run_block, run_until_done, step};
pub use functions::{CallOutcome, Function, FunctionTable};
pub use output::{CapturedOutput, Host, Output, Snapshot, StdOutput};
pub use types::{Environment, Scope, Value, ValueType};
pub use vm::{Step, VM};
