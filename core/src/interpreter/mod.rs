pub mod executor;
pub mod parser;

pub use executor::{CapturedOutput, Output, StatementError, StdOutput, Value};
pub use parser::{ParseError, Program, Statement};

use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use executor::{run_until_done, Environment, Host, RuntimeError, VM};

#[derive(Debug, Error)]
pub enum InterpreterError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid variable assignment '{0}', expected NAME=VALUE")]
    MalformedAssignment(String),

    #[error("cannot define global '{name}': {source}")]
    Global { name: String, source: RuntimeError },

    #[error(transparent)]
    Runtime(#[from] StatementError),
}

/// Parsed program plus the globals it starts with
///
/// Each call to [`Interpreter::run`] executes the program from scratch in a new
/// top-level VM.
pub struct Interpreter {
    program: Rc<Program>,
    globals: Environment,
    host: Rc<Host>,
}

impl Interpreter {
    /// Parse `source`, writing to stdout/stderr
    pub fn new(source: &str, config: Config) -> Result<Self, InterpreterError> {
        let output = StdOutput::new(config.snapshot_format);
        Self::with_output(source, config, output)
    }

    pub fn with_output(
        source: &str,
        config: Config,
        output: impl Output + 'static,
    ) -> Result<Self, InterpreterError> {
        let program = Program::parse(source)?;
        debug!(statements = program.len(), "parsed program");

        Ok(Self {
            program: Rc::new(program),
            globals: Environment::new(),
            host: Rc::new(Host::new(output, config)),
        })
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    /// Define a global from its textual value before the program runs
    pub fn define_global(&mut self, name: &str, value: &str) -> Result<(), InterpreterError> {
        self.globals
            .bind(name, Value::parse(value))
            .map_err(|source| InterpreterError::Global {
                name: name.to_string(),
                source,
            })
    }

    /// Define a global from a `NAME=VALUE` argument
    pub fn define_assignment(&mut self, assignment: &str) -> Result<(), InterpreterError> {
        let (name, value) = parse_assignment(assignment)
            .ok_or_else(|| InterpreterError::MalformedAssignment(assignment.to_string()))?;
        self.define_global(name, value)
    }

    /// Run the program to completion
    ///
    /// `Ok(true)` when every statement succeeded. A fatal error is reported
    /// through the output sink before it is returned.
    pub fn run(&self) -> Result<bool, InterpreterError> {
        let mut vm = VM::new(
            Rc::clone(&self.program),
            self.globals.clone(),
            Rc::clone(&self.host),
        );

        match run_until_done(&mut vm) {
            Ok(success) => Ok(success),
            Err(e) => {
                self.host.output.report(&e.to_string());
                Err(e.into())
            }
        }
    }
}

/// Split `NAME=VALUE` on the last `=`, trimming both sides
pub fn parse_assignment(arg: &str) -> Option<(&str, &str)> {
    let (name, value) = arg.rsplit_once('=')?;
    Some((name.trim(), value.trim()))
}
