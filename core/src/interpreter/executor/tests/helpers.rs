//! Test helpers for executor tests
//!
//! Common utilities for parsing sources and running them to completion

use std::collections::HashMap;
use std::rc::Rc;

use crate::config::Config;
use crate::interpreter::executor::{
    run_until_done, CapturedOutput, Environment, Host, StatementError, Value, VM,
};
use crate::interpreter::parser::Program;

/// Finished run: the top-level VM, what it printed and how it ended
pub struct Run {
    pub vm: VM,
    pub output: Rc<CapturedOutput>,
    pub result: Result<bool, StatementError>,
}

impl Run {
    pub fn var(&self, name: &str) -> Option<&Value> {
        self.vm.env.get(name)
    }

    pub fn lines(&self) -> Vec<String> {
        self.output.lines()
    }

    /// Fatal error of the run, panicking if it completed
    pub fn fatal(&self) -> &StatementError {
        match &self.result {
            Err(e) => e,
            Ok(ok) => panic!("Expected a fatal error, run completed with {ok}"),
        }
    }
}

/// Parse source, serialize/deserialize the program, and run it
///
/// The JSON round trip checks that the statement sequence survives
/// serialization with its block structure intact.
pub fn run_program(source: &str, config: Config, globals: Environment) -> Run {
    let program = Program::parse(source).expect("Parse failed");
    let json = serde_json::to_string(&program).expect("Program serialization failed");
    let program: Program = serde_json::from_str(&json).expect("Program deserialization failed");

    let output = Rc::new(CapturedOutput::new());
    let host = Rc::new(Host::new(Rc::clone(&output), config));
    let mut vm = VM::new(Rc::new(program), globals, host);
    let result = run_until_done(&mut vm);

    Run { vm, output, result }
}

pub fn run_source(source: &str) -> Run {
    run_program(source, Config::default(), Environment::new())
}

pub fn run_with_config(source: &str, config: Config) -> Run {
    run_program(source, config, Environment::new())
}

pub fn run_with_globals(source: &str, globals: HashMap<&str, Value>) -> Run {
    run_program(source, Config::default(), env(globals))
}

/// Build an environment from `maplit::hashmap!` pairs
pub fn env(vars: HashMap<&str, Value>) -> Environment {
    vars.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Top-level VM over `source` that has not started yet
pub fn build_vm(source: &str) -> (VM, Rc<CapturedOutput>) {
    let program = Program::parse(source).expect("Parse failed");
    let output = Rc::new(CapturedOutput::new());
    let host = Rc::new(Host::new(Rc::clone(&output), Config::default()));
    (VM::new(Rc::new(program), Environment::new(), host), output)
}
