pub mod cli;
pub mod config;
pub mod interpreter;

// Re-export main types
pub use config::Config;
pub use interpreter::{Interpreter, InterpreterError, Program, Value};
