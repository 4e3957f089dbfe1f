//! Loop and conditional guards
//!
//! Both `while` and `if`/`elif` take a guard of the form `X <word> Y`. The
//! guard *matches* when `X == Y`, or when `X != Y` if `<word>` is `not`.
//! A loop is finished once its guard matches; a conditional body runs when its
//! guard matches.

use super::env::Environment;
use super::values::Value;
use crate::interpreter::executor::errors::RuntimeError;

/* ===================== Guards ===================== */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Equals,
    NotEquals,
}

impl Polarity {
    pub fn from_word(word: &str) -> Polarity {
        if word == "not" {
            Polarity::NotEquals
        } else {
            Polarity::Equals
        }
    }
}

/// One side of a guard, fixed when the guard is resolved
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Named variable, re-read every time the guard is checked
    Variable(String),
    /// Token that named no variable at resolution time
    Literal(Value),
}

impl Operand {
    pub fn resolve(token: &str, env: &Environment) -> Operand {
        if env.contains(token) {
            Operand::Variable(token.to_string())
        } else {
            Operand::Literal(Value::parse(token))
        }
    }

    fn value<'a>(&'a self, env: &'a Environment) -> Option<&'a Value> {
        match self {
            Operand::Variable(name) => env.get(name),
            Operand::Literal(value) => Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub subject: Operand,
    pub target: Operand,
    pub polarity: Polarity,
}

impl Condition {
    /// Resolve `[subject, polarity-word, target, ...]` guard arguments
    pub fn resolve(
        operation: &str,
        args: &[String],
        env: &Environment,
    ) -> Result<Condition, RuntimeError> {
        let [subject, word, target, ..] = args else {
            return Err(RuntimeError::MissingArgument {
                operation: operation.to_string(),
                expected: "<variable> <polarity> <value>",
            });
        };

        Ok(Condition {
            subject: Operand::resolve(subject, env),
            target: Operand::resolve(target, env),
            polarity: Polarity::from_word(word),
        })
    }

    pub fn matches(&self, env: &Environment) -> bool {
        let equal = self.subject.value(env) == self.target.value(env);
        match self.polarity {
            Polarity::Equals => equal,
            Polarity::NotEquals => !equal,
        }
    }
}

/* ===================== Loop Frames ===================== */

/// Active `while` loop
#[derive(Debug, Clone, PartialEq)]
pub struct LoopFrame {
    pub condition: Condition,
    /// Address of the `while` statement
    pub start: usize,
    /// Address of the matching `end`
    pub end: usize,
}

impl LoopFrame {
    pub fn finished(&self, env: &Environment) -> bool {
        self.condition.matches(env)
    }
}
