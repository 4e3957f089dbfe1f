//! Output sink and host services shared by every VM of a run

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;
use tracing::warn;

use super::stdlib::{ExpressionEvaluator, MathEvaluator};
use super::types::{Environment, Value};
use crate::config::{Config, SnapshotFormat};

/* ===================== Output ===================== */

/// Point in a run at which the environment is published in verbose mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "t")]
pub enum Snapshot {
    Initial,
    AfterStatement { address: usize },
    Final,
}

/// Destination for program output, diagnostics and verbose snapshots
pub trait Output {
    /// Line printed by a `print` statement
    fn print(&self, line: &str);

    /// User-facing error diagnostic
    fn report(&self, diagnostic: &str);

    fn snapshot(&self, _point: Snapshot, _env: &Environment) {}
}

impl<O: Output + ?Sized> Output for Rc<O> {
    fn print(&self, line: &str) {
        (**self).print(line)
    }

    fn report(&self, diagnostic: &str) {
        (**self).report(diagnostic)
    }

    fn snapshot(&self, point: Snapshot, env: &Environment) {
        (**self).snapshot(point, env)
    }
}

/// Process stdout/stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct StdOutput {
    pub format: SnapshotFormat,
}

impl StdOutput {
    pub fn new(format: SnapshotFormat) -> Self {
        Self { format }
    }
}

impl Output for StdOutput {
    fn print(&self, line: &str) {
        println!("{}", line);
    }

    fn report(&self, diagnostic: &str) {
        eprintln!("{}", diagnostic);
    }

    fn snapshot(&self, point: Snapshot, env: &Environment) {
        match self.format {
            SnapshotFormat::Text => match point {
                Snapshot::Initial => println!("Initialised variables: {}", env),
                Snapshot::AfterStatement { .. } => println!("{}", env),
                Snapshot::Final => println!("Finished with variables: {}", env),
            },
            SnapshotFormat::Json => {
                #[derive(Serialize)]
                struct Record<'a> {
                    point: Snapshot,
                    variables: BTreeMap<&'a str, &'a Value>,
                }

                let record = Record {
                    point,
                    variables: env.snapshot(),
                };
                match serde_json::to_string(&record) {
                    Ok(json) => println!("{}", json),
                    Err(e) => warn!(error = %e, "failed to serialize snapshot"),
                }
            }
        }
    }
}

/// In-memory sink used by tests and embedders
#[derive(Debug, Default)]
pub struct CapturedOutput {
    lines: RefCell<Vec<String>>,
    diagnostics: RefCell<Vec<String>>,
    snapshots: RefCell<Vec<(Snapshot, Environment)>>,
}

impl CapturedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn diagnostics(&self) -> Vec<String> {
        self.diagnostics.borrow().clone()
    }

    pub fn snapshots(&self) -> Vec<(Snapshot, Environment)> {
        self.snapshots.borrow().clone()
    }
}

impl Output for CapturedOutput {
    fn print(&self, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }

    fn report(&self, diagnostic: &str) {
        self.diagnostics.borrow_mut().push(diagnostic.to_string());
    }

    fn snapshot(&self, point: Snapshot, env: &Environment) {
        self.snapshots.borrow_mut().push((point, env.clone()));
    }
}

/* ===================== Host ===================== */

/// Services a program and all of its function calls share
pub struct Host {
    pub output: Box<dyn Output>,
    pub evaluator: Box<dyn ExpressionEvaluator>,
    pub config: Config,
}

impl Host {
    pub fn new(output: impl Output + 'static, config: Config) -> Self {
        Self {
            output: Box::new(output),
            evaluator: Box::new(MathEvaluator),
            config,
        }
    }

    pub fn with_evaluator(mut self, evaluator: impl ExpressionEvaluator + 'static) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    pub fn verbose(&self) -> bool {
        self.config.verbose
    }
}
