use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::config::{Config, SnapshotFormat};
use crate::interpreter::{Interpreter, InterpreterError};

#[derive(Parser, Debug)]
#[command(name = "bbeat")]
#[command(about = "BBEAT - BareBones (Extended) interpreter", long_about = None)]
pub struct Cli {
    /// Print the environment before, during and after the run
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Render verbose snapshots as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the parsed statements as JSON instead of running them
    #[arg(long)]
    pub dump: bool,

    /// Path to config file (overrides default search)
    #[arg(long)]
    pub config: Option<String>,

    /// Maximum nested function calls (overrides config file and env vars)
    #[arg(long)]
    pub max_call_depth: Option<usize>,

    /// NAME=VALUE global assignments followed by the source file
    #[arg(required = true, num_args = 1.., value_name = "NAME=VALUE ... FILE")]
    pub args: Vec<String>,
}

impl Cli {
    /// Source file and the assignments preceding it
    pub fn source_and_assignments(&self) -> Result<(&Path, &[String])> {
        let (file, assignments) = self.args.split_last().context("missing source file")?;
        Ok((Path::new(file), assignments))
    }
}

/// Run the CLI by parsing process arguments
///
/// `Ok(false)` means the program ran but did not fully succeed.
pub fn run_cli() -> Result<bool> {
    let cli = Cli::parse();
    run_cli_with_args(cli)
}

/// Run the CLI with provided arguments
pub fn run_cli_from_args(args: Vec<String>) -> Result<bool> {
    let cli = Cli::parse_from(args);
    run_cli_with_args(cli)
}

fn run_cli_with_args(cli: Cli) -> Result<bool> {
    let config = Config::builder()
        .config_path(cli.config.as_ref().map(PathBuf::from))
        .verbose(cli.verbose.then_some(true))
        .snapshot_format(cli.json.then_some(SnapshotFormat::Json))
        .max_call_depth(cli.max_call_depth)
        .build()
        .context("Failed to load configuration")?;

    let (path, assignments) = cli.source_and_assignments()?;
    if !path.is_file() {
        bail!("Source file not found");
    }
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut interpreter = Interpreter::new(&source, config)?;

    if cli.dump {
        println!("{}", serde_json::to_string_pretty(interpreter.program())?);
        return Ok(true);
    }

    for assignment in assignments {
        interpreter.define_assignment(assignment)?;
    }

    match interpreter.run() {
        Ok(success) => Ok(success),
        // Already reported by the interpreter
        Err(InterpreterError::Runtime(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
