//! Core execution loop
//!
//! 1. run_until_done() - Top-level driver (calls step repeatedly)
//! 2. step() - Fetches one statement, dispatches it and classifies the outcome
//! 3. run_block() - Runs an address range in place, used for conditional bodies

use tracing::{trace, warn};

use super::errors::{RuntimeError, StatementError};
use super::output::Snapshot;
use super::statements::execute_statement;
use super::types::Located;
use super::vm::{Step, VM};

/* ===================== Public API ===================== */

/// Run the VM until the program counter falls off the end of its program
///
/// Returns `Ok(true)` when every statement succeeded, `Ok(false)` when at least
/// one statement reported a recoverable failure. A fatal error stops the run
/// immediately.
pub fn run_until_done(vm: &mut VM) -> Result<bool, StatementError> {
    publish(vm, Snapshot::Initial);

    let mut success = true;
    loop {
        match step(vm)? {
            Step::Continue { ok } => success &= ok,
            Step::Done => break,
        }
    }

    publish(vm, Snapshot::Final);
    Ok(success)
}

/// Execute the statement at the program counter
pub fn step(vm: &mut VM) -> Result<Step, StatementError> {
    let Some(Located { address, statement }) = vm.cursor.next() else {
        return Ok(Step::Done);
    };

    trace!(address, operation = %statement.operation, scope = %vm.scope, "dispatch");

    let ok = match execute_statement(vm, address, &statement) {
        Ok(ok) => ok,
        // Already located where it was raised
        Err(RuntimeError::Nested(inner)) => return Err(*inner),
        Err(error) => {
            let recoverable = error.is_recoverable();
            let located = StatementError {
                address,
                line: statement.line,
                scope: vm.scope.clone(),
                text: statement.text.clone(),
                error,
            };
            if !recoverable {
                return Err(located);
            }

            warn!(address, line = statement.line, error = %located.error, "statement failed");
            vm.host.output.report(&located.to_string());
            false
        }
    };

    if !(statement.opens_block() || statement.closes_block()) {
        publish(vm, Snapshot::AfterStatement { address });
    }

    Ok(Step::Continue { ok })
}

/// Execute the statements in `[start, end)` through the cursor
///
/// Branches inside the range (loops, nested conditionals) are followed; the
/// block is done as soon as the program counter reaches `end` or beyond.
pub fn run_block(vm: &mut VM, start: usize, end: usize) -> Result<bool, RuntimeError> {
    trace!(start, end, "enter block");
    vm.cursor.branch(start);

    let mut success = true;
    while vm.cursor.current() < end {
        match step(vm)? {
            Step::Continue { ok } => success &= ok,
            Step::Done => break,
        }
    }

    Ok(success)
}

/* ===================== Verbose Hook ===================== */

fn publish(vm: &VM, point: Snapshot) {
    if vm.scope.is_main() && vm.host.verbose() {
        vm.host.output.snapshot(point, &vm.env);
    }
}
