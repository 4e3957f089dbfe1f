//! Statement execution handlers
//!
//! Each handler returns `Ok(true)` on success, `Ok(false)` when the statement
//! ran but something it executed reported a failure, and `Err` otherwise.

use std::rc::Rc;

use tracing::{debug, trace, warn};

use super::errors::RuntimeError;
use super::exec_loop::run_block;
use super::expressions::{print_parts, resolve_value};
use super::functions::{call_function, Function};
use super::types::{Condition, LoopFrame, Value, ValueError};
use super::vm::VM;
use crate::interpreter::parser::{Keyword, Statement};

/* ===================== Dispatch ===================== */

pub fn execute_statement(
    vm: &mut VM,
    address: usize,
    statement: &Rc<Statement>,
) -> Result<bool, RuntimeError> {
    let args = statement.arguments.as_slice();

    match statement.keyword() {
        Some(Keyword::Print) => execute_print(vm, args),
        Some(Keyword::Incr) => execute_mutation(vm, "incr", args, Value::increment),
        Some(Keyword::Decr) => execute_mutation(vm, "decr", args, Value::decrement),
        Some(Keyword::Clear) => execute_clear(vm, args),
        Some(Keyword::Init) => execute_init(vm, args),
        Some(Keyword::Set) => execute_set(vm, args),
        Some(Keyword::Copy) => execute_copy(vm, args),
        Some(Keyword::While) => execute_while(vm, address, args),
        Some(Keyword::End) => execute_end(vm, address),
        Some(Keyword::If) => execute_if(vm, address, statement),
        Some(keyword @ (Keyword::Elif | Keyword::Else)) => {
            Err(RuntimeError::OrphanBranch(keyword.to_string()))
        }
        Some(Keyword::Func) => execute_func(vm, address, statement),
        Some(Keyword::Return) => execute_return(vm, args),
        _ if vm.functions.contains_key(statement.operation.as_str()) => {
            let outcome = call_function(vm, &statement.operation, args)?;
            Ok(outcome.ok)
        }
        _ => Err(RuntimeError::UnknownOperation(statement.operation.clone())),
    }
}

/* ===================== Variables ===================== */

fn execute_print(vm: &mut VM, args: &[String]) -> Result<bool, RuntimeError> {
    let line = print_parts(vm, args)?.join(" ");
    vm.host.output.print(&line);
    Ok(true)
}

fn execute_mutation(
    vm: &mut VM,
    operation: &'static str,
    args: &[String],
    mutate: fn(&mut Value) -> Result<(), ValueError>,
) -> Result<bool, RuntimeError> {
    let name = variable_argument(operation, args)?;
    let value = vm
        .env
        .get_mut(name)
        .ok_or_else(|| RuntimeError::Undeclared(name.to_string()))?;

    mutate(value).map_err(|source| RuntimeError::Mutation {
        name: name.to_string(),
        operation,
        source,
    })?;
    Ok(true)
}

/// `clear x` zeroes a numeric variable, declaring it as `0` if absent
fn execute_clear(vm: &mut VM, args: &[String]) -> Result<bool, RuntimeError> {
    let name = variable_argument("clear", args)?;
    match vm.env.get_mut(name) {
        Some(value) => value.clear().map_err(|source| RuntimeError::Mutation {
            name: name.to_string(),
            operation: "clear",
            source,
        })?,
        None => vm.env.declare(name, Value::Int(0))?,
    }
    Ok(true)
}

/// `init x to <literal>`
fn execute_init(vm: &mut VM, args: &[String]) -> Result<bool, RuntimeError> {
    let [name, literal] = assignment_arguments("init", args, "<variable> to <literal>")?;
    vm.env.declare(name, Value::parse(literal))?;
    Ok(true)
}

/// `set x to <value>`
fn execute_set(vm: &mut VM, args: &[String]) -> Result<bool, RuntimeError> {
    let [name, _] = assignment_arguments("set", args, "<variable> to <value>")?;
    if !vm.env.contains(name) {
        return Err(RuntimeError::Undeclared(name.to_string()));
    }

    let (value, ok) = resolve_value(vm, &args[2..])?;
    vm.env.assign(name, value)?;
    Ok(ok)
}

/// `copy src to dst`
fn execute_copy(vm: &mut VM, args: &[String]) -> Result<bool, RuntimeError> {
    let [source, target] = assignment_arguments("copy", args, "<variable> to <variable>")?;
    let value = vm
        .env
        .get(source)
        .cloned()
        .ok_or_else(|| RuntimeError::Missing(source.to_string()))?;

    vm.env.bind(target, value)?;
    Ok(true)
}

fn variable_argument<'a>(
    operation: &'static str,
    args: &'a [String],
) -> Result<&'a str, RuntimeError> {
    args.first()
        .map(String::as_str)
        .ok_or_else(|| RuntimeError::MissingArgument {
            operation: operation.to_string(),
            expected: "<variable>",
        })
}

/// Split `<lhs> to <rhs> ...` into `[lhs, rhs]`
fn assignment_arguments<'a>(
    operation: &'static str,
    args: &'a [String],
    expected: &'static str,
) -> Result<[&'a str; 2], RuntimeError> {
    match args {
        [lhs, to, rhs, ..] if to == Keyword::To.as_str() => Ok([lhs.as_str(), rhs.as_str()]),
        _ => Err(RuntimeError::MissingArgument {
            operation: operation.to_string(),
            expected,
        }),
    }
}

/* ===================== Loops ===================== */

/// `while x <polarity> y [do]`
///
/// A loop whose guard already matches is skipped entirely. Otherwise a frame is
/// pushed and the body runs until the matching `end`.
fn execute_while(vm: &mut VM, address: usize, args: &[String]) -> Result<bool, RuntimeError> {
    let end = vm.block_end(address, "while")?;
    let condition = Condition::resolve("while", args, &vm.env)?;

    if condition.matches(&vm.env) {
        trace!(address, end, "loop finished");
        vm.cursor.branch(end + 1);
    } else {
        vm.loops.push(LoopFrame {
            condition,
            start: address,
            end,
        });
    }
    Ok(true)
}

/// `end` of a loop body: pop the frame and repeat unless finished
///
/// Conditional and function bodies never execute their own `end`.
fn execute_end(vm: &mut VM, address: usize) -> Result<bool, RuntimeError> {
    match vm.loops.last() {
        Some(frame) if frame.end == address => {
            if let Some(frame) = vm.loops.pop() {
                if !frame.finished(&vm.env) {
                    trace!(address, start = frame.start, "loop repeat");
                    vm.cursor.branch(frame.start);
                }
            }
        }
        _ => warn!(address, "end without an open block"),
    }
    Ok(true)
}

/* ===================== Conditionals ===================== */

/// `if ... end [elif ... end]* [else ... end]`
///
/// At most one body in the chain runs, in place. Control resumes after the
/// `end` of the last link of the chain.
fn execute_if(
    vm: &mut VM,
    address: usize,
    statement: &Rc<Statement>,
) -> Result<bool, RuntimeError> {
    if !vm.capabilities.allows_conditionals {
        return Err(RuntimeError::ConditionalInFunction);
    }

    let mut success = true;
    let mut taken = false;
    let mut opener = address;
    let mut link = Rc::clone(statement);

    loop {
        let keyword = link.keyword();
        let end = vm.block_end(opener, &link.operation)?;

        let run = match keyword {
            Some(Keyword::Else) => !taken,
            _ if taken => false,
            _ => Condition::resolve(&link.operation, &link.arguments, &vm.env)?.matches(&vm.env),
        };

        if run {
            trace!(address = opener, end, "branch taken");
            success &= run_block(vm, opener + 1, end)?;
            taken = true;
        }
        vm.cursor.branch(end + 1);

        if keyword == Some(Keyword::Else) {
            break;
        }
        match vm.cursor.peek() {
            Some(next) if matches!(next.keyword(), Some(Keyword::Elif | Keyword::Else)) => {
                // Consume the next link of the chain
                opener = end + 1;
                vm.cursor.branch(opener + 1);
                link = next;
            }
            _ => break,
        }
    }

    Ok(success)
}

/* ===================== Functions ===================== */

/// `func Name params... [do]` registers the body and skips over it
fn execute_func(vm: &mut VM, address: usize, statement: &Statement) -> Result<bool, RuntimeError> {
    if !vm.capabilities.allows_func_definition {
        return Err(RuntimeError::NestedFunction);
    }

    let end = vm.block_end(address, "func")?;
    let function = Function::define(statement, vm.program(), address, end)?;
    debug!(
        function = %function.name,
        params = ?function.params,
        span = ?function.span,
        "defined function"
    );

    Rc::make_mut(&mut vm.functions).insert(function.name.clone(), Rc::new(function));
    vm.cursor.branch(end + 1);
    Ok(true)
}

/// `return <value>` stores the value; the body keeps running to its end
fn execute_return(vm: &mut VM, args: &[String]) -> Result<bool, RuntimeError> {
    if !vm.capabilities.allows_return {
        return Err(RuntimeError::ReturnOutsideFunction);
    }
    if args.is_empty() {
        return Err(RuntimeError::MissingArgument {
            operation: "return".to_string(),
            expected: "a value",
        });
    }

    let (value, ok) = resolve_value(vm, args)?;
    vm.return_value = Some(value);
    Ok(ok)
}
