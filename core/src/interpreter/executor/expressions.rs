//! Right-hand side resolution and `eval` substitution
//!
//! The engine has no expression tree. A right-hand side is a token list whose
//! first token decides how the rest is read.

use tracing::{trace, warn};

use super::errors::RuntimeError;
use super::functions::call_function;
use super::stdlib::math::is_reserved_token;
use super::types::{unquote, Environment, Value};
use super::vm::VM;
use crate::interpreter::parser::Keyword;

/* ===================== Right-Hand Sides ===================== */

/// Resolve the value of `set`/`return` right-hand side tokens
///
/// In order: `eval <expr>`, function call, then a single token that is a
/// boolean or quoted literal, an existing variable or a numeric literal. Only
/// `eval` and calls take more than one token.
///
/// The flag is false when a function called to produce the value reported a
/// failure.
pub fn resolve_value(vm: &VM, tokens: &[String]) -> Result<(Value, bool), RuntimeError> {
    let Some(first) = tokens.first() else {
        return Err(RuntimeError::MissingArgument {
            operation: "to".to_string(),
            expected: "a value",
        });
    };

    if first == Keyword::Eval.as_str() {
        return Ok((evaluate(vm, &tokens[1..])?, true));
    }

    if vm.functions.contains_key(first.as_str()) && !vm.env.contains(first) {
        let outcome = call_function(vm, first, &tokens[1..])?;
        if !outcome.ok {
            warn!(function = %first, "call used as a value reported failures");
        }
        let value = outcome
            .value
            .ok_or_else(|| RuntimeError::NoReturnValue(first.clone()))?;
        return Ok((value, outcome.ok));
    }

    let unresolved = || RuntimeError::UnresolvedExpression(tokens.join(" "));
    if tokens.len() > 1 {
        return Err(unresolved());
    }

    if first == "true" || first == "false" || first.starts_with('"') {
        return Ok((Value::parse(first), true));
    }

    if let Some(value) = vm.env.get(first) {
        return Ok((value.clone(), true));
    }

    match Value::parse(first) {
        value if value.is_numeric() => Ok((value, true)),
        _ => Err(unresolved()),
    }
}

/* ===================== Arithmetic ===================== */

/// Substitute variables into `tokens` and evaluate the arithmetic expression
pub fn evaluate(vm: &VM, tokens: &[String]) -> Result<Value, RuntimeError> {
    if tokens.is_empty() {
        return Err(RuntimeError::MissingArgument {
            operation: Keyword::Eval.as_str().to_string(),
            expected: "an arithmetic expression",
        });
    }

    let expression = tokens
        .iter()
        .map(|token| substitute(token, &vm.env))
        .collect::<Vec<_>>()
        .join(" ");
    trace!(%expression, "evaluate");

    let result = vm
        .host
        .evaluator
        .evaluate(&expression)
        .map_err(|source| RuntimeError::InvalidExpression {
            expression: expression.clone(),
            source,
        })?;

    Ok(Value::from_float(result))
}

/// Replace every identifier in `token` that names a variable with its value
///
/// Identifiers are maximal runs of alphanumerics and `_`. Reserved arithmetic
/// names are never substituted, even if a variable of that name exists.
pub fn substitute(token: &str, env: &Environment) -> String {
    let mut out = String::with_capacity(token.len());
    let mut ident = String::new();

    let flush = |ident: &mut String, out: &mut String| {
        if ident.is_empty() {
            return;
        }
        match env.get(ident) {
            Some(value) if !is_reserved_token(ident) => out.push_str(&value.to_string()),
            _ => out.push_str(ident),
        }
        ident.clear();
    };

    for c in token.chars() {
        if c.is_alphanumeric() || c == '_' {
            ident.push(c);
        } else {
            flush(&mut ident, &mut out);
            out.push(c);
        }
    }
    flush(&mut ident, &mut out);

    out
}

/* ===================== Print ===================== */

/// Render `print` arguments
///
/// Quoted tokens print without their quotes, other tokens must name variables.
/// `eval` consumes every remaining token as one expression.
pub fn print_parts(vm: &VM, args: &[String]) -> Result<Vec<String>, RuntimeError> {
    let mut parts = Vec::with_capacity(args.len());

    for (i, arg) in args.iter().enumerate() {
        if arg == Keyword::Eval.as_str() {
            parts.push(evaluate(vm, &args[i + 1..])?.to_string());
            break;
        }
        if arg.starts_with('"') {
            parts.push(unquote(arg));
            continue;
        }
        match vm.env.get(arg) {
            Some(value) => parts.push(value.to_string()),
            None => return Err(RuntimeError::Missing(arg.clone())),
        }
    }

    Ok(parts)
}
