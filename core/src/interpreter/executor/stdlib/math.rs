//! Arithmetic evaluator behind `eval`
//!
//! The engine never does arithmetic itself: it substitutes variable values into
//! the expression text and hands the resulting string to an
//! [`ExpressionEvaluator`]. [`MathEvaluator`] is the implementation shipped with
//! the crate, a PEST grammar driven through a Pratt parser.

use std::f64::consts;
use std::sync::OnceLock;

use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

/* ===================== Evaluator Boundary ===================== */

/// Evaluates a fully substituted arithmetic expression
pub trait ExpressionEvaluator {
    fn evaluate(&self, expression: &str) -> Result<f64, MathError>;
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MathError {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("unknown constant '{0}'")]
    UnknownConstant(String),
    #[error("{name} expects {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}

/* ===================== Reserved Tokens ===================== */

pub const OPERATORS: &[&str] = &["+", "-", "*", "/", "^", "%", "×", "·", "±"];

pub const CONSTANTS: &[&str] = &["E", "Euler", "LN2", "LN10", "LOG2E", "LOG10E", "PHI", "PI"];

pub const FUNCTIONS: &[&str] = &[
    "abs", "acos", "asin", "atan", "cbrt", "ceil", "cos", "cosh", "exp", "expm1", "floor", "log",
    "log10", "log1p", "max", "min", "random", "round", "roundHE", "signum", "sin", "sinh", "sqrt",
    "tan", "tanh", "toDegrees", "toRadians", "ulp",
];

/// Operators, constants and function names of the arithmetic sublanguage
pub fn is_reserved_token(token: &str) -> bool {
    OPERATORS.contains(&token) || CONSTANTS.contains(&token) || FUNCTIONS.contains(&token)
}

/* ===================== PEST Parser ===================== */

#[derive(Parser)]
#[grammar = "interpreter/executor/stdlib/math.pest"]
struct MathParser;

fn pratt() -> &'static PrattParser<Rule> {
    static PRATT: OnceLock<PrattParser<Rule>> = OnceLock::new();
    PRATT.get_or_init(|| {
        // Lowest precedence first; `^` binds tighter than unary minus
        PrattParser::new()
            .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::subtract, Assoc::Left))
            .op(Op::infix(Rule::multiply, Assoc::Left)
                | Op::infix(Rule::divide, Assoc::Left)
                | Op::infix(Rule::modulo, Assoc::Left))
            .op(Op::prefix(Rule::neg) | Op::prefix(Rule::pos))
            .op(Op::infix(Rule::power, Assoc::Right))
    })
}

/* ===================== Math Evaluator ===================== */

#[derive(Debug, Default, Clone, Copy)]
pub struct MathEvaluator;

impl ExpressionEvaluator for MathEvaluator {
    fn evaluate(&self, expression: &str) -> Result<f64, MathError> {
        let mut pairs = MathParser::parse(Rule::expression, expression)
            .map_err(|e| MathError::Syntax(e.to_string()))?;

        // expression = { SOI ~ expr ~ EOI }
        let expr = pairs
            .next()
            .and_then(|expression| expression.into_inner().next())
            .ok_or_else(|| MathError::Syntax("empty expression".to_string()))?;

        eval_expr(expr.into_inner())
    }
}

fn eval_expr(pairs: Pairs<Rule>) -> Result<f64, MathError> {
    pratt()
        .map_primary(eval_primary)
        .map_prefix(|op, rhs| {
            let rhs = rhs?;
            Ok(match op.as_rule() {
                Rule::neg => -rhs,
                _ => rhs,
            })
        })
        .map_infix(|lhs, op, rhs| {
            let (lhs, rhs) = (lhs?, rhs?);
            Ok(match op.as_rule() {
                Rule::add => lhs + rhs,
                Rule::subtract => lhs - rhs,
                Rule::multiply => lhs * rhs,
                Rule::divide => lhs / rhs,
                Rule::modulo => lhs % rhs,
                _ => lhs.powf(rhs),
            })
        })
        .parse(pairs)
}

fn eval_primary(primary: Pair<Rule>) -> Result<f64, MathError> {
    match primary.as_rule() {
        Rule::number => primary
            .as_str()
            .parse::<f64>()
            .map_err(|_| MathError::InvalidNumber(primary.as_str().to_string())),
        Rule::constant => constant(primary.as_str()),
        Rule::expr => eval_expr(primary.into_inner()),
        Rule::call => {
            let mut inner = primary.into_inner();
            let name = inner.next().map(|p| p.as_str()).unwrap_or_default().to_string();
            let args = match inner.next() {
                Some(arguments) => arguments
                    .into_inner()
                    .map(|arg| eval_expr(arg.into_inner()))
                    .collect::<Result<Vec<f64>, MathError>>()?,
                None => Vec::new(),
            };
            call(&name, &args)
        }
        rule => Err(MathError::Syntax(format!("unexpected {:?}", rule))),
    }
}

/* ===================== Constants & Functions ===================== */

const EULER_MASCHERONI: f64 = 0.577_215_664_901_532_9;
const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

fn constant(name: &str) -> Result<f64, MathError> {
    let value = match name {
        "E" => consts::E,
        "Euler" => EULER_MASCHERONI,
        "LN2" => consts::LN_2,
        "LN10" => consts::LN_10,
        "LOG2E" => consts::LOG2_E,
        "LOG10E" => consts::LOG10_E,
        "PHI" => GOLDEN_RATIO,
        "PI" => consts::PI,
        _ => return Err(MathError::UnknownConstant(name.to_string())),
    };
    Ok(value)
}

fn call(name: &str, args: &[f64]) -> Result<f64, MathError> {
    let arity = |expected: usize| {
        if args.len() == expected {
            Ok(())
        } else {
            Err(MathError::Arity {
                name: name.to_string(),
                expected,
                found: args.len(),
            })
        }
    };

    match name {
        "random" => {
            arity(0)?;
            return Ok(rand::random::<f64>());
        }
        "max" | "min" => {
            arity(2)?;
            let (a, b) = (args[0], args[1]);
            return Ok(if name == "max" { a.max(b) } else { a.min(b) });
        }
        _ => {}
    }

    let unary: fn(f64) -> f64 = match name {
        "abs" => f64::abs,
        "acos" => f64::acos,
        "asin" => f64::asin,
        "atan" => f64::atan,
        "cbrt" => f64::cbrt,
        "ceil" => f64::ceil,
        "cos" => f64::cos,
        "cosh" => f64::cosh,
        "exp" => f64::exp,
        "expm1" => f64::exp_m1,
        "floor" => f64::floor,
        "log" => f64::ln,
        "log10" => f64::log10,
        "log1p" => f64::ln_1p,
        "round" => round_half_up,
        "roundHE" => round_half_even,
        "signum" => signum,
        "sin" => f64::sin,
        "sinh" => f64::sinh,
        "sqrt" => f64::sqrt,
        "tan" => f64::tan,
        "tanh" => f64::tanh,
        "toDegrees" => f64::to_degrees,
        "toRadians" => f64::to_radians,
        "ulp" => ulp,
        _ => return Err(MathError::UnknownFunction(name.to_string())),
    };
    arity(1)?;
    Ok(unary(args[0]))
}

fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

fn round_half_even(x: f64) -> f64 {
    if (x - x.trunc()).abs() == 0.5 {
        2.0 * (x / 2.0).round()
    } else {
        x.round()
    }
}

/// Zero stays zero, unlike `f64::signum`
fn signum(x: f64) -> f64 {
    if x == 0.0 || x.is_nan() {
        x
    } else {
        x.signum()
    }
}

/// Distance from `x` to the next larger representable magnitude
fn ulp(x: f64) -> f64 {
    let x = x.abs();
    if !x.is_finite() {
        return x;
    }
    f64::from_bits(x.to_bits() + 1) - x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expression: &str) -> f64 {
        MathEvaluator
            .evaluate(expression)
            .unwrap_or_else(|e| panic!("'{expression}' failed: {e}"))
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("1 + 2 * 3"), 7.0);
        assert_eq!(eval("(1 + 2) * 3"), 9.0);
        assert_eq!(eval("10 - 4 - 3"), 3.0);
        assert_eq!(eval("2 ^ 3 ^ 2"), 512.0);
        assert_eq!(eval("-2 ^ 2"), -4.0);
    }

    #[test]
    fn test_alternative_operator_glyphs() {
        assert_eq!(eval("3 × 4"), 12.0);
        assert_eq!(eval("3 · 4"), 12.0);
    }

    #[test]
    fn test_unary_and_numbers() {
        assert_eq!(eval("5 - -1"), 6.0);
        assert_eq!(eval("+2.5"), 2.5);
        assert_eq!(eval(".5 * 4"), 2.0);
        assert_eq!(eval("1e3"), 1000.0);
    }

    #[test]
    fn test_modulo_and_division() {
        assert_eq!(eval("7 % 3"), 1.0);
        assert_eq!(eval("-7 % 3"), -1.0);
        assert_eq!(eval("1 / 2"), 0.5);
        assert!(eval("1 / 0").is_infinite());
    }

    #[test]
    fn test_constants_and_functions() {
        assert_eq!(eval("PI"), consts::PI);
        assert_eq!(eval("max(2, 9)"), 9.0);
        assert_eq!(eval("min(2, 9)"), 2.0);
        assert_eq!(eval("sqrt(16) + abs(-1)"), 5.0);
        assert_eq!(eval("floor(2.7) + ceil(2.1)"), 5.0);
        assert_eq!(eval("signum(-3)"), -1.0);
        assert_eq!(eval("signum(0)"), 0.0);
    }

    #[test]
    fn test_rounding_modes() {
        assert_eq!(eval("round(2.5)"), 3.0);
        assert_eq!(eval("round(-2.5)"), -2.0);
        assert_eq!(eval("roundHE(2.5)"), 2.0);
        assert_eq!(eval("roundHE(3.5)"), 4.0);
        assert_eq!(eval("roundHE(2.6)"), 3.0);
    }

    #[test]
    fn test_random_in_unit_interval() {
        let r = eval("random()");
        assert!((0.0..1.0).contains(&r));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            MathEvaluator.evaluate("1 +"),
            Err(MathError::Syntax(_))
        ));
        assert!(matches!(
            MathEvaluator.evaluate("true + 1"),
            Err(MathError::UnknownConstant(name)) if name == "true"
        ));
        assert!(matches!(
            MathEvaluator.evaluate("frob(1)"),
            Err(MathError::UnknownFunction(_))
        ));
        assert!(matches!(
            MathEvaluator.evaluate("max(1)"),
            Err(MathError::Arity { expected: 2, found: 1, .. })
        ));
        assert!(MathEvaluator.evaluate("").is_err());
    }

    #[test]
    fn test_reserved_tokens() {
        assert!(is_reserved_token("roundHE"));
        assert!(is_reserved_token("×"));
        assert!(!is_reserved_token("x"));
    }
}
