//! Standard library
//!
//! The arithmetic sublanguage used by `eval` lives here, behind the
//! [`ExpressionEvaluator`] trait so the engine can be driven by another
//! evaluator.

pub mod math;

pub use math::{ExpressionEvaluator, MathError, MathEvaluator};
