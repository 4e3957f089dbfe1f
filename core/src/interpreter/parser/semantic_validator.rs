//! Naming rules for variables, functions and parameters
//!
//! Names are checked when they are bound, not when the program is parsed:
//! a variable name only becomes invalid at the moment something tries to
//! declare or write it.

use thiserror::Error;

use super::Keyword;
use crate::interpreter::executor::stdlib::math;

/* ===================== Error Types ===================== */

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Reserved keyword or arithmetic token used as a name
    #[error("'{name}' is a reserved word")]
    Reserved { name: String },
    /// Uppercase-initial names of two or more characters belong to functions
    #[error("'{name}' is reserved for function names")]
    FunctionNamespace { name: String },
    /// Function names must start with an uppercase letter
    #[error("function name '{name}' must start with a capital letter")]
    NotCapitalized { name: String },
    /// Empty names or names not starting with a letter or underscore
    #[error("'{name}' is not a valid identifier")]
    Malformed { name: String },
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/* ===================== Public API ===================== */

/// True for operation keywords and reserved arithmetic tokens
pub fn is_reserved(name: &str) -> bool {
    Keyword::parse(name).is_some() || math::is_reserved_token(name)
}

/// Validate a variable (or function parameter) name
pub fn validate_variable_name(name: &str) -> ValidationResult<()> {
    validate_identifier(name)?;

    let mut chars = name.chars();
    let starts_upper = chars.next().is_some_and(char::is_uppercase);
    if starts_upper && chars.next().is_some() {
        return Err(ValidationError::FunctionNamespace {
            name: name.to_string(),
        });
    }

    Ok(())
}

/// Validate a function name
pub fn validate_function_name(name: &str) -> ValidationResult<()> {
    if !name.chars().next().is_some_and(char::is_uppercase) {
        return Err(ValidationError::NotCapitalized {
            name: name.to_string(),
        });
    }
    validate_identifier(name)
}

fn validate_identifier(name: &str) -> ValidationResult<()> {
    let Some(first) = name.chars().next() else {
        return Err(ValidationError::Malformed {
            name: name.to_string(),
        });
    };

    if is_reserved(name) {
        return Err(ValidationError::Reserved {
            name: name.to_string(),
        });
    }

    let well_formed = (first.is_alphabetic() || first == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    if !well_formed {
        return Err(ValidationError::Malformed {
            name: name.to_string(),
        });
    }

    Ok(())
}
