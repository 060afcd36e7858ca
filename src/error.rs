//! Error types.

use crate::variable::VariableKind;

/// A malformed variable declaration.
///
/// Raised at the offending `suggest_*` call and never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeclarationError {
    /// The variable name was empty.
    #[error("variable name must be a non-empty string")]
    EmptyName,

    /// Bounds were not finite, `low >= high`, or the span overflowed.
    #[error("variable '{name}': lower bound ({low}) must be less than upper bound ({high})")]
    InvalidBounds {
        /// Variable name.
        name: String,
        /// Requested lower bound.
        low: f64,
        /// Requested upper bound.
        high: f64,
    },

    /// Log scale was requested with a non-positive bound.
    #[error("variable '{name}': log scale requires strictly positive bounds")]
    InvalidLogBounds {
        /// Variable name.
        name: String,
    },

    /// The category list was empty.
    #[error("variable '{name}': categories must contain at least one element")]
    EmptyCategories {
        /// Variable name.
        name: String,
    },

    /// The category list contained the same label twice.
    #[error("variable '{name}': duplicate category '{label}'")]
    DuplicateCategory {
        /// Variable name.
        name: String,
        /// The repeated label.
        label: String,
    },

    /// The variable was first declared with a different kind.
    #[error("variable '{name}' already declared as {declared}, not {requested}")]
    KindMismatch {
        /// Variable name.
        name: String,
        /// Kind fixed by the first declaration.
        declared: VariableKind,
        /// Kind requested by the failing call.
        requested: VariableKind,
    },
}

/// Errors surfaced by the optimizer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid run or storage configuration (zero trial budget, zero history
    /// growth, inconsistent [`StudyConfig`](crate::study::StudyConfig)).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A decision variable was declared incorrectly.
    #[error(transparent)]
    Declaration(#[from] DeclarationError),

    /// A variable's value storage was used before it was allocated.
    #[error("variable '{name}' has no allocated value storage")]
    Uninitialized {
        /// Variable name.
        name: String,
    },

    /// The objective function failed.
    #[error("objective failed: {0}")]
    Objective(String),
}

impl Error {
    /// Wraps any displayable error raised inside an objective function.
    pub fn objective(err: impl core::fmt::Display) -> Self {
        Error::Objective(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_converts_into_error() {
        let err: Error = DeclarationError::EmptyName.into();
        assert!(matches!(err, Error::Declaration(DeclarationError::EmptyName)));
        assert_eq!(err.to_string(), "variable name must be a non-empty string");
    }

    #[test]
    fn test_kind_mismatch_message() {
        let err = DeclarationError::KindMismatch {
            name: "x".into(),
            declared: VariableKind::Real,
            requested: VariableKind::Categorical,
        };
        assert_eq!(
            err.to_string(),
            "variable 'x' already declared as real, not categorical"
        );
    }

    #[test]
    fn test_objective_wraps_display() {
        let err = Error::objective("queue diverged");
        assert_eq!(err.to_string(), "objective failed: queue diverged");
    }
}
