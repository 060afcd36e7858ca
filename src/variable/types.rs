//! Variable kinds, domains and values.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::DeclarationError;

/// The kind of a decision variable, fixed by its first declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VariableKind {
    /// Continuous value in a closed interval.
    Real,
    /// Integer value in a closed interval.
    Integer,
    /// One label out of a finite list.
    Categorical,
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VariableKind::Real => "real",
            VariableKind::Integer => "integer",
            VariableKind::Categorical => "categorical",
        };
        f.write_str(s)
    }
}

/// The admissible values of a decision variable.
///
/// Only constructed through [`Domain::real`], [`Domain::integer`] and
/// [`Domain::categorical`], so every `Domain` is well formed: bounds are
/// finite with `low < high` and a finite span `high - low`, log-scale bounds
/// are positive, and category lists are non-empty without duplicates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Domain {
    /// Real interval `[low, high]`.
    Real {
        /// Lower bound.
        low: f64,
        /// Upper bound.
        high: f64,
        /// Sample uniformly in log space.
        log: bool,
    },
    /// Integer interval `[low, high]`.
    Integer {
        /// Lower bound.
        low: i64,
        /// Upper bound.
        high: i64,
        /// Sample uniformly in log space.
        log: bool,
    },
    /// Finite label set.
    Categorical(Vec<String>),
}

impl Domain {
    /// Validates and builds a real domain.
    pub fn real(name: &str, low: f64, high: f64, log: bool) -> Result<Self, DeclarationError> {
        check_name(name)?;
        if !low.is_finite() || !high.is_finite() || low >= high || !(high - low).is_finite() {
            return Err(DeclarationError::InvalidBounds {
                name: name.into(),
                low,
                high,
            });
        }
        if log && low <= 0.0 {
            return Err(DeclarationError::InvalidLogBounds { name: name.into() });
        }
        Ok(Domain::Real { low, high, log })
    }

    /// Validates and builds an integer domain.
    pub fn integer(name: &str, low: i64, high: i64, log: bool) -> Result<Self, DeclarationError> {
        check_name(name)?;
        if low >= high {
            return Err(DeclarationError::InvalidBounds {
                name: name.into(),
                low: low as f64,
                high: high as f64,
            });
        }
        if log && low <= 0 {
            return Err(DeclarationError::InvalidLogBounds { name: name.into() });
        }
        Ok(Domain::Integer { low, high, log })
    }

    /// Validates and builds a categorical domain.
    pub fn categorical<S: AsRef<str>>(
        name: &str,
        categories: &[S],
    ) -> Result<Self, DeclarationError> {
        check_name(name)?;
        if categories.is_empty() {
            return Err(DeclarationError::EmptyCategories { name: name.into() });
        }
        let mut seen = HashSet::with_capacity(categories.len());
        for label in categories {
            let label = label.as_ref();
            if !seen.insert(label) {
                return Err(DeclarationError::DuplicateCategory {
                    name: name.into(),
                    label: label.into(),
                });
            }
        }
        Ok(Domain::Categorical(
            categories.iter().map(|c| c.as_ref().to_owned()).collect(),
        ))
    }

    /// The variable kind this domain declares.
    pub fn kind(&self) -> VariableKind {
        match self {
            Domain::Real { .. } => VariableKind::Real,
            Domain::Integer { .. } => VariableKind::Integer,
            Domain::Categorical(_) => VariableKind::Categorical,
        }
    }

    /// Numeric bounds as `(low, high, log)`, `None` for categorical domains.
    pub fn numeric_bounds(&self) -> Option<(f64, f64, bool)> {
        match *self {
            Domain::Real { low, high, log } => Some((low, high, log)),
            Domain::Integer { low, high, log } => Some((low as f64, high as f64, log)),
            Domain::Categorical(_) => None,
        }
    }

    /// Labels of a categorical domain.
    pub fn categories(&self) -> Option<&[String]> {
        match self {
            Domain::Categorical(c) => Some(c),
            _ => None,
        }
    }

    /// Whether `value` has this domain's kind and lies inside it.
    pub fn contains(&self, value: &ParamValue) -> bool {
        match (self, value) {
            (Domain::Real { low, high, .. }, ParamValue::Real(v)) => *low <= *v && *v <= *high,
            (Domain::Integer { low, high, .. }, ParamValue::Integer(v)) => low <= v && v <= high,
            (Domain::Categorical(c), ParamValue::Categorical(v)) => c.contains(v),
            _ => false,
        }
    }
}

fn check_name(name: &str) -> Result<(), DeclarationError> {
    if name.is_empty() {
        return Err(DeclarationError::EmptyName);
    }
    Ok(())
}

/// A concrete value assigned to a decision variable.
///
/// Equality and hashing compare reals bitwise, so values can be used as
/// fingerprint components.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParamValue {
    /// Real value.
    Real(f64),
    /// Integer value.
    Integer(i64),
    /// Category label.
    Categorical(String),
}

impl ParamValue {
    /// The kind of variable this value belongs to.
    pub fn kind(&self) -> VariableKind {
        match self {
            ParamValue::Real(_) => VariableKind::Real,
            ParamValue::Integer(_) => VariableKind::Integer,
            ParamValue::Categorical(_) => VariableKind::Categorical,
        }
    }

    /// Numeric view of the value (`None` for labels).
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            ParamValue::Real(v) => Some(v),
            ParamValue::Integer(v) => Some(v as f64),
            ParamValue::Categorical(_) => None,
        }
    }

    /// The label of a categorical value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Categorical(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParamValue::Real(a), ParamValue::Real(b)) => a.to_bits() == b.to_bits(),
            (ParamValue::Integer(a), ParamValue::Integer(b)) => a == b,
            (ParamValue::Categorical(a), ParamValue::Categorical(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ParamValue {}

impl Hash for ParamValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            ParamValue::Real(v) => v.to_bits().hash(state),
            ParamValue::Integer(v) => v.hash(state),
            ParamValue::Categorical(s) => s.hash(state),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Real(v) => write!(f, "{v:.3}"),
            ParamValue::Integer(v) => write!(f, "{v}"),
            ParamValue::Categorical(s) => f.write_str(s),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Real(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Integer(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Categorical(v.to_owned())
    }
}
