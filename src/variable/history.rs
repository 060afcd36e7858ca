//! A decision variable and its per-trial audit trail.

use super::indexer::CategoryIndexer;
use super::types::{Domain, ParamValue, VariableKind};
use crate::error::{DeclarationError, Error, Result};

/// Per-trial record of assigned values.
#[derive(Debug, Clone)]
enum History {
    /// One slot per trial, NaN until assigned.
    Numeric(Vec<f64>),
    /// One row per trial holding the category index, `None` until assigned.
    Categorical(Vec<Option<usize>>),
}

impl History {
    fn len(&self) -> usize {
        match self {
            History::Numeric(v) => v.len(),
            History::Categorical(v) => v.len(),
        }
    }

    fn grow(&mut self, additional: usize) {
        match self {
            History::Numeric(v) => v.resize(v.len() + additional, f64::NAN),
            History::Categorical(v) => v.resize(v.len() + additional, None),
        }
    }
}

/// One decision dimension of the search space.
///
/// The first declaration fixes the [`VariableKind`]; later declarations may
/// refresh the bounds or extend the category list but never change the kind.
/// The history is an audit trail only: it records which value the variable
/// took in each accepted trial.
///
/// # Examples
///
/// ```
/// use u_simopt::variable::{Domain, ParamValue, Variable};
///
/// let mut var = Variable::new("mu");
/// var.set_values(3, &Domain::real("mu", 0.1, 10.0, false).unwrap()).unwrap();
/// var.record(1, &ParamValue::Real(2.5)).unwrap();
///
/// let history = var.numeric_history().unwrap();
/// assert!(history[0].is_nan());
/// assert_eq!(history[1], 2.5);
/// ```
#[derive(Debug, Clone)]
pub struct Variable {
    name: String,
    domain: Option<Domain>,
    history: Option<History>,
    indexer: CategoryIndexer,
}

impl Variable {
    /// Creates an undeclared variable without value storage.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: None,
            history: None,
            indexer: CategoryIndexer::new(),
        }
    }

    /// Variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind fixed by the first declaration.
    pub fn kind(&self) -> Option<VariableKind> {
        self.domain.as_ref().map(Domain::kind)
    }

    /// Most recently declared domain.
    pub fn domain(&self) -> Option<&Domain> {
        self.domain.as_ref()
    }

    /// Label ↔ index mapping of a categorical variable.
    pub fn indexer(&self) -> &CategoryIndexer {
        &self.indexer
    }

    /// Declares (or re-declares) the variable under `domain`.
    ///
    /// # Errors
    ///
    /// [`DeclarationError::KindMismatch`] if the variable was first declared
    /// with a different kind.
    pub fn declare(&mut self, domain: &Domain) -> Result<()> {
        if let Some(declared) = self.kind() {
            let requested = domain.kind();
            if declared != requested {
                return Err(DeclarationError::KindMismatch {
                    name: self.name.clone(),
                    declared,
                    requested,
                }
                .into());
            }
        }
        if let Domain::Categorical(labels) = domain {
            self.indexer.get_indices(labels);
        }
        self.domain = Some(domain.clone());
        Ok(())
    }

    /// Declares the variable and allocates `max_iter` unset history slots.
    ///
    /// Already recorded slots survive a re-allocation; the history only ever
    /// grows.
    ///
    /// # Errors
    ///
    /// Kind mismatch as in [`declare`](Self::declare), or
    /// [`Error::Configuration`] when `max_iter` is zero.
    pub fn set_values(&mut self, max_iter: usize, domain: &Domain) -> Result<()> {
        if max_iter == 0 {
            return Err(Error::Configuration(format!(
                "variable '{}': history length must be positive",
                self.name
            )));
        }
        self.declare(domain)?;
        let history = self.history.get_or_insert_with(|| match domain {
            Domain::Categorical(_) => History::Categorical(vec![None; max_iter]),
            _ => History::Numeric(vec![f64::NAN; max_iter]),
        });
        let len = history.len();
        if max_iter > len {
            history.grow(max_iter - len);
        }
        Ok(())
    }

    /// Appends `additional` unset slots to the history.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] when `additional` is zero,
    /// [`Error::Uninitialized`] when no storage was allocated.
    pub fn add_iter(&mut self, additional: usize) -> Result<()> {
        if additional == 0 {
            return Err(Error::Configuration(format!(
                "variable '{}': additional iterations must be positive",
                self.name
            )));
        }
        let history = self.history.as_mut().ok_or_else(|| Error::Uninitialized {
            name: self.name.clone(),
        })?;
        history.grow(additional);
        Ok(())
    }

    /// Writes `value` into slot `iteration`, growing the history if needed.
    pub fn record(&mut self, iteration: usize, value: &ParamValue) -> Result<()> {
        let declared = self.kind();
        let name = &self.name;
        let history = self.history.as_mut().ok_or_else(|| Error::Uninitialized {
            name: name.clone(),
        })?;
        if iteration >= history.len() {
            history.grow(iteration + 1 - history.len());
        }
        match (history, value) {
            (History::Numeric(slots), ParamValue::Real(_) | ParamValue::Integer(_))
                if declared == Some(value.kind()) =>
            {
                slots[iteration] = value.as_f64().unwrap_or(f64::NAN);
            }
            (History::Categorical(rows), ParamValue::Categorical(label)) => {
                rows[iteration] = Some(self.indexer.intern(label));
            }
            _ => {
                return Err(DeclarationError::KindMismatch {
                    name: name.clone(),
                    declared: declared.unwrap_or(VariableKind::Real),
                    requested: value.kind(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Number of history slots, `None` before allocation.
    pub fn history_len(&self) -> Option<usize> {
        self.history.as_ref().map(History::len)
    }

    /// Numeric audit trail (NaN marks unassigned trials).
    pub fn numeric_history(&self) -> Option<&[f64]> {
        match &self.history {
            Some(History::Numeric(v)) => Some(v),
            _ => None,
        }
    }

    /// One-hot row of a categorical variable for `iteration`.
    ///
    /// The row is as wide as the number of labels seen so far; an unassigned
    /// trial yields an all-zero row.
    pub fn one_hot(&self, iteration: usize) -> Option<Vec<f64>> {
        let Some(History::Categorical(rows)) = &self.history else {
            return None;
        };
        let slot = rows.get(iteration)?;
        let mut row = vec![0.0; self.indexer.len()];
        if let Some(idx) = *slot {
            row[idx] = 1.0;
        }
        Some(row)
    }

    /// Category label recorded for `iteration`.
    pub fn category_at(&self, iteration: usize) -> Option<&str> {
        match &self.history {
            Some(History::Categorical(rows)) => rows
                .get(iteration)
                .copied()
                .flatten()
                .and_then(|idx| self.indexer.label(idx)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn real(low: f64, high: f64) -> Domain {
        Domain::real("x", low, high, false).unwrap()
    }

    #[test]
    fn test_first_declaration_fixes_kind() {
        let mut var = Variable::new("x");
        assert_eq!(var.kind(), None);
        var.declare(&real(0.0, 1.0)).unwrap();
        assert_eq!(var.kind(), Some(VariableKind::Real));

        let err = var
            .declare(&Domain::categorical("x", &["a"]).unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Declaration(DeclarationError::KindMismatch {
                declared: VariableKind::Real,
                requested: VariableKind::Categorical,
                ..
            })
        ));
    }

    #[test]
    fn test_redeclaration_refreshes_bounds() {
        let mut var = Variable::new("x");
        var.declare(&real(0.0, 1.0)).unwrap();
        var.declare(&real(-2.0, 2.0)).unwrap();
        assert_eq!(var.domain().unwrap().numeric_bounds(), Some((-2.0, 2.0, false)));
    }

    #[test]
    fn test_set_values_allocates_unset_slots() {
        let mut var = Variable::new("x");
        var.set_values(4, &real(0.0, 1.0)).unwrap();
        let h = var.numeric_history().unwrap();
        assert_eq!(h.len(), 4);
        assert!(h.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_set_values_zero_length_rejected() {
        let mut var = Variable::new("x");
        assert!(matches!(
            var.set_values(0, &real(0.0, 1.0)),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_add_iter_errors() {
        let mut var = Variable::new("x");
        assert!(matches!(var.add_iter(3), Err(Error::Uninitialized { .. })));
        var.set_values(2, &real(0.0, 1.0)).unwrap();
        assert!(matches!(var.add_iter(0), Err(Error::Configuration(_))));
        var.add_iter(3).unwrap();
        assert_eq!(var.history_len(), Some(5));
    }

    #[test]
    fn test_record_before_allocation_fails() {
        let mut var = Variable::new("x");
        var.declare(&real(0.0, 1.0)).unwrap();
        assert!(matches!(
            var.record(0, &ParamValue::Real(0.5)),
            Err(Error::Uninitialized { .. })
        ));
    }

    #[test]
    fn test_record_rejects_wrong_kind() {
        let mut var = Variable::new("n");
        var.set_values(2, &Domain::integer("n", 0, 5, false).unwrap())
            .unwrap();
        assert!(var.record(0, &ParamValue::Real(1.0)).is_err());
        var.record(0, &ParamValue::Integer(3)).unwrap();
        assert_eq!(var.numeric_history().unwrap()[0], 3.0);
    }

    #[test]
    fn test_categorical_one_hot_rows() {
        let mut var = Variable::new("rule");
        let domain = Domain::categorical("rule", &["fifo", "lifo"]).unwrap();
        var.set_values(3, &domain).unwrap();
        var.record(0, &ParamValue::from("lifo")).unwrap();

        assert_eq!(var.one_hot(0), Some(vec![0.0, 1.0]));
        assert_eq!(var.one_hot(1), Some(vec![0.0, 0.0]));
        assert_eq!(var.category_at(0), Some("lifo"));

        // A wider category list widens the rows; old rows keep their index.
        var.set_values(3, &Domain::categorical("rule", &["sjf", "fifo"]).unwrap())
            .unwrap();
        assert_eq!(var.one_hot(0), Some(vec![0.0, 1.0, 0.0]));
        assert_eq!(var.indexer().index_of("sjf"), Some(2));
    }

    #[test]
    fn test_record_grows_history() {
        let mut var = Variable::new("x");
        var.set_values(1, &real(0.0, 1.0)).unwrap();
        var.record(3, &ParamValue::Real(0.25)).unwrap();
        assert_eq!(var.history_len(), Some(4));
        assert_eq!(var.numeric_history().unwrap()[3], 0.25);
    }
}
