//! Trials: one proposed assignment of values to all decision variables.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use crate::error::{DeclarationError, Result};
use crate::memory::Candidate;
use crate::variable::{Domain, ParamValue};

/// The engine capability a [`Trial`] pulls values from.
///
/// Implemented by the study's suggestion policy; objectives never see it.
pub(crate) trait Suggest {
    /// Registers `name` under `domain`, failing on a kind mismatch.
    fn declare(&mut self, name: &str, domain: &Domain) -> Result<()>;

    /// Chooses a value for `name` inside `domain` for trial `trial_id`.
    fn sample(&mut self, trial_id: usize, name: &str, domain: &Domain) -> ParamValue;
}

pub(crate) type SharedSuggest = Rc<RefCell<dyn Suggest>>;

/// A single candidate evaluated by the objective function.
///
/// The objective asks the trial for each decision variable it needs through
/// [`suggest_real`](Self::suggest_real), [`suggest_integer`](Self::suggest_integer)
/// and [`suggest_categorical`](Self::suggest_categorical). The first request
/// for a name inside a trial is answered by the study's suggestion policy;
/// later requests for the same name return the value already assigned, unless
/// the request narrows the domain so that value falls outside it, in which
/// case a fresh value is drawn and replaces it. When
/// the study replicates an accepted candidate, the trial arrives pre-filled
/// and every request returns the candidate's value.
///
/// # Examples
///
/// ```
/// use u_simopt::prelude::*;
///
/// let mut study = SimulationStudyTabu::new(
///     StudyConfig::default().with_seed(7).with_n_replications(2).with_verbose(false),
/// )
/// .unwrap();
///
/// study
///     .optimize(
///         |trial: &mut Trial| {
///             let x = trial.suggest_real("x", -1.0, 1.0, false)?;
///             let n = trial.suggest_integer("n", 1, 4, false)?;
///             let rule = trial.suggest_categorical("rule", &["fifo", "lifo"])?;
///             let penalty = if rule == "fifo" { 0.0 } else { 0.5 };
///             Ok(x * x + n as f64 + penalty)
///         },
///         5,
///     )
///     .unwrap();
/// assert!(study.best_value().unwrap() >= 1.0);
/// ```
pub struct Trial {
    id: usize,
    variables: Candidate,
    validated: HashSet<String>,
    suggester: SharedSuggest,
}

impl Trial {
    pub(crate) fn new(id: usize, suggester: SharedSuggest) -> Self {
        Self::with_values(id, Candidate::new(), suggester)
    }

    pub(crate) fn with_values(id: usize, variables: Candidate, suggester: SharedSuggest) -> Self {
        Self {
            id,
            variables,
            validated: HashSet::new(),
            suggester,
        }
    }

    /// Ordinal position of the trial in the run.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Values assigned so far.
    pub fn values(&self) -> &Candidate {
        &self.variables
    }

    /// Value assigned to `name`, if any.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.variables.get(name)
    }

    /// Whether `name` passed validation at least once in this trial.
    pub fn is_validated(&self, name: &str) -> bool {
        self.validated.contains(name)
    }

    pub(crate) fn into_values(self) -> Candidate {
        self.variables
    }

    /// Suggests a real value in `[low, high]`.
    ///
    /// # Errors
    ///
    /// [`DeclarationError`](crate::DeclarationError) on an empty name,
    /// non-finite or inverted bounds, non-positive bounds under `log`, or when
    /// `name` was first declared with another kind.
    pub fn suggest_real(&mut self, name: &str, low: f64, high: f64, log: bool) -> Result<f64> {
        let domain = Domain::real(name, low, high, log)?;
        match self.resolve(name, &domain)? {
            ParamValue::Real(v) => Ok(v),
            other => Err(mismatch(name, &domain, &other)),
        }
    }

    /// Suggests an integer value in `[low, high]`.
    ///
    /// # Errors
    ///
    /// As for [`suggest_real`](Self::suggest_real).
    pub fn suggest_integer(&mut self, name: &str, low: i64, high: i64, log: bool) -> Result<i64> {
        let domain = Domain::integer(name, low, high, log)?;
        match self.resolve(name, &domain)? {
            ParamValue::Integer(v) => Ok(v),
            other => Err(mismatch(name, &domain, &other)),
        }
    }

    /// Suggests one label out of `categories`.
    ///
    /// # Errors
    ///
    /// [`DeclarationError`](crate::DeclarationError) on an empty name, an
    /// empty or duplicated category list, or a kind mismatch.
    pub fn suggest_categorical<S: AsRef<str>>(
        &mut self,
        name: &str,
        categories: &[S],
    ) -> Result<String> {
        let domain = Domain::categorical(name, categories)?;
        match self.resolve(name, &domain)? {
            ParamValue::Categorical(v) => Ok(v),
            other => Err(mismatch(name, &domain, &other)),
        }
    }

    fn resolve(&mut self, name: &str, domain: &Domain) -> Result<ParamValue> {
        self.validated.insert(name.to_owned());
        let mut suggester = self.suggester.borrow_mut();
        suggester.declare(name, domain)?;
        if let Some(value) = self.variables.get(name) {
            if domain.contains(value) {
                return Ok(value.clone());
            }
            tracing::debug!(
                trial = self.id,
                name,
                "held value outside redeclared domain, resampling"
            );
        }
        let value = suggester.sample(self.id, name, domain);
        self.variables.insert(name.to_owned(), value.clone());
        Ok(value)
    }
}

fn mismatch(name: &str, domain: &Domain, value: &ParamValue) -> crate::Error {
    DeclarationError::KindMismatch {
        name: name.to_owned(),
        declared: value.kind(),
        requested: domain.kind(),
    }
    .into()
}

impl fmt::Debug for Trial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trial")
            .field("id", &self.id)
            .field("variables", &self.variables)
            .field("validated", &self.validated)
            .finish()
    }
}
