//! Trial-by-trial progress reporting through `tracing`.

use std::fmt;

use crate::memory::Candidate;

/// One reported trial. `Display` renders the progress line.
///
/// # Examples
///
/// ```
/// use u_simopt::memory::Candidate;
/// use u_simopt::study::TrialReport;
/// use u_simopt::variable::ParamValue;
///
/// let mut values = Candidate::new();
/// values.insert("mu".into(), ParamValue::Real(2.0));
/// let report = TrialReport {
///     trial: 3,
///     values: &values,
///     mean: 1.5,
///     std: 0.25,
///     best_trial: 2,
///     best_value: 1.25,
/// };
/// assert_eq!(
///     report.to_string(),
///     "Trial 3: Obj=1.5000 (std=0.2500); Vars: {mu: 2.000}; Best: trial 2 (1.2500)."
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TrialReport<'a> {
    /// One-based trial number.
    pub trial: usize,
    /// Evaluated candidate.
    pub values: &'a Candidate,
    /// Mean objective.
    pub mean: f64,
    /// Standard deviation of the replications.
    pub std: f64,
    /// One-based number of the best trial so far.
    pub best_trial: usize,
    /// Best mean objective so far.
    pub best_value: f64,
}

impl fmt::Display for TrialReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Trial {}: Obj={:.4} (std={:.4}); Vars: {{", self.trial, self.mean, self.std)?;
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}; Best: trial {} ({:.4}).", self.best_trial, self.best_value)
    }
}

/// Emits progress lines as INFO events when enabled. Never feeds back into
/// the search.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    enabled: bool,
}

impl Reporter {
    /// Creates a reporter; a disabled one emits nothing.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Whether progress lines are emitted.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Announces the start of a run of `n_trials` trials.
    pub fn start(&self, n_trials: usize) {
        if self.enabled {
            tracing::info!(n_trials, "Optimization started with {n_trials} trials.");
        }
    }

    /// Emits the progress line of one accepted iteration.
    pub fn trial(&self, report: &TrialReport<'_>) {
        if self.enabled {
            tracing::info!(
                trial = report.trial,
                mean = report.mean,
                std = report.std,
                "{report}"
            );
        }
    }

    /// Announces an early stop after `max_no_improve` non-improving trials.
    pub fn early_stop(&self, max_no_improve: usize) {
        if self.enabled {
            tracing::info!(
                max_no_improve,
                "Stopping optimization: No improvement for {max_no_improve} trials."
            );
        }
    }
}
