//! Study configuration and noise schedules.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::Direction;
use crate::error::{Error, Result};
use crate::memory::{EliteMemory, TabuList};

/// How the perturbation noise scale moves from `initial_noise` to
/// `final_noise` over the trials of one `optimize` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NoiseSchedule {
    /// Straight-line interpolation: `σ_k = σ_0 + k (σ_f − σ_0) / (n − 1)`.
    #[default]
    Linear,

    /// Log-linear interpolation: `σ_k = σ_0 (σ_f / σ_0)^(k / (n − 1))`.
    ///
    /// Shrinks quickly at first, then slowly. Both endpoints must be positive.
    Geometric,
}

impl NoiseSchedule {
    /// Noise scale at `step` of a run of `total` steps.
    pub fn noise_at(self, initial: f64, last: f64, step: usize, total: usize) -> f64 {
        if total <= 1 {
            return initial;
        }
        let t = (step.min(total - 1)) as f64 / (total - 1) as f64;
        match self {
            NoiseSchedule::Linear => initial + (last - initial) * t,
            NoiseSchedule::Geometric => initial * (last / initial).powf(t),
        }
    }
}

/// Configuration of a [`SimulationStudyTabu`](super::SimulationStudyTabu).
///
/// # Examples
///
/// ```
/// use u_simopt::study::{Direction, NoiseSchedule, StudyConfig};
///
/// let config = StudyConfig::default()
///     .with_direction(Direction::Maximize)
///     .with_n_init_points(5)
///     .with_noise(0.5, 0.05)
///     .with_noise_schedule(NoiseSchedule::Geometric)
///     .with_n_replications(5)
///     .with_max_no_improve(Some(10))
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.n_init_points, 5);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StudyConfig {
    /// Minimize or maximize the mean objective.
    pub direction: Direction,
    /// Trials sampled purely at random before elite-guided search starts.
    pub n_init_points: usize,
    /// Noise scale (fraction of a variable's range) at the first trial.
    pub initial_noise: f64,
    /// Noise scale at the last trial.
    pub final_noise: f64,
    /// Interpolation between the two noise endpoints.
    pub noise_schedule: NoiseSchedule,
    /// Objective replications averaged per accepted candidate.
    pub n_replications: usize,
    /// Stop after this many consecutive non-improving iterations.
    pub max_no_improve: Option<usize>,
    /// Random seed (`None` draws one from the OS).
    pub seed: Option<u64>,
    /// Emit one INFO line per trial.
    pub verbose: bool,
    /// Fingerprints remembered by the tabu list.
    pub tabu_capacity: usize,
    /// Candidates kept in elite memory.
    pub elite_capacity: usize,
    /// Tabu candidates generated per iteration before one is forced through.
    pub max_candidate_attempts: usize,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            direction: Direction::Minimize,
            n_init_points: 10,
            initial_noise: 0.2,
            final_noise: 0.05,
            noise_schedule: NoiseSchedule::Linear,
            n_replications: 30,
            max_no_improve: Some(20),
            seed: None,
            verbose: true,
            tabu_capacity: TabuList::DEFAULT_CAPACITY,
            elite_capacity: EliteMemory::DEFAULT_CAPACITY,
            max_candidate_attempts: 10,
        }
    }
}

impl StudyConfig {
    /// Sets the optimization direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Sets the number of purely random initial trials.
    pub fn with_n_init_points(mut self, n: usize) -> Self {
        self.n_init_points = n;
        self
    }

    /// Sets both noise endpoints.
    pub fn with_noise(mut self, initial: f64, last: f64) -> Self {
        self.initial_noise = initial;
        self.final_noise = last;
        self
    }

    /// Sets how the noise scale moves between its endpoints.
    pub fn with_noise_schedule(mut self, schedule: NoiseSchedule) -> Self {
        self.noise_schedule = schedule;
        self
    }

    /// Sets the objective replications averaged per candidate.
    pub fn with_n_replications(mut self, n: usize) -> Self {
        self.n_replications = n;
        self
    }

    /// Sets the early-stop threshold; `None` runs the full budget.
    pub fn with_max_no_improve(mut self, n: Option<usize>) -> Self {
        self.max_no_improve = n;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables per-trial progress lines.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the number of fingerprints the tabu list remembers.
    pub fn with_tabu_capacity(mut self, n: usize) -> Self {
        self.tabu_capacity = n;
        self
    }

    /// Sets the number of candidates kept in elite memory.
    pub fn with_elite_capacity(mut self, n: usize) -> Self {
        self.elite_capacity = n;
        self
    }

    /// Sets the proposals per iteration before a tabu candidate is forced through.
    pub fn with_max_candidate_attempts(mut self, n: usize) -> Self {
        self.max_candidate_attempts = n;
        self
    }

    /// Noise scale at `step` of a run of `total` trials.
    pub fn noise_at(&self, step: usize, total: usize) -> f64 {
        self.noise_schedule
            .noise_at(self.initial_noise, self.final_noise, step, total)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(Error::Configuration(msg));
        if self.n_replications == 0 {
            return fail("n_replications must be positive".into());
        }
        for (label, v) in [
            ("initial_noise", self.initial_noise),
            ("final_noise", self.final_noise),
        ] {
            if !v.is_finite() || v < 0.0 {
                return fail(format!("{label} must be finite and non-negative, got {v}"));
            }
        }
        if self.noise_schedule == NoiseSchedule::Geometric
            && (self.initial_noise <= 0.0 || self.final_noise <= 0.0)
        {
            return fail("geometric noise schedule requires positive endpoints".into());
        }
        if self.elite_capacity == 0 {
            return fail("elite_capacity must be positive".into());
        }
        if self.tabu_capacity == 0 {
            return fail("tabu_capacity must be positive".into());
        }
        if self.max_candidate_attempts == 0 {
            return fail("max_candidate_attempts must be positive".into());
        }
        if self.max_no_improve == Some(0) {
            return fail("max_no_improve must be positive when set".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StudyConfig::default();
        assert_eq!(config.direction, Direction::Minimize);
        assert_eq!(config.n_init_points, 10);
        assert!((config.initial_noise - 0.2).abs() < 1e-12);
        assert!((config.final_noise - 0.05).abs() < 1e-12);
        assert_eq!(config.n_replications, 30);
        assert_eq!(config.max_no_improve, Some(20));
        assert_eq!(config.tabu_capacity, 20);
        assert_eq!(config.elite_capacity, 10);
        assert_eq!(config.max_candidate_attempts, 10);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            StudyConfig::default().with_n_replications(0),
            StudyConfig::default().with_noise(-0.1, 0.05),
            StudyConfig::default().with_noise(0.2, f64::NAN),
            StudyConfig::default()
                .with_noise(0.2, 0.0)
                .with_noise_schedule(NoiseSchedule::Geometric),
            StudyConfig::default().with_elite_capacity(0),
            StudyConfig::default().with_tabu_capacity(0),
            StudyConfig::default().with_max_candidate_attempts(0),
            StudyConfig::default().with_max_no_improve(Some(0)),
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(Error::Configuration(_))),
                "expected rejection: {config:?}"
            );
        }
        assert!(StudyConfig::default()
            .with_max_no_improve(None)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_linear_schedule_endpoints() {
        let s = NoiseSchedule::Linear;
        assert!((s.noise_at(0.2, 0.05, 0, 11) - 0.2).abs() < 1e-12);
        assert!((s.noise_at(0.2, 0.05, 5, 11) - 0.125).abs() < 1e-12);
        assert!((s.noise_at(0.2, 0.05, 10, 11) - 0.05).abs() < 1e-12);
        assert!((s.noise_at(0.2, 0.05, 50, 11) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_geometric_schedule_is_log_linear() {
        let s = NoiseSchedule::Geometric;
        let mid = s.noise_at(0.4, 0.1, 1, 3);
        assert!((mid - 0.2).abs() < 1e-12);
        assert!((s.noise_at(0.4, 0.1, 2, 3) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_single_trial_uses_initial_noise() {
        assert_eq!(NoiseSchedule::Linear.noise_at(0.3, 0.1, 0, 1), 0.3);
    }
}
