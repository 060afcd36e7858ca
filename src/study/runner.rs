//! Search engine: the tabu-enhanced simulation optimization loop.
//!
//! # Algorithm
//!
//! Each iteration runs `PROPOSE → CHECK_TABU → (ASPIRATE | ACCEPT) →
//! EVALUATE → UPDATE_MEMORY → CHECK_STOP`:
//!
//! 1. **Propose.** During the first `n_init_points` trials, whenever elite
//!    memory is empty, or with probability 0.3, the objective is called on a
//!    fresh trial and the suggestion policy fills in every variable it asks
//!    for (diversification). Otherwise the best elite candidate is perturbed
//!    (intensification).
//! 2. **Check tabu / aspirate.** A candidate whose fingerprint is in the tabu
//!    list is evaluated once and accepted only if it strictly improves the
//!    best known value. Otherwise a new candidate is proposed, up to
//!    `max_candidate_attempts` times, after which the last one is forced
//!    through so the run always progresses.
//! 3. **Evaluate.** The objective runs `n_replications` times on the
//!    accepted candidate; the mean, standard deviation and wall-clock time
//!    are recorded.
//! 4. **Update memory.** The candidate enters the tabu list and elite memory;
//!    the best value and the no-improvement counter are updated.
//! 5. **Check stop.** The run ends early once the counter reaches
//!    `max_no_improve`.
//!
//! # Reference
//!
//! Glover, F. (1990). "Tabu Search, Part II", *ORSA Journal on Computing* 2(1), 4-32.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use super::config::StudyConfig;
use super::policy::Policy;
use super::report::{Reporter, TrialReport};
use super::types::{IterationRecord, Objective, StudyHistory};
use crate::error::{Error, Result};
use crate::memory::{Candidate, EliteMemory, Fingerprint, TabuList};
use crate::trial::{SharedSuggest, Trial};
use crate::variable::Variable;

/// Probability of a diversification restart once elite memory is populated.
const DIVERSIFICATION_PROBABILITY: f64 = 0.3;

/// Tabu-enhanced simulation optimizer.
///
/// Run state (memories, best value, counters, random stream) lives in the
/// instance and persists across [`optimize`](Self::optimize) calls; a fresh
/// run needs a new instance.
///
/// # Examples
///
/// ```
/// use u_simopt::prelude::*;
///
/// let config = StudyConfig::default()
///     .with_n_init_points(3)
///     .with_n_replications(1)
///     .with_seed(42)
///     .with_verbose(false);
/// let mut study = SimulationStudyTabu::new(config).unwrap();
///
/// study
///     .optimize(
///         |trial: &mut Trial| {
///             let x = trial.suggest_real("x", 0.0, 5.0, false)?;
///             Ok((x - 2.0).powi(2))
///         },
///         3,
///     )
///     .unwrap();
///
/// let best = study.best_params().unwrap();
/// let x = best["x"].as_f64().unwrap();
/// assert_eq!(study.best_value(), Some((x - 2.0).powi(2)));
/// ```
pub struct SimulationStudyTabu {
    config: StudyConfig,
    policy: Rc<RefCell<Policy>>,
    tabu: TabuList,
    elite: EliteMemory,
    best_value: f64,
    best_iteration: Option<usize>,
    trials_without_improvement: usize,
    history: StudyHistory,
    reporter: Reporter,
}

impl SimulationStudyTabu {
    /// Creates an engine.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if `config` fails validation.
    pub fn new(config: StudyConfig) -> Result<Self> {
        config.validate()?;
        let policy = Policy::new(config.seed, config.n_init_points, config.initial_noise);
        Ok(Self {
            policy: Rc::new(RefCell::new(policy)),
            tabu: TabuList::new(config.tabu_capacity),
            elite: EliteMemory::new(config.elite_capacity, config.direction),
            best_value: config.direction.worst(),
            best_iteration: None,
            trials_without_improvement: 0,
            history: StudyHistory::default(),
            reporter: Reporter::new(config.verbose),
            config,
        })
    }

    /// Runs up to `n_trials` iterations of the search with a closure objective.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] when `n_trials` is zero; any declaration or
    /// objective error raised while evaluating a trial aborts the run.
    pub fn optimize<F>(&mut self, mut objective: F, n_trials: usize) -> Result<()>
    where
        F: FnMut(&mut Trial) -> Result<f64>,
    {
        self.optimize_with(&mut objective, n_trials)
    }

    /// Runs up to `n_trials` iterations of the search with any [`Objective`].
    ///
    /// # Errors
    ///
    /// As for [`optimize`](Self::optimize).
    pub fn optimize_with<O>(&mut self, objective: &mut O, n_trials: usize) -> Result<()>
    where
        O: Objective + ?Sized,
    {
        if n_trials == 0 {
            return Err(Error::Configuration(
                "n_trials must be a positive integer".into(),
            ));
        }
        let _span = tracing::info_span!(
            "optimize",
            n_trials,
            direction = ?self.config.direction
        )
        .entered();

        self.policy.borrow_mut().reserve(n_trials)?;
        self.reporter.start(n_trials);

        let first = self.history.len();
        for step in 0..n_trials {
            let iteration = first + step;
            {
                let mut policy = self.policy.borrow_mut();
                policy.set_noise(self.config.noise_at(step, n_trials));
                policy.set_guide(self.elite.best().cloned());
            }

            let (candidate, attempts, forced) = self.select_candidate(objective, iteration)?;

            let started = Instant::now();
            let (candidate, mean, std) = self.replicate(objective, iteration, candidate)?;
            let elapsed = started.elapsed();

            if self.config.direction.improves(mean, self.best_value) {
                self.best_value = mean;
                self.best_iteration = Some(iteration);
                self.trials_without_improvement = 0;
            } else {
                self.trials_without_improvement += 1;
            }

            self.tabu.add(Fingerprint::of_candidate(&candidate));
            self.elite.add(candidate.clone(), mean);
            self.policy.borrow_mut().record(iteration, &candidate)?;

            let best_trial = self.best_iteration.map_or(0, |b| b + 1);
            self.reporter.trial(&TrialReport {
                trial: iteration + 1,
                values: &candidate,
                mean,
                std,
                best_trial,
                best_value: self.best_value,
            });

            self.history.push(IterationRecord {
                iteration,
                values: candidate,
                mean,
                std,
                elapsed,
                best_so_far: self.best_value,
                attempts,
                forced,
            });

            if let Some(limit) = self.config.max_no_improve {
                if self.trials_without_improvement >= limit {
                    self.reporter.early_stop(limit);
                    break;
                }
            }
        }
        Ok(())
    }

    /// Proposes candidates until one passes the tabu/aspiration check.
    ///
    /// Returns the candidate, the number of proposals made, and whether it
    /// was forced through after exhausting the attempt budget.
    fn select_candidate<O>(
        &mut self,
        objective: &mut O,
        iteration: usize,
    ) -> Result<(Candidate, usize, bool)>
    where
        O: Objective + ?Sized,
    {
        let mut attempts = 0;
        loop {
            let candidate = self.propose(objective, iteration)?;
            attempts += 1;
            if !self.tabu.contains(&Fingerprint::of_candidate(&candidate)) {
                return Ok((candidate, attempts, false));
            }

            let (candidate, score) = self.evaluate_once(objective, iteration, candidate)?;
            if self.config.direction.improves(score, self.best_value) {
                tracing::debug!(
                    iteration,
                    attempts,
                    score,
                    "tabu candidate accepted by aspiration"
                );
                return Ok((candidate, attempts, false));
            }
            if attempts >= self.config.max_candidate_attempts {
                tracing::debug!(
                    iteration,
                    attempts,
                    "attempt budget exhausted, forcing tabu candidate"
                );
                return Ok((candidate, attempts, true));
            }
            tracing::debug!(iteration, attempts, "tabu candidate rejected");
        }
    }

    fn propose<O>(&mut self, objective: &mut O, iteration: usize) -> Result<Candidate>
    where
        O: Objective + ?Sized,
    {
        let diversify = iteration < self.config.n_init_points
            || self.policy.borrow_mut().chance(DIVERSIFICATION_PROBABILITY);
        match self.elite.best() {
            Some(elite) if !diversify => Ok(self.policy.borrow_mut().perturb_candidate(elite)),
            _ => {
                let mut trial = Trial::new(iteration, self.suggester());
                objective.evaluate(&mut trial)?;
                Ok(trial.into_values())
            }
        }
    }

    fn evaluate_once<O>(
        &mut self,
        objective: &mut O,
        iteration: usize,
        candidate: Candidate,
    ) -> Result<(Candidate, f64)>
    where
        O: Objective + ?Sized,
    {
        let mut trial = Trial::with_values(iteration, candidate, self.suggester());
        let score = objective.evaluate(&mut trial)?;
        Ok((trial.into_values(), score))
    }

    /// Runs the replications of one candidate; returns the candidate (with
    /// any variables first requested during replication), mean and std.
    fn replicate<O>(
        &mut self,
        objective: &mut O,
        iteration: usize,
        mut candidate: Candidate,
    ) -> Result<(Candidate, f64, f64)>
    where
        O: Objective + ?Sized,
    {
        let mut scores = Vec::with_capacity(self.config.n_replications);
        for _ in 0..self.config.n_replications {
            let (next, score) = self.evaluate_once(objective, iteration, candidate)?;
            candidate = next;
            scores.push(score);
        }
        let (mean, std) = mean_std(&scores);
        Ok((candidate, mean, std))
    }

    fn suggester(&self) -> SharedSuggest {
        self.policy.clone()
    }

    /// Best mean objective found, `None` before any improving iteration.
    pub fn best_value(&self) -> Option<f64> {
        self.best_iteration.map(|_| self.best_value)
    }

    /// Trial id at which the best value was found.
    pub fn best_iteration(&self) -> Option<usize> {
        self.best_iteration
    }

    /// Best candidate held by elite memory.
    pub fn best_params(&self) -> Option<&Candidate> {
        self.elite.best()
    }

    /// Best candidates found so far, best first.
    pub fn elite_memory(&self) -> &EliteMemory {
        &self.elite
    }

    /// Fingerprints of the most recently accepted candidates.
    pub fn tabu_list(&self) -> &TabuList {
        &self.tabu
    }

    /// Per-iteration mean, std, timing and acceptance records.
    pub fn history(&self) -> &StudyHistory {
        &self.history
    }

    /// Number of completed iterations across all `optimize` calls.
    pub fn n_trials_run(&self) -> usize {
        self.history.len()
    }

    /// Consecutive iterations without a strict improvement.
    pub fn trials_without_improvement(&self) -> usize {
        self.trials_without_improvement
    }

    /// Noise scale used by the most recent iteration.
    pub fn current_noise(&self) -> f64 {
        self.policy.borrow().noise()
    }

    /// Snapshot of a declared variable and its audit trail.
    pub fn variable(&self, name: &str) -> Option<Variable> {
        self.policy.borrow().variable(name).cloned()
    }

    /// Names of all declared variables, sorted.
    pub fn variable_names(&self) -> Vec<String> {
        self.policy.borrow().variable_names()
    }

    /// Configuration the study was built with.
    pub fn config(&self) -> &StudyConfig {
        &self.config
    }
}

impl std::fmt::Debug for SimulationStudyTabu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationStudyTabu")
            .field("config", &self.config)
            .field("best_value", &self.best_value())
            .field("best_iteration", &self.best_iteration)
            .field("trials_without_improvement", &self.trials_without_improvement)
            .field("n_trials_run", &self.history.len())
            .finish()
    }
}

/// Sample mean and population standard deviation.
fn mean_std(samples: &[f64]) -> (f64, f64) {
    if samples.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeclarationError;
    use crate::study::Direction;
    use crate::variable::ParamValue;

    fn quiet() -> StudyConfig {
        StudyConfig::default().with_verbose(false).with_seed(42)
    }

    #[test]
    fn test_mean_std_population() {
        let (m, s) = mean_std(&[1.0, 3.0]);
        assert!((m - 2.0).abs() < 1e-12);
        assert!((s - 1.0).abs() < 1e-12);
        let (m, s) = mean_std(&[5.0]);
        assert_eq!((m, s), (5.0, 0.0));
    }

    #[test]
    fn test_zero_trials_rejected() {
        let mut study = SimulationStudyTabu::new(quiet()).unwrap();
        let err = study.optimize(|_: &mut Trial| Ok(0.0), 0).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(study.n_trials_run(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(SimulationStudyTabu::new(quiet().with_n_replications(0)).is_err());
    }

    #[test]
    fn test_exploration_only_quadratic() {
        let mut study = SimulationStudyTabu::new(
            quiet().with_n_init_points(3).with_n_replications(1),
        )
        .unwrap();
        let mut xs = Vec::new();
        study
            .optimize(
                |trial: &mut Trial| {
                    let x = trial.suggest_real("x", 0.0, 5.0, false)?;
                    xs.push(x);
                    Ok((x - 2.0).powi(2))
                },
                3,
            )
            .unwrap();

        assert_eq!(study.n_trials_run(), 3);
        let means = study.history().objective_values();
        let best = means.iter().cloned().fold(f64::INFINITY, f64::min);
        assert_eq!(study.best_value(), Some(best));
        let x = study.best_params().unwrap()["x"].as_f64().unwrap();
        assert_eq!((x - 2.0).powi(2), best);
        assert!(xs.iter().all(|x| (0.0..=5.0).contains(x)));
    }

    #[test]
    fn test_early_stop_on_constant_objective() {
        let mut study = SimulationStudyTabu::new(
            quiet().with_max_no_improve(Some(2)).with_n_replications(3),
        )
        .unwrap();
        study
            .optimize(
                |trial: &mut Trial| {
                    trial.suggest_real("x", 0.0, 1.0, false)?;
                    Ok(1.0)
                },
                100,
            )
            .unwrap();
        assert_eq!(study.n_trials_run(), 3);
        assert_eq!(study.trials_without_improvement(), 2);
        assert_eq!(study.best_iteration(), Some(0));
    }

    #[test]
    fn test_kind_change_is_fatal() {
        let mut study = SimulationStudyTabu::new(quiet().with_n_replications(1)).unwrap();
        let mut calls = 0;
        let err = study
            .optimize(
                |trial: &mut Trial| {
                    calls += 1;
                    if calls == 1 {
                        trial.suggest_real("x", 0.0, 1.0, false)?;
                    } else {
                        trial.suggest_categorical("x", &["a", "b"])?;
                    }
                    Ok(0.0)
                },
                5,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Declaration(DeclarationError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_objective_error_propagates() {
        let mut study = SimulationStudyTabu::new(quiet()).unwrap();
        let err = study
            .optimize(|_: &mut Trial| Err(Error::objective("boom")), 3)
            .unwrap_err();
        assert!(matches!(err, Error::Objective(ref m) if m == "boom"));
    }

    #[test]
    fn test_replications_share_candidate() {
        let mut study = SimulationStudyTabu::new(
            quiet().with_n_replications(4).with_max_no_improve(None),
        )
        .unwrap();
        let mut seen: Vec<(usize, f64)> = Vec::new();
        study
            .optimize(
                |trial: &mut Trial| {
                    let x = trial.suggest_real("x", -1.0, 1.0, false)?;
                    seen.push((trial.id(), x));
                    Ok(x)
                },
                12,
            )
            .unwrap();
        for record in study.history().records() {
            let x = record.values["x"].as_f64().unwrap();
            let reps = seen
                .iter()
                .filter(|(id, v)| *id == record.iteration && *v == x)
                .count();
            assert!(reps >= 4, "iteration {} replicated {reps} times", record.iteration);
            assert!(record.std < 1e-12);
        }
    }

    #[test]
    fn test_maximize_tracks_largest_mean() {
        let mut study = SimulationStudyTabu::new(
            quiet()
                .with_direction(Direction::Maximize)
                .with_n_init_points(5)
                .with_n_replications(2)
                .with_max_no_improve(None),
        )
        .unwrap();
        study
            .optimize(
                |trial: &mut Trial| {
                    let x = trial.suggest_real("x", 0.0, 10.0, false)?;
                    Ok(-(x - 7.0).powi(2))
                },
                40,
            )
            .unwrap();
        let means = study.history().objective_values();
        let max = means.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(study.best_value(), Some(max));
        assert_eq!(study.elite_memory().best_score(), Some(max));
        assert!(max > -1.0, "expected to get close to x=7, best {max}");
    }

    #[test]
    fn test_best_trajectory_monotone() {
        let mut study = SimulationStudyTabu::new(
            quiet().with_n_init_points(4).with_n_replications(2).with_max_no_improve(None),
        )
        .unwrap();
        study
            .optimize(
                |trial: &mut Trial| {
                    let x = trial.suggest_real("x", -5.0, 5.0, false)?;
                    let n = trial.suggest_integer("n", 0, 4, false)?;
                    Ok(x * x + n as f64)
                },
                30,
            )
            .unwrap();
        for w in study.history().best_trajectory().windows(2) {
            assert!(w[1] <= w[0]);
        }
    }

    #[test]
    fn test_memories_stay_bounded() {
        let mut study = SimulationStudyTabu::new(
            quiet()
                .with_n_init_points(2)
                .with_n_replications(1)
                .with_tabu_capacity(5)
                .with_elite_capacity(3)
                .with_max_no_improve(None),
        )
        .unwrap();
        study
            .optimize(
                |trial: &mut Trial| Ok(trial.suggest_real("x", 0.0, 1.0, false)?),
                25,
            )
            .unwrap();
        assert_eq!(study.tabu_list().len(), 5);
        assert_eq!(study.elite_memory().len(), 3);
    }

    #[test]
    fn test_tabu_forces_acceptance_on_single_point_space() {
        // Only one candidate exists, so every proposal after the first is tabu
        // and never improves; the attempt budget must force it through.
        let mut study = SimulationStudyTabu::new(
            quiet()
                .with_n_init_points(0)
                .with_n_replications(1)
                .with_max_candidate_attempts(3)
                .with_max_no_improve(None),
        )
        .unwrap();
        study
            .optimize(
                |trial: &mut Trial| {
                    trial.suggest_categorical("only", &["a"])?;
                    Ok(1.0)
                },
                4,
            )
            .unwrap();
        let records = study.history().records();
        assert_eq!(records.len(), 4);
        assert!(!records[0].forced);
        for r in &records[1..] {
            assert!(r.forced);
            assert_eq!(r.attempts, 3);
        }
    }

    #[test]
    fn test_aspiration_accepts_improving_tabu_candidate() {
        // Scores fall on every call, so a revisited candidate always beats
        // the recorded best and is accepted on the first attempt.
        let mut study = SimulationStudyTabu::new(
            quiet()
                .with_n_init_points(0)
                .with_n_replications(1)
                .with_max_no_improve(None),
        )
        .unwrap();
        let mut calls = 0.0;
        study
            .optimize(
                |trial: &mut Trial| {
                    trial.suggest_categorical("only", &["a"])?;
                    calls += 1.0;
                    Ok(-calls)
                },
                3,
            )
            .unwrap();
        for r in study.history().records() {
            assert_eq!(r.attempts, 1);
            assert!(!r.forced);
        }
    }

    #[test]
    fn test_audit_trail_and_second_run() {
        let mut study = SimulationStudyTabu::new(
            quiet().with_n_init_points(2).with_n_replications(1).with_max_no_improve(None),
        )
        .unwrap();
        let objective = |trial: &mut Trial| -> Result<f64> {
            let x = trial.suggest_real("x", 0.0, 1.0, false)?;
            let c = trial.suggest_categorical("c", &["p", "q"])?;
            Ok(x + if c == "p" { 0.0 } else { 1.0 })
        };
        study.optimize(objective, 3).unwrap();
        study.optimize(objective, 2).unwrap();

        assert_eq!(study.n_trials_run(), 5);
        let ids: Vec<usize> = study.history().records().iter().map(|r| r.iteration).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);

        let x = study.variable("x").unwrap();
        assert_eq!(x.history_len(), Some(5));
        for r in study.history().records() {
            assert_eq!(
                ParamValue::Real(x.numeric_history().unwrap()[r.iteration]),
                r.values["x"]
            );
        }
        let c = study.variable("c").unwrap();
        assert_eq!(
            c.category_at(4),
            study.history().records()[4].values["c"].as_str()
        );
        assert_eq!(study.variable_names(), vec!["c".to_string(), "x".to_string()]);
    }

    #[test]
    fn test_noise_anneals_to_final_value() {
        let mut study = SimulationStudyTabu::new(
            quiet()
                .with_noise(0.4, 0.1)
                .with_n_replications(1)
                .with_max_no_improve(None),
        )
        .unwrap();
        assert!((study.current_noise() - 0.4).abs() < 1e-12);
        study
            .optimize(|t: &mut Trial| Ok(t.suggest_real("x", 0.0, 1.0, false)?), 5)
            .unwrap();
        assert!((study.current_noise() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_overflowing_real_span_is_a_declaration_error() {
        let mut study = SimulationStudyTabu::new(quiet().with_n_replications(1)).unwrap();
        let err = study
            .optimize(
                |t: &mut Trial| Ok(t.suggest_real("x", -f64::MAX, f64::MAX, false)?),
                5,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Declaration(DeclarationError::InvalidBounds { .. })
        ));
        assert_eq!(study.n_trials_run(), 0);
    }

    #[test]
    fn test_wide_real_domain_stays_in_bounds() {
        let mut study = SimulationStudyTabu::new(
            quiet()
                .with_n_init_points(3)
                .with_n_replications(1)
                .with_noise(1.0, 1.0)
                .with_max_no_improve(None),
        )
        .unwrap();
        study
            .optimize(
                |t: &mut Trial| Ok(t.suggest_real("x", -1e300, 1e300, false)?.abs()),
                15,
            )
            .unwrap();
        for r in study.history().records() {
            let x = r.values["x"].as_f64().unwrap();
            assert!((-1e300..=1e300).contains(&x));
        }
    }

    #[test]
    fn test_adjacent_large_integer_bounds() {
        let low = 1_i64 << 60;
        let mut study = SimulationStudyTabu::new(
            quiet()
                .with_n_init_points(2)
                .with_n_replications(1)
                .with_max_no_improve(None),
        )
        .unwrap();
        study
            .optimize(
                |t: &mut Trial| {
                    let n = t.suggest_integer("n", low, low + 1, false)?;
                    Ok((n - low) as f64)
                },
                6,
            )
            .unwrap();
        for r in study.history().records() {
            assert!(matches!(r.values["n"], ParamValue::Integer(n) if n == low || n == low + 1));
        }
    }
}
