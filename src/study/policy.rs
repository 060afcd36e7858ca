//! Suggestion policy: how variable values are chosen.
//!
//! # Numeric variables
//!
//! - **Exploration** (`trial_id < n_init_points`): uniform on `[low, high]`,
//!   log-uniform for log-scale variables.
//! - **Exploitation**: start from the best elite value for the name (or,
//!   with probability 0.5 or when there is none, a uniform draw), add
//!   `N(0, σ (high − low))` where `σ` is the current annealed noise scale,
//!   and reflect back into the interval. Log-scale variables are perturbed
//!   in log space; integers are rounded after reflection.
//!
//! # Categorical variables
//!
//! Uniform during exploration or while elite memory is empty; otherwise
//! the elite label, replaced by a uniform label with probability 0.3.
//!
//! # Elite perturbation
//!
//! [`Policy::perturb_candidate`] builds a whole candidate from the best
//! elite one without calling the objective: numeric fields receive
//! `N(0, σ (|v| + 1e-3))` noise reflected at the variable's declared bounds,
//! categorical fields are kept with probability 0.7.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::memory::Candidate;
use crate::trial::Suggest;
use crate::variable::{Domain, ParamValue, Variable};

/// Probability of restarting from a uniform draw instead of the elite value.
const UNIFORM_RESTART_PROBABILITY: f64 = 0.5;
/// Probability of mutating an elite category during exploitation.
const CATEGORY_MUTATION_PROBABILITY: f64 = 0.3;
/// Probability of keeping an elite category during elite perturbation.
const CATEGORY_KEEP_PROBABILITY: f64 = 0.7;
/// Added to a value's magnitude so zero-valued fields still move.
const MAGNITUDE_FLOOR: f64 = 1e-3;

/// Mirrors `x` back into `[low, high]`.
///
/// Equivalent to reflecting repeatedly at whichever bound is violated until
/// the value lies inside the closed interval, but computed in closed form
/// (reflection is periodic with period `2 (high − low)`), so it returns in
/// constant time for any finite input. Values already inside are returned
/// unchanged; `±∞` map to the violated bound and NaN maps to `low`.
///
/// # Examples
///
/// ```
/// use u_simopt::study::reflect_at_boundaries;
///
/// assert_eq!(reflect_at_boundaries(3.0, 0.0, 10.0), 3.0);
/// assert_eq!(reflect_at_boundaries(-2.0, 0.0, 10.0), 2.0);
/// assert_eq!(reflect_at_boundaries(12.0, 0.0, 10.0), 8.0);
/// assert_eq!(reflect_at_boundaries(25.0, 0.0, 10.0), 5.0);
/// ```
pub fn reflect_at_boundaries(x: f64, low: f64, high: f64) -> f64 {
    if low <= x && x <= high {
        return x;
    }
    if x.is_nan() {
        return low;
    }
    if x.is_infinite() {
        return if x < low { low } else { high };
    }
    let range = high - low;
    if range <= 0.0 {
        return low;
    }
    let offset = (x - low).rem_euclid(2.0 * range);
    let folded = if offset > range {
        2.0 * range - offset
    } else {
        offset
    };
    (low + folded).clamp(low, high)
}

/// Draws from `N(0, 1)` via the Box-Muller transform.
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.random_range(f64::EPSILON..=1.0);
    let u2: f64 = rng.random_range(0.0_f64..=core::f64::consts::TAU);
    (-2.0 * u1.ln()).sqrt() * u2.cos()
}

fn uniform(rng: &mut StdRng, low: f64, high: f64) -> f64 {
    rng.random_range(low..=high)
}

fn pick(rng: &mut StdRng, labels: &[String]) -> String {
    labels[rng.random_range(0..labels.len())].clone()
}

/// Engine-side state behind [`Suggest`]: the random stream, the declared
/// variables, the current elite guide and the annealed noise scale.
pub(crate) struct Policy {
    rng: StdRng,
    variables: HashMap<String, Variable>,
    guide: Option<Candidate>,
    noise: f64,
    n_init_points: usize,
    capacity: usize,
}

impl Policy {
    pub(crate) fn new(seed: Option<u64>, n_init_points: usize, noise: f64) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            rng: StdRng::seed_from_u64(seed),
            variables: HashMap::new(),
            guide: None,
            noise,
            n_init_points,
            capacity: 0,
        }
    }

    /// Extends every variable's history by `additional` trials.
    pub(crate) fn reserve(&mut self, additional: usize) -> Result<()> {
        for var in self.variables.values_mut() {
            var.add_iter(additional)?;
        }
        self.capacity += additional;
        Ok(())
    }

    pub(crate) fn set_noise(&mut self, noise: f64) {
        self.noise = noise;
    }

    pub(crate) fn noise(&self) -> f64 {
        self.noise
    }

    /// Sets the elite candidate exploitation is guided by.
    pub(crate) fn set_guide(&mut self, guide: Option<Candidate>) {
        self.guide = guide;
    }

    pub(crate) fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub(crate) fn variable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.variables.keys().cloned().collect();
        names.sort();
        names
    }

    /// Bernoulli draw from the shared stream.
    pub(crate) fn chance(&mut self, p: f64) -> bool {
        self.rng.random::<f64>() < p
    }

    /// Writes an accepted candidate into the variables' audit trails.
    pub(crate) fn record(&mut self, iteration: usize, candidate: &Candidate) -> Result<()> {
        for (name, value) in candidate {
            if let Some(var) = self.variables.get_mut(name) {
                var.record(iteration, value)?;
            }
        }
        Ok(())
    }

    /// Builds a neighbour of `elite` by perturbing each field.
    pub(crate) fn perturb_candidate(&mut self, elite: &Candidate) -> Candidate {
        let mut out = Candidate::new();
        for (name, value) in elite {
            let domain = self.variables.get(name).and_then(Variable::domain);
            let next = match (value, domain) {
                (ParamValue::Real(v), Some(&Domain::Real { low, high, .. })) => {
                    let sigma = self.noise * (v.abs() + MAGNITUDE_FLOOR);
                    let x = v + sigma * standard_normal(&mut self.rng);
                    ParamValue::Real(reflect_at_boundaries(x, low, high))
                }
                (ParamValue::Integer(v), Some(&Domain::Integer { low, high, .. })) => {
                    let v = *v as f64;
                    let sigma = self.noise * (v.abs() + MAGNITUDE_FLOOR);
                    let x = v + sigma * standard_normal(&mut self.rng);
                    ParamValue::Integer(round_into(x, low, high))
                }
                (ParamValue::Categorical(label), Some(Domain::Categorical(labels))) => {
                    if self.rng.random::<f64>() < CATEGORY_KEEP_PROBABILITY {
                        ParamValue::Categorical(label.clone())
                    } else {
                        ParamValue::Categorical(pick(&mut self.rng, labels))
                    }
                }
                (other, _) => other.clone(),
            };
            out.insert(name.clone(), next);
        }
        out
    }

    fn sample_numeric(
        &mut self,
        trial_id: usize,
        name: &str,
        low: f64,
        high: f64,
        log: bool,
    ) -> f64 {
        let (lo, hi) = if log {
            (low.ln(), high.ln())
        } else {
            (low, high)
        };
        let x = if trial_id < self.n_init_points {
            uniform(&mut self.rng, lo, hi)
        } else {
            let elite = self
                .guide
                .as_ref()
                .and_then(|g| g.get(name))
                .and_then(ParamValue::as_f64)
                .map(|v| if log { v.ln() } else { v })
                .filter(|v| v.is_finite());
            let base = match elite {
                Some(v) if self.rng.random::<f64>() >= UNIFORM_RESTART_PROBABILITY => v,
                _ => uniform(&mut self.rng, lo, hi),
            };
            let sigma = self.noise * (hi - lo);
            reflect_at_boundaries(base + sigma * standard_normal(&mut self.rng), lo, hi)
        };
        if log {
            x.exp().clamp(low, high)
        } else {
            x
        }
    }

    fn sample_categorical(&mut self, trial_id: usize, name: &str, labels: &[String]) -> String {
        let Some(guide) = self.guide.as_ref().filter(|_| trial_id >= self.n_init_points) else {
            return pick(&mut self.rng, labels);
        };
        let base = guide
            .get(name)
            .and_then(ParamValue::as_str)
            .filter(|l| labels.iter().any(|c| c == l))
            .map(str::to_owned);
        let base = match base {
            Some(label) => label,
            None => pick(&mut self.rng, labels),
        };
        if self.rng.random::<f64>() < CATEGORY_MUTATION_PROBABILITY {
            pick(&mut self.rng, labels)
        } else {
            base
        }
    }
}

/// Rounds a reflected value to the nearest admissible integer.
fn round_into(x: f64, low: i64, high: i64) -> i64 {
    let x = reflect_at_boundaries(x, low as f64, high as f64).round();
    (x as i64).clamp(low, high)
}

impl Suggest for Policy {
    fn declare(&mut self, name: &str, domain: &Domain) -> Result<()> {
        if let Some(var) = self.variables.get_mut(name) {
            return var.declare(domain);
        }
        let mut var = Variable::new(name);
        var.set_values(self.capacity.max(1), domain)?;
        self.variables.insert(name.to_owned(), var);
        Ok(())
    }

    fn sample(&mut self, trial_id: usize, name: &str, domain: &Domain) -> ParamValue {
        match domain {
            &Domain::Real { low, high, log } => {
                ParamValue::Real(self.sample_numeric(trial_id, name, low, high, log))
            }
            &Domain::Integer { low, high, log } => {
                if trial_id < self.n_init_points && !log {
                    return ParamValue::Integer(self.rng.random_range(low..=high));
                }
                let x = self.sample_numeric(trial_id, name, low as f64, high as f64, log);
                ParamValue::Integer(round_into(x, low, high))
            }
            Domain::Categorical(labels) => {
                ParamValue::Categorical(self.sample_categorical(trial_id, name, labels))
            }
        }
    }
}
