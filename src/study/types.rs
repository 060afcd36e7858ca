//! Core types of the search engine: direction, objective contract and the
//! per-iteration run history.

use std::cmp::Ordering;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::memory::Candidate;
use crate::trial::Trial;

/// Whether the study minimizes or maximizes the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Lower is better.
    #[default]
    Minimize,
    /// Higher is better.
    Maximize,
}

impl Direction {
    /// Whether `candidate` strictly improves on `incumbent`.
    ///
    /// NaN never improves on anything.
    pub fn improves(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Direction::Minimize => candidate < incumbent,
            Direction::Maximize => candidate > incumbent,
        }
    }

    /// Orders two scores best-first. NaN ranks after every number.
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => match self {
                Direction::Minimize => a.total_cmp(&b),
                Direction::Maximize => b.total_cmp(&a),
            },
        }
    }

    /// The value every real score improves on.
    pub fn worst(self) -> f64 {
        match self {
            Direction::Minimize => f64::INFINITY,
            Direction::Maximize => f64::NEG_INFINITY,
        }
    }
}

/// An objective function evaluated against a [`Trial`].
///
/// The objective pulls every decision variable it needs from the trial and
/// returns one scalar score per call. Each call is one noisy replication;
/// the study averages several of them per accepted candidate. Any problem
/// context belongs to the implementor (or the closure's captures).
///
/// Closures `FnMut(&mut Trial) -> Result<f64>` implement this trait.
pub trait Objective {
    /// Runs one replication of the simulation for `trial`.
    fn evaluate(&mut self, trial: &mut Trial) -> Result<f64>;
}

impl<F> Objective for F
where
    F: FnMut(&mut Trial) -> Result<f64>,
{
    fn evaluate(&mut self, trial: &mut Trial) -> Result<f64> {
        self(trial)
    }
}

/// Outcome of one accepted iteration.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IterationRecord {
    /// Trial id of the iteration.
    pub iteration: usize,
    /// Accepted candidate.
    pub values: Candidate,
    /// Mean objective over the replications.
    pub mean: f64,
    /// Population standard deviation over the replications.
    pub std: f64,
    /// Wall-clock time spent on the replications.
    pub elapsed: Duration,
    /// Best mean objective after this iteration.
    pub best_so_far: f64,
    /// Candidates generated before one was accepted.
    pub attempts: usize,
    /// Whether the candidate was accepted only because the attempt budget ran out.
    pub forced: bool,
}

/// Per-iteration history of a study.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StudyHistory {
    records: Vec<IterationRecord>,
}

impl StudyHistory {
    pub(crate) fn push(&mut self, record: IterationRecord) {
        self.records.push(record);
    }

    /// All records in iteration order.
    pub fn records(&self) -> &[IterationRecord] {
        &self.records
    }

    /// Number of completed iterations.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no iteration completed.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Mean objective of every iteration.
    pub fn objective_values(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.mean).collect()
    }

    /// Standard deviation of every iteration.
    pub fn objective_stds(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.std).collect()
    }

    /// Replication time of every iteration, in seconds.
    pub fn elapsed_times(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.elapsed.as_secs_f64()).collect()
    }

    /// Best-so-far value after every iteration.
    pub fn best_trajectory(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.best_so_far).collect()
    }
}
