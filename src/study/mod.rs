//! Tabu-enhanced simulation optimization (TESO).
//!
//! [`SimulationStudyTabu`] searches a box-bounded space of real, integer and
//! categorical decision variables for the candidate with the best *expected*
//! objective, where every evaluation is the mean of several noisy
//! replications of a simulation. Random initialization, a short-term tabu
//! list and a long-term elite memory are combined in one loop; the
//! perturbation noise anneals from a wide to a narrow scale over the run.
//!
//! The objective pulls values from a [`Trial`](crate::Trial) through
//! `suggest_real`, `suggest_integer` and `suggest_categorical`.
//!
//! # References
//!
//! - Glover, F. (1989). "Tabu Search, Part I", *ORSA Journal on Computing* 1(3), 190-206.
//! - Fu, M. C. (2002). "Optimization for simulation: Theory vs. practice",
//!   *INFORMS Journal on Computing* 14(3), 192-215.

mod config;
mod policy;
mod report;
mod runner;
mod types;

pub use config::{NoiseSchedule, StudyConfig};
pub use policy::reflect_at_boundaries;
pub use report::{Reporter, TrialReport};
pub use runner::SimulationStudyTabu;
pub use types::{Direction, IterationRecord, Objective, StudyHistory};
