//! Tabu-enhanced simulation optimization.
//!
//! Searches a space of decision variables for the assignment minimizing (or
//! maximizing) the expected output of a noisy, expensive black-box
//! simulation. Three classic ideas share one loop:
//!
//! - **Random initialization**: the first trials sample the box uniformly.
//! - **Tabu search**: recently evaluated candidates are avoided unless they
//!   beat the best known value (aspiration).
//! - **Elite memory**: later candidates perturb the best ones found, with a
//!   noise scale annealed from wide to narrow.
//!
//! Each evaluation averages several replications of the objective.
//!
//! # Example
//!
//! ```
//! use u_simopt::prelude::*;
//!
//! let config = StudyConfig::default()
//!     .with_n_init_points(5)
//!     .with_n_replications(5)
//!     .with_seed(42)
//!     .with_verbose(false);
//! let mut study = SimulationStudyTabu::new(config).unwrap();
//!
//! study
//!     .optimize(
//!         |trial: &mut Trial| {
//!             let mu = trial.suggest_real("mu", 0.1, 10.0, false)?;
//!             Ok((mu - 3.0).powi(2))
//!         },
//!         30,
//!     )
//!     .unwrap();
//!
//! assert!(study.best_value().unwrap() < 1.0);
//! ```
//!
//! # Modules
//!
//! - [`variable`]: variable kinds, domains, values and audit trails.
//! - [`memory`]: fingerprints, tabu list and elite memory.
//! - [`study`]: configuration, suggestion policy and the search loop.

pub mod error;
pub mod memory;
pub mod study;
pub mod trial;
pub mod variable;

pub use error::{DeclarationError, Error, Result};
pub use study::{Direction, Objective, SimulationStudyTabu, StudyConfig};
pub use trial::Trial;

/// Common imports.
///
/// ```
/// use u_simopt::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{DeclarationError, Error, Result};
    pub use crate::memory::Candidate;
    pub use crate::study::{Direction, NoiseSchedule, Objective, SimulationStudyTabu, StudyConfig};
    pub use crate::trial::Trial;
    pub use crate::variable::ParamValue;
}
