//! Search memories.
//!
//! - [`TabuList`]: short-term FIFO memory of recently evaluated candidates,
//!   used to discourage immediate re-evaluation.
//! - [`EliteMemory`]: long-term ranked memory of the best candidates found,
//!   used to bias later sampling.
//!
//! Both key candidates by their [`Fingerprint`].
//!
//! # References
//!
//! - Glover, F. (1989). "Tabu Search, Part I", *ORSA Journal on Computing* 1(3), 190-206.
//! - Glover, F. & Laguna, M. (1997). *Tabu Search*, ch. 4 (intermediate and
//!   long-term memory).

mod elite;
mod fingerprint;
mod tabu;

pub use elite::{EliteEntry, EliteMemory};
pub use fingerprint::{Candidate, Fingerprint};
pub use tabu::TabuList;
