//! Decision variables.
//!
//! A [`Variable`] describes one decision dimension (real, integer or
//! categorical) and keeps the audit trail of the values it took across
//! trials. Categorical labels are mapped to dense indices by a
//! [`CategoryIndexer`].

mod history;
mod indexer;
mod types;

pub use history::Variable;
pub use indexer::CategoryIndexer;
pub use types::{Domain, ParamValue, VariableKind};
