//! Canonical candidate keys.

use std::collections::BTreeMap;

use crate::variable::ParamValue;

/// A full assignment of values to decision variables, ordered by name.
pub type Candidate = BTreeMap<String, ParamValue>;

/// Order-independent, hashable key of a candidate assignment.
///
/// Built by sorting `(name, value)` pairs by name, so two assignments with
/// the same pairs produce the same fingerprint regardless of the order the
/// variables were suggested in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(Vec<(String, ParamValue)>);

impl Fingerprint {
    /// Builds the fingerprint of `(name, value)` pairs given in any order.
    pub fn of<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a ParamValue)>,
    {
        let mut entries: Vec<(String, ParamValue)> = pairs
            .into_iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Fingerprint(entries)
    }

    /// Fingerprint of a candidate map.
    pub fn of_candidate(candidate: &Candidate) -> Self {
        Self::of(candidate)
    }

    /// The sorted `(name, value)` pairs.
    pub fn entries(&self) -> &[(String, ParamValue)] {
        &self.0
    }

    /// Number of variables in the candidate.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the candidate assigns no variable.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
