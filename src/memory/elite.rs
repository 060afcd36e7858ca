//! Long-term ranked memory of the best candidates.

use super::fingerprint::{Candidate, Fingerprint};
use crate::study::Direction;

/// A candidate kept in [`EliteMemory`] with its mean objective value.
#[derive(Debug, Clone)]
pub struct EliteEntry {
    /// The candidate's variable assignment.
    pub values: Candidate,
    /// Mean objective value of the candidate.
    pub score: f64,
    fingerprint: Fingerprint,
}

impl EliteEntry {
    /// Canonical key of the candidate.
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}

/// Bounded memory of the best candidates, kept sorted best-first.
///
/// "Best" follows the configured [`Direction`]; NaN scores always rank
/// last. Duplicate candidates (equal fingerprints) are rejected.
///
/// # Examples
///
/// ```
/// use u_simopt::memory::{Candidate, EliteMemory};
/// use u_simopt::study::Direction;
/// use u_simopt::variable::ParamValue;
///
/// let mut elite = EliteMemory::new(2, Direction::Minimize);
/// for (x, score) in [(1, 4.0), (2, 1.0), (3, 9.0)] {
///     let mut c = Candidate::new();
///     c.insert("x".into(), ParamValue::Integer(x));
///     elite.add(c, score);
/// }
/// assert_eq!(elite.len(), 2);
/// assert_eq!(elite.best().unwrap()["x"], ParamValue::Integer(2));
/// ```
#[derive(Debug, Clone)]
pub struct EliteMemory {
    entries: Vec<EliteEntry>,
    capacity: usize,
    direction: Direction,
}

impl EliteMemory {
    /// Default number of elite candidates.
    pub const DEFAULT_CAPACITY: usize = 10;

    /// Creates an empty memory holding at most `capacity` candidates.
    pub fn new(capacity: usize, direction: Direction) -> Self {
        Self {
            entries: Vec::with_capacity(capacity + 1),
            capacity,
            direction,
        }
    }

    /// Inserts a candidate with its score.
    ///
    /// Returns `false` (leaving the memory untouched) when an entry with the
    /// same fingerprint already exists. Otherwise the entry is ranked and the
    /// worst entry dropped if the memory overflows; the return value is
    /// `true` even if the new entry itself was the one dropped.
    pub fn add(&mut self, values: Candidate, score: f64) -> bool {
        let fingerprint = Fingerprint::of_candidate(&values);
        if self.contains(&fingerprint) {
            return false;
        }
        self.entries.push(EliteEntry {
            values,
            score,
            fingerprint,
        });
        let direction = self.direction;
        // Stable sort: among equal scores the earlier entry stays ahead.
        self.entries
            .sort_by(|a, b| direction.compare(a.score, b.score));
        if self.entries.len() > self.capacity {
            self.entries.pop();
        }
        true
    }

    /// Whether a candidate with this fingerprint is stored.
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.iter().any(|e| &e.fingerprint == fingerprint)
    }

    /// Top-ranked candidate.
    pub fn best(&self) -> Option<&Candidate> {
        self.entries.first().map(|e| &e.values)
    }

    /// Score of the top-ranked candidate.
    pub fn best_score(&self) -> Option<f64> {
        self.entries.first().map(|e| e.score)
    }

    /// All entries, best first.
    pub fn entries(&self) -> &[EliteEntry] {
        &self.entries
    }

    /// Number of stored candidates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no candidate is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of stored candidates.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Ranking direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }
}
