//! Short-term memory of recently evaluated candidates.

use std::collections::{HashMap, VecDeque};

use super::fingerprint::Fingerprint;

/// Bounded FIFO memory of candidate fingerprints.
///
/// Membership is answered in O(1) from a counted index kept alongside the
/// queue, so a fingerprint added twice stays tabu until both copies have
/// been evicted.
///
/// # Examples
///
/// ```
/// use u_simopt::memory::{Candidate, Fingerprint, TabuList};
/// use u_simopt::variable::ParamValue;
///
/// let mut tabu = TabuList::new(1);
/// let mut a = Candidate::new();
/// a.insert("x".into(), ParamValue::Integer(1));
/// let mut b = a.clone();
/// b.insert("x".into(), ParamValue::Integer(2));
///
/// tabu.add(Fingerprint::of_candidate(&a));
/// tabu.add(Fingerprint::of_candidate(&b));
/// assert!(!tabu.contains(&Fingerprint::of_candidate(&a)));
/// assert!(tabu.contains(&Fingerprint::of_candidate(&b)));
/// ```
#[derive(Debug, Clone)]
pub struct TabuList {
    queue: VecDeque<Fingerprint>,
    counts: HashMap<Fingerprint, usize>,
    capacity: usize,
}

impl TabuList {
    /// Default number of remembered candidates.
    pub const DEFAULT_CAPACITY: usize = 20;

    /// Creates an empty tabu list holding at most `capacity` fingerprints.
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity + 1),
            counts: HashMap::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Appends `fingerprint`, evicting the oldest entry once over capacity.
    pub fn add(&mut self, fingerprint: Fingerprint) {
        *self.counts.entry(fingerprint.clone()).or_insert(0) += 1;
        self.queue.push_back(fingerprint);
        while self.queue.len() > self.capacity {
            if let Some(old) = self.queue.pop_front() {
                self.release(&old);
            }
        }
    }

    /// Whether `fingerprint` is currently tabu.
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.counts.contains_key(fingerprint)
    }

    /// Number of stored fingerprints.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Maximum number of stored fingerprints.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored fingerprints, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Fingerprint> {
        self.queue.iter()
    }

    fn release(&mut self, fingerprint: &Fingerprint) {
        if let Some(count) = self.counts.get_mut(fingerprint) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(fingerprint);
            }
        }
    }
}

impl Default for TabuList {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
