//! Bidirectional label ↔ index mapping for categorical variables.

use std::collections::HashMap;

/// Assigns each distinct category label a dense, stable integer index.
///
/// Indices are handed out in order of first appearance and are never reused
/// or removed, so the label ↔ index correspondence stays injective for the
/// lifetime of the indexer.
///
/// # Examples
///
/// ```
/// use u_simopt::variable::CategoryIndexer;
///
/// let mut indexer = CategoryIndexer::new();
/// assert_eq!(indexer.get_indices(&["fifo", "lifo"]), vec![0, 1]);
/// assert_eq!(indexer.get_indices(&["sjf", "fifo"]), vec![2, 0]);
/// assert_eq!(indexer.label(2), Some("sjf"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CategoryIndexer {
    to_index: HashMap<String, usize>,
    to_label: Vec<String>,
}

impl CategoryIndexer {
    /// Creates an empty indexer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of every label, registering unseen labels first.
    pub fn get_indices<S: AsRef<str>>(&mut self, labels: &[S]) -> Vec<usize> {
        labels.iter().map(|l| self.intern(l.as_ref())).collect()
    }

    /// Returns the index of `label`, registering it if unseen.
    pub fn intern(&mut self, label: &str) -> usize {
        if let Some(&idx) = self.to_index.get(label) {
            return idx;
        }
        let idx = self.to_label.len();
        self.to_index.insert(label.to_owned(), idx);
        self.to_label.push(label.to_owned());
        idx
    }

    /// Index of an already registered label.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.to_index.get(label).copied()
    }

    /// Label registered under `index`.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.to_label.get(index).map(String::as_str)
    }

    /// Number of registered labels (also the next free index).
    pub fn len(&self) -> usize {
        self.to_label.len()
    }

    /// Whether no label has been registered.
    pub fn is_empty(&self) -> bool {
        self.to_label.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_dense_and_stable() {
        let mut idx = CategoryIndexer::new();
        assert!(idx.is_empty());
        assert_eq!(idx.get_indices(&["a", "b", "c"]), vec![0, 1, 2]);
        assert_eq!(idx.get_indices(&["c", "d", "a"]), vec![2, 3, 0]);
        assert_eq!(idx.len(), 4);
    }

    #[test]
    fn test_round_trip_label_index() {
        let mut idx = CategoryIndexer::new();
        idx.get_indices(&["low", "mid", "high"]);
        for i in 0..idx.len() {
            let label = idx.label(i).unwrap().to_owned();
            assert_eq!(idx.index_of(&label), Some(i));
        }
        assert_eq!(idx.label(3), None);
        assert_eq!(idx.index_of("missing"), None);
    }

    #[test]
    fn test_repeated_label_in_one_call() {
        let mut idx = CategoryIndexer::new();
        assert_eq!(idx.get_indices(&["x", "x", "y"]), vec![0, 0, 1]);
    }
}
