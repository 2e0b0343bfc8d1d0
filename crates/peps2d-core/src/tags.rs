//! String tags attached to tensors.

use std::collections::BTreeSet;

/// An ordered set of string tags.
///
/// Tags are how callers address tensors inside a [`crate::TensorNetwork`]:
/// a lattice layer attaches site/row/column (and possibly layer) tags, and
/// later selects tensors by requiring all or any of a set of tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: BTreeSet<String>,
}

impl TagSet {
    /// Create an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Insert a tag. Returns `false` if it was already present.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        self.tags.insert(tag.into())
    }

    /// Remove a tag. Returns `true` if it was present.
    pub fn remove(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    /// Whether the given tag is present.
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Whether every tag in `query` is present.
    pub fn contains_all(&self, query: &[&str]) -> bool {
        query.iter().all(|t| self.tags.contains(*t))
    }

    /// Whether at least one tag in `query` is present.
    pub fn contains_any(&self, query: &[&str]) -> bool {
        query.iter().any(|t| self.tags.contains(*t))
    }

    /// Absorb all tags of `other`.
    pub fn union_with(&mut self, other: &TagSet) {
        for t in &other.tags {
            self.tags.insert(t.clone());
        }
    }

    /// Iterate over the tags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|s| s.as_str())
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching() {
        let ts: TagSet = ["I0,0", "ROW0", "COL0"].into_iter().collect();
        assert!(ts.contains_all(&["I0,0", "ROW0"]));
        assert!(!ts.contains_all(&["I0,0", "ROW1"]));
        assert!(ts.contains_any(&["ROW1", "COL0"]));
        assert!(!ts.contains_any(&["ROW1", "COL1"]));
    }

    #[test]
    fn union() {
        let mut a: TagSet = ["X"].into_iter().collect();
        let b: TagSet = ["X", "Y"].into_iter().collect();
        a.union_with(&b);
        assert_eq!(a.len(), 2);
        assert!(a.contains("Y"));
    }
}
