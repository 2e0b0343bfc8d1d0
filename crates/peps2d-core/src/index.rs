//! Bond indices with runtime identity.

use std::cell::RefCell;

use rand::Rng;

/// Runtime identity of an index.
///
/// `u128` gives a collision probability low enough that freshly generated
/// bonds can be treated as globally unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexId(pub u128);

thread_local! {
    // Thread-local so id generation needs no global synchronization.
    static ID_RNG: RefCell<rand::rngs::ThreadRng> = RefCell::new(rand::thread_rng());
}

/// Generate a fresh random index identity.
pub fn generate_id() -> IndexId {
    IndexId(ID_RNG.with(|rng| rng.borrow_mut().gen()))
}

/// A tensor index: identity, dimension and an optional label.
///
/// Two `Index` values compare equal iff their ids match; the label is
/// advisory and used to address open (physical) indices by name, e.g. when
/// materializing a dense array in a caller-chosen order.
#[derive(Debug, Clone)]
pub struct Index {
    /// Runtime identity; sole basis of equality.
    pub id: IndexId,
    /// Dimension of the index.
    pub dim: usize,
    /// Optional name, set for physical indices.
    pub label: Option<String>,
}

impl Index {
    /// Create an anonymous bond index of the given dimension.
    pub fn bond(dim: usize) -> Self {
        Self {
            id: generate_id(),
            dim,
            label: None,
        }
    }

    /// Create a labeled (physical) index of the given dimension.
    pub fn labeled(label: impl Into<String>, dim: usize) -> Self {
        Self {
            id: generate_id(),
            dim,
            label: Some(label.into()),
        }
    }

    /// Whether this index carries the given label.
    pub fn has_label(&self, label: &str) -> bool {
        self.label.as_deref() == Some(label)
    }
}

impl PartialEq for Index {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Index {}

impl std::hash::Hash for Index {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = Index::bond(3);
        let b = Index::bond(3);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn equality_ignores_label() {
        let mut a = Index::labeled("k0", 2);
        let b = a.clone();
        a.label = Some("other".into());
        assert_eq!(a, b);
    }
}
