//! Error types for the tensor engine.

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the tensor engine.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No tensor matches the requested tags.
    #[error("no tensor matches tags {tags:?}")]
    TagNotFound {
        /// The tags that were queried.
        tags: Vec<String>,
    },

    /// A selection that must be unique matched several tensors.
    #[error("tags {tags:?} match {count} tensors, expected exactly one")]
    AmbiguousTags {
        /// The tags that were queried.
        tags: Vec<String>,
        /// How many tensors matched.
        count: usize,
    },

    /// Two tensors were expected to share at least one index.
    #[error("tensors share no index")]
    NotAdjacent,

    /// An index label was not found in the network.
    #[error("no index with label {0:?}")]
    LabelNotFound(String),

    /// Tensor data does not match the declared index dimensions.
    #[error("data shape {shape:?} does not match index dimensions {dims:?}")]
    ShapeMismatch {
        /// Shape of the supplied data.
        shape: Vec<usize>,
        /// Dimensions implied by the index list.
        dims: Vec<usize>,
    },

    /// An index group passed to a factorization was not a subset of the
    /// tensor's indices.
    #[error("index group is not part of the tensor")]
    UnknownIndex,

    /// The singular value decomposition did not converge.
    #[error("singular value decomposition did not converge")]
    SvdFailed,

    /// Contraction was requested over an empty tensor collection.
    #[error("cannot contract an empty tensor collection")]
    EmptyContraction,

    /// A scalar value was requested from a non-scalar tensor.
    #[error("tensor holds {0} elements, expected a single scalar")]
    NotScalar(usize),
}
