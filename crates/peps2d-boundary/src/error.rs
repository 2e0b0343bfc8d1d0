//! Error type for lattice-level operations.

use peps2d_core::CoreError;
use thiserror::Error;

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, BoundaryError>;

/// Errors from 2D lattice addressing and boundary contraction.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// A sweep direction was not valid for the operation.
    #[error("invalid sweep `{found}`, expected one of: {expected}")]
    InvalidSweep {
        /// What was supplied.
        found: String,
        /// The accepted directions.
        expected: &'static str,
    },

    /// A boundary sequence contained an unknown direction character.
    #[error("invalid direction `{0}` in contraction sequence, expected 'b', 'l', 't' or 'r'")]
    InvalidSequence(char),

    /// The scheduler exceeded its step budget without reaching a stop
    /// condition.
    #[error("boundary contraction did not terminate within {0} steps")]
    NoTermination(usize),

    /// A lattice constructor was given no sites, or a ragged site grid.
    #[error("lattice is empty or not rectangular")]
    BadLattice,

    /// An underlying tensor operation failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}
