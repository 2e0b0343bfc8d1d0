#![warn(missing_docs)]
//! Boundary contraction of 2D square-lattice tensor networks.
//!
//! A [`TensorNetwork2D`] is a tag-addressed tensor network with square
//! lattice geometry layered on top: every tensor carries the site, row and
//! column tags of its coordinate. [`Peps`] builds such networks from
//! per-site dense arrays. The central operation is
//! [`TensorNetwork2D::contract_boundary`], which approximates the full
//! network contraction by sweeping the lattice edges inward, compressing
//! the boundary line after each absorbed row or column:
//!
//! ```text
//!     ●──●──●──●       ●──●──●──●       ●──●──●
//!     │  │  │  │       │  │  │  │       ║  │  │
//!     ●──●──●──●  ==>  ●──●──●──●  ==>  ^──●──●  ==>  ...
//!     │  │  │  │       │  │  │  │       ║  │  │
//!     ●──●──●──●       ●══<══<══<       ^──<──<
//! ```
//!
//! Multi-layer networks (e.g. the bra-ket norm network of a PEPS) are
//! handled by absorbing each site layer by layer via tag selection.

pub mod boundary;
pub mod error;
pub mod lattice;
pub mod network2d;
pub mod options;
pub mod peps;
pub mod sweep;

pub use boundary::BoundaryResult;
pub use error::{BoundaryError, Result};
pub use lattice::{SiteRef, TagScheme};
pub use network2d::TensorNetwork2D;
pub use options::{BoundaryOptions, CompressOptions, FromDirection};
pub use peps::{Peps, BRA_TAG, KET_TAG};
pub use sweep::Sweep;
