#![warn(missing_docs)]
//! Tag-indexed dense tensor network engine.
//!
//! This crate provides the generic machinery that lattice contraction
//! algorithms are built on top of:
//! - [`Index`]: bond identity (random `u128` id, dimension, optional label)
//! - [`Tensor`]: dense data with an ordered index list and a [`TagSet`]
//! - exact pairwise contraction and greedy multi-tensor contraction
//! - QR gauge fixing and truncated-SVD bond compression between tensors
//! - [`TensorNetwork`]: a tag-addressed tensor store with in-place
//!   contraction, selection, tag mutation and dense materialization
//!
//! The engine is deliberately agnostic of any lattice structure; geometry
//! lives entirely in the tags that callers attach to tensors.

pub mod contract;
pub mod decomp;
pub mod error;
pub mod index;
pub mod network;
pub mod scalar;
pub mod tags;
pub mod tensor;
pub mod truncation;

pub use contract::{contract_all, contract_pair};
pub use decomp::{qr_split, svd_split, SvdSplit};
pub use error::{CoreError, Result};
pub use index::{generate_id, Index, IndexId};
pub use network::{Absorb, TagMatch, TensorId, TensorNetwork};
pub use scalar::TnScalar;
pub use tags::TagSet;
pub use tensor::Tensor;
pub use truncation::{retained_rank, TruncationParams};
