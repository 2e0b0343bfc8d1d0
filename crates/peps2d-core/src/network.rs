//! Tag-addressed tensor networks.

use std::collections::BTreeMap;

use ndarray::ArrayD;

use crate::contract::{contract_all, contract_pair};
use crate::decomp::{qr_split, svd_split};
use crate::error::{CoreError, Result};
use crate::index::Index;
use crate::scalar::TnScalar;
use crate::tensor::Tensor;
use crate::truncation::TruncationParams;

/// Stable handle to a tensor within a [`TensorNetwork`].
pub type TensorId = usize;

/// Tag selection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMatch {
    /// Tensor must carry every queried tag.
    All,
    /// Tensor must carry at least one queried tag.
    Any,
}

/// Which side of a compressed bond absorbs the singular weight.
///
/// "Left"/"Right" refer to the order the two tensors were named in, not to
/// lattice geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absorb {
    /// Multiply the singular values into the first tensor.
    Left,
    /// Multiply the singular values into the second tensor.
    Right,
    /// Split them evenly (square roots on both sides).
    Both,
}

/// A collection of tensors addressed by tags.
///
/// Tensor handles stay valid across mutations of *other* tensors; every
/// structural operation that consumes tensors returns the handle of the
/// replacement. Cloning the network is the "operate on a copy" escape hatch
/// callers use when they need rollback on failure.
#[derive(Debug, Clone)]
pub struct TensorNetwork<T: TnScalar> {
    tensors: BTreeMap<TensorId, Tensor<T>>,
    next_id: TensorId,
}

impl<T: TnScalar> Default for TensorNetwork<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TnScalar> TensorNetwork<T> {
    /// Create an empty network.
    pub fn new() -> Self {
        Self {
            tensors: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Number of tensors.
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    /// Whether the network holds no tensors.
    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Add a tensor, returning its handle.
    pub fn add_tensor(&mut self, tensor: Tensor<T>) -> TensorId {
        let tid = self.next_id;
        self.next_id += 1;
        self.tensors.insert(tid, tensor);
        tid
    }

    /// Remove a tensor by handle.
    pub fn remove(&mut self, tid: TensorId) -> Option<Tensor<T>> {
        self.tensors.remove(&tid)
    }

    /// Borrow a tensor by handle.
    pub fn tensor(&self, tid: TensorId) -> Option<&Tensor<T>> {
        self.tensors.get(&tid)
    }

    /// Mutably borrow a tensor by handle.
    pub fn tensor_mut(&mut self, tid: TensorId) -> Option<&mut Tensor<T>> {
        self.tensors.get_mut(&tid)
    }

    /// Iterate over `(handle, tensor)` pairs in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (TensorId, &Tensor<T>)> {
        self.tensors.iter().map(|(&tid, t)| (tid, t))
    }

    /// Handles of all tensors matching `tags` under `which`.
    pub fn tids_matching(&self, tags: &[&str], which: TagMatch) -> Vec<TensorId> {
        self.iter()
            .filter(|(_, t)| match which {
                TagMatch::All => t.tags().contains_all(tags),
                TagMatch::Any => t.tags().contains_any(tags),
            })
            .map(|(tid, _)| tid)
            .collect()
    }

    /// Handle of the single tensor carrying all of `tags`.
    pub fn tid_unique(&self, tags: &[&str]) -> Result<TensorId> {
        let tids = self.tids_matching(tags, TagMatch::All);
        match tids.len() {
            0 => Err(CoreError::TagNotFound {
                tags: tags.iter().map(|s| s.to_string()).collect(),
            }),
            1 => Ok(tids[0]),
            n => Err(CoreError::AmbiguousTags {
                tags: tags.iter().map(|s| s.to_string()).collect(),
                count: n,
            }),
        }
    }

    /// Borrow the single tensor carrying all of `tags`.
    pub fn select(&self, tags: &[&str]) -> Result<&Tensor<T>> {
        let tid = self.tid_unique(tags)?;
        self.tensors.get(&tid).ok_or(CoreError::TagNotFound {
            tags: tags.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Drop `tag` from the tensor `tid`. Returns whether it was present.
    pub fn drop_tag(&mut self, tid: TensorId, tag: &str) -> bool {
        self.tensors
            .get_mut(&tid)
            .map(|t| t.tags_mut().remove(tag))
            .unwrap_or(false)
    }

    /// Contract every tensor matching `tags` into a single tensor, in
    /// place. A single-tensor match is a no-op. The replacement carries the
    /// union of the contracted tensors' tags.
    pub fn contract_tags(&mut self, tags: &[&str], which: TagMatch) -> Result<TensorId> {
        let tids = self.tids_matching(tags, which);
        if tids.is_empty() {
            return Err(CoreError::TagNotFound {
                tags: tags.iter().map(|s| s.to_string()).collect(),
            });
        }
        if tids.len() == 1 {
            return Ok(tids[0]);
        }
        let mut pool = Vec::with_capacity(tids.len());
        for tid in &tids {
            if let Some(t) = self.tensors.remove(tid) {
                pool.push(t);
            }
        }
        let merged = contract_all(pool)?;
        Ok(self.add_tensor(merged))
    }

    /// Contract the tensor selected by `tags_a` with the one selected by
    /// `tags_b` (each selection must be unique).
    pub fn contract_between(&mut self, tags_a: &[&str], tags_b: &[&str]) -> Result<TensorId> {
        let a = self.tid_unique(tags_a)?;
        let b = self.tid_unique(tags_b)?;
        if a == b {
            return Ok(a);
        }
        let ta = self.remove(a).ok_or(CoreError::TagNotFound {
            tags: tags_a.iter().map(|s| s.to_string()).collect(),
        })?;
        let tb = self.remove(b).ok_or(CoreError::TagNotFound {
            tags: tags_b.iter().map(|s| s.to_string()).collect(),
        })?;
        let merged = contract_pair(&ta, &tb)?;
        Ok(self.add_tensor(merged))
    }

    /// Gauge-fix the bond(s) between two uniquely tagged tensors.
    ///
    /// The first tensor becomes an isometry over its non-shared indices;
    /// the triangular remainder is contracted into the second tensor. The
    /// contracted value of the network is unchanged.
    pub fn canonize_between(&mut self, tags_a: &[&str], tags_b: &[&str]) -> Result<()> {
        let a = self.tid_unique(tags_a)?;
        let b = self.tid_unique(tags_b)?;
        if a == b {
            return Ok(());
        }
        let (ta, tb) = (self.expect(a)?, self.expect(b)?);
        if ta.common_indices(tb).is_empty() {
            return Err(CoreError::NotAdjacent);
        }
        let left = ta.exclusive_indices(tb);
        let (q, r) = qr_split(ta, &left)?;
        let new_b = contract_pair(&r, tb)?;
        let tags_a_set = ta.tags().clone();
        self.tensors.insert(a, q.with_tags(tags_a_set));
        self.tensors.insert(b, new_b);
        Ok(())
    }

    /// Truncate the bond(s) between two uniquely tagged tensors.
    ///
    /// The pair is contracted and re-split by truncated SVD, so several
    /// parallel shared bonds are fused into a single new bond. The
    /// discarded weight is bounded by `params`; `absorb` chooses which side
    /// keeps the singular values.
    pub fn compress_between(
        &mut self,
        tags_a: &[&str],
        tags_b: &[&str],
        params: &TruncationParams,
        absorb: Absorb,
    ) -> Result<()> {
        let a = self.tid_unique(tags_a)?;
        let b = self.tid_unique(tags_b)?;
        if a == b {
            return Ok(());
        }
        let (ta, tb) = (self.expect(a)?, self.expect(b)?);
        if ta.common_indices(tb).is_empty() {
            return Err(CoreError::NotAdjacent);
        }
        let left = ta.exclusive_indices(tb);
        let theta = contract_pair(ta, tb)?;
        let mut split = svd_split(&theta, &left, params)?;

        match absorb {
            Absorb::Left => split.u.scale_index(&split.bond, &split.s)?,
            Absorb::Right => split.vh.scale_index(&split.bond, &split.s)?,
            Absorb::Both => {
                let roots: Vec<f64> = split.s.iter().map(|x| x.sqrt()).collect();
                split.u.scale_index(&split.bond, &roots)?;
                split.vh.scale_index(&split.bond, &roots)?;
            }
        }

        let tags_a_set = self.expect(a)?.tags().clone();
        let tags_b_set = self.expect(b)?.tags().clone();
        self.tensors.insert(a, split.u.with_tags(tags_a_set));
        self.tensors.insert(b, split.vh.with_tags(tags_b_set));
        Ok(())
    }

    /// Indices shared between two tensors.
    pub fn shared_indices(&self, a: TensorId, b: TensorId) -> Result<Vec<Index>> {
        Ok(self.expect(a)?.common_indices(self.expect(b)?))
    }

    /// Dimension of the index labeled `label`, wherever it occurs.
    pub fn ind_size(&self, label: &str) -> Result<usize> {
        self.tensors
            .values()
            .find_map(|t| t.index_with_label(label).map(|ix| ix.dim))
            .ok_or_else(|| CoreError::LabelNotFound(label.to_string()))
    }

    /// Rename an index label everywhere it occurs.
    pub fn relabel(&mut self, old: &str, new: &str) {
        for t in self.tensors.values_mut() {
            t.relabel_index(old, new);
        }
    }

    /// Contract the entire network down to one tensor.
    pub fn contract_all_tensors(&self) -> Result<Tensor<T>> {
        contract_all(self.tensors.values().cloned().collect())
    }

    /// Contract everything and materialize the dense array with axes in
    /// the order of the given labels.
    pub fn to_dense(&self, labels: &[&str]) -> Result<ArrayD<T>> {
        let full = self.contract_all_tensors()?;
        let mut order = Vec::with_capacity(labels.len());
        for label in labels {
            let ix = full
                .index_with_label(label)
                .ok_or_else(|| CoreError::LabelNotFound(label.to_string()))?;
            order.push(ix.clone());
        }
        full.permuted_dense(&order)
    }

    fn expect(&self, tid: TensorId) -> Result<&Tensor<T>> {
        self.tensors.get(&tid).ok_or(CoreError::TagNotFound {
            tags: vec![format!("#{tid}")],
        })
    }
}
