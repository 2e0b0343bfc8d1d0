//! Dense tensors with named indices and tags.

use nalgebra::DMatrix;
use ndarray::{ArrayD, IxDyn};

use crate::error::{CoreError, Result};
use crate::index::Index;
use crate::scalar::TnScalar;
use crate::tags::TagSet;

/// A dense tensor: ordered index list, data and tags.
///
/// The axis order of `data` always matches the order of `indices`. Indices
/// are compared by identity, so two tensors are "adjacent" exactly when
/// their index lists intersect.
#[derive(Debug, Clone)]
pub struct Tensor<T: TnScalar> {
    indices: Vec<Index>,
    data: ArrayD<T>,
    tags: TagSet,
}

impl<T: TnScalar> Tensor<T> {
    /// Create a tensor, checking that `data`'s shape matches the index
    /// dimensions.
    pub fn new(indices: Vec<Index>, data: ArrayD<T>) -> Result<Self> {
        let dims: Vec<usize> = indices.iter().map(|ix| ix.dim).collect();
        if data.shape() != dims.as_slice() {
            return Err(CoreError::ShapeMismatch {
                shape: data.shape().to_vec(),
                dims,
            });
        }
        Ok(Self {
            indices,
            data,
            tags: TagSet::new(),
        })
    }

    /// Create a rank-0 (scalar) tensor.
    pub fn from_scalar(value: T) -> Self {
        Self {
            indices: Vec::new(),
            data: ArrayD::from_elem(IxDyn(&[]), value),
            tags: TagSet::new(),
        }
    }

    /// Attach tags, builder style.
    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    /// The ordered index list.
    pub fn indices(&self) -> &[Index] {
        &self.indices
    }

    /// The raw data array.
    pub fn data(&self) -> &ArrayD<T> {
        &self.data
    }

    /// The tag set.
    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Mutable access to the tag set.
    pub fn tags_mut(&mut self) -> &mut TagSet {
        &mut self.tags
    }

    /// Number of indices.
    pub fn ndim(&self) -> usize {
        self.indices.len()
    }

    /// Axis position of `index`, if present.
    pub fn position_of(&self, index: &Index) -> Option<usize> {
        self.indices.iter().position(|ix| ix == index)
    }

    /// Whether `index` belongs to this tensor.
    pub fn has_index(&self, index: &Index) -> bool {
        self.position_of(index).is_some()
    }

    /// The index carrying `label`, if any.
    pub fn index_with_label(&self, label: &str) -> Option<&Index> {
        self.indices.iter().find(|ix| ix.has_label(label))
    }

    /// Indices shared with `other`, in this tensor's axis order.
    pub fn common_indices(&self, other: &Self) -> Vec<Index> {
        self.indices
            .iter()
            .filter(|ix| other.has_index(ix))
            .cloned()
            .collect()
    }

    /// Indices of this tensor not shared with `other`, in axis order.
    pub fn exclusive_indices(&self, other: &Self) -> Vec<Index> {
        self.indices
            .iter()
            .filter(|ix| !other.has_index(ix))
            .cloned()
            .collect()
    }

    /// Elementwise complex conjugate, same indices and tags.
    pub fn conj(&self) -> Self {
        Self {
            indices: self.indices.clone(),
            data: self.data.mapv(|v| v.conjugate()),
            tags: self.tags.clone(),
        }
    }

    /// Extract the single element of a tensor with total size one.
    ///
    /// Accepts any rank as long as every dimension is 1, so fully
    /// contracted networks with leftover singleton indices still collapse
    /// to a number.
    pub fn into_scalar(self) -> Result<T> {
        if self.data.len() != 1 {
            return Err(CoreError::NotScalar(self.data.len()));
        }
        Ok(self.data.iter().copied().next().unwrap_or_else(T::zero))
    }

    /// Replace the label of any index currently labeled `old` with `new`.
    pub fn relabel_index(&mut self, old: &str, new: &str) {
        for ix in &mut self.indices {
            if ix.has_label(old) {
                ix.label = Some(new.to_string());
            }
        }
    }

    /// Multiply slices along `index` by real `weights` (one per slice).
    ///
    /// Used to absorb singular values into one side of a split.
    pub fn scale_index(&mut self, index: &Index, weights: &[f64]) -> Result<()> {
        let axis = self.position_of(index).ok_or(CoreError::UnknownIndex)?;
        if weights.len() != self.indices[axis].dim {
            return Err(CoreError::ShapeMismatch {
                shape: vec![weights.len()],
                dims: vec![self.indices[axis].dim],
            });
        }
        for (ix, v) in self.data.indexed_iter_mut() {
            *v *= <T as TnScalar>::from_f64(weights[ix[axis]]);
        }
        Ok(())
    }

    /// Unfold into a matrix with `rows` indices flattened as rows and
    /// `cols` indices flattened as columns.
    ///
    /// `rows` and `cols` together must be a permutation of the tensor's
    /// indices; either group may be empty (producing a 1 x n or m x 1
    /// matrix).
    pub fn to_matrix(&self, rows: &[Index], cols: &[Index]) -> Result<DMatrix<T>> {
        let perm = self.permutation_for(rows, cols)?;
        let m: usize = rows.iter().map(|ix| ix.dim).product();
        let n: usize = cols.iter().map(|ix| ix.dim).product();
        let v = gather(&self.data, &perm);
        Ok(DMatrix::from_row_slice(m, n, &v))
    }

    /// Refold a matrix produced by [`Tensor::to_matrix`]-style unfolding
    /// back into a tensor with indices `rows ++ cols`.
    pub fn from_matrix(rows: Vec<Index>, cols: Vec<Index>, mat: &DMatrix<T>) -> Result<Self> {
        let dims: Vec<usize> = rows.iter().chain(cols.iter()).map(|ix| ix.dim).collect();
        let total: usize = dims.iter().product();
        let mut v = Vec::with_capacity(total);
        for i in 0..mat.nrows() {
            for j in 0..mat.ncols() {
                v.push(mat[(i, j)]);
            }
        }
        let data = ArrayD::from_shape_vec(IxDyn(&dims), v).map_err(|_| {
            CoreError::ShapeMismatch {
                shape: vec![mat.nrows(), mat.ncols()],
                dims: dims.clone(),
            }
        })?;
        let mut indices = rows;
        indices.extend(cols);
        Tensor::new(indices, data)
    }

    /// Dense data permuted to the given index order.
    pub fn permuted_dense(&self, order: &[Index]) -> Result<ArrayD<T>> {
        let perm = self.permutation_for(order, &[])?;
        let dims: Vec<usize> = order.iter().map(|ix| ix.dim).collect();
        let v = gather(&self.data, &perm);
        ArrayD::from_shape_vec(IxDyn(&dims), v).map_err(|_| CoreError::ShapeMismatch {
            shape: self.data.shape().to_vec(),
            dims,
        })
    }

    /// Map `head ++ tail` onto axis positions, checking it is a
    /// permutation of this tensor's indices.
    fn permutation_for(&self, head: &[Index], tail: &[Index]) -> Result<Vec<usize>> {
        if head.len() + tail.len() != self.indices.len() {
            return Err(CoreError::UnknownIndex);
        }
        let mut perm = Vec::with_capacity(self.indices.len());
        for ix in head.iter().chain(tail.iter()) {
            perm.push(self.position_of(ix).ok_or(CoreError::UnknownIndex)?);
        }
        let mut seen = vec![false; perm.len()];
        for &p in &perm {
            if seen[p] {
                return Err(CoreError::UnknownIndex);
            }
            seen[p] = true;
        }
        Ok(perm)
    }
}

/// Read `data` out in row-major order of the permuted axes `perm`
/// (output axis `k` walks input axis `perm[k]`).
fn gather<T: TnScalar>(data: &ArrayD<T>, perm: &[usize]) -> Vec<T> {
    let dims: Vec<usize> = perm.iter().map(|&p| data.shape()[p]).collect();
    let total: usize = dims.iter().product();
    let mut out = Vec::with_capacity(total);
    let mut odo = vec![0usize; dims.len()];
    let mut src = vec![0usize; dims.len()];
    for _ in 0..total {
        for (k, &p) in perm.iter().enumerate() {
            src[p] = odo[k];
        }
        out.push(data[IxDyn(&src)]);
        for k in (0..dims.len()).rev() {
            odo[k] += 1;
            if odo[k] < dims[k] {
                break;
            }
            odo[k] = 0;
        }
    }
    out
}
