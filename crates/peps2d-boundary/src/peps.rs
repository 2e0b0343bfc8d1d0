//! Projected entangled pair states on the square lattice.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use ndarray::{ArrayD, IxDyn};
use peps2d_core::{CoreError, Index, IndexId, Tensor, TnScalar};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{BoundaryError, Result};
use crate::lattice::fill;
use crate::network2d::TensorNetwork2D;

/// Tag of the ket layer in a norm network.
pub const KET_TAG: &str = "KET";
/// Tag of the bra layer in a norm network.
pub const BRA_TAG: &str = "BRA";

/// Default physical index label template.
const SITE_IND: &str = "k{},{}";

/// A PEPS: one tensor per square-lattice site, virtual bonds between
/// nearest neighbors and one physical index per site.
///
/// Derefs to [`TensorNetwork2D`], so all lattice addressing, sweeping and
/// boundary contraction methods apply directly.
#[derive(Debug, Clone)]
pub struct Peps<T: TnScalar> {
    inner: TensorNetwork2D<T>,
}

impl<T: TnScalar> Deref for Peps<T> {
    type Target = TensorNetwork2D<T>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T: TnScalar> DerefMut for Peps<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<T: TnScalar> Peps<T> {
    /// Build a PEPS from a rectangular grid of per-site arrays.
    ///
    /// Each array's axes are ordered up, right, down, left, physical, with
    /// out-of-lattice axes omitted (so a corner site has two virtual axes
    /// and the physical one). Neighboring arrays must agree on the shared
    /// bond dimension.
    pub fn from_arrays(arrays: Vec<Vec<ArrayD<T>>>) -> Result<Self> {
        let lx = arrays.len();
        if lx == 0 {
            return Err(BoundaryError::BadLattice);
        }
        let ly = arrays[0].len();
        if ly == 0 || arrays.iter().any(|row| row.len() != ly) {
            return Err(BoundaryError::BadLattice);
        }

        let mut net = TensorNetwork2D::new(lx, ly)?.with_site_ind_template(SITE_IND);
        let mut bonds: HashMap<((usize, usize), (usize, usize)), Index> = HashMap::new();

        for (i, row) in arrays.into_iter().enumerate() {
            for (j, arr) in row.into_iter().enumerate() {
                let mut indices = Vec::with_capacity(arr.ndim());
                let mut axis = 0;
                if i + 1 < lx {
                    indices.push(bond_at(&mut bonds, ((i, j), (i + 1, j)), &arr, axis)?);
                    axis += 1;
                }
                if j + 1 < ly {
                    indices.push(bond_at(&mut bonds, ((i, j), (i, j + 1)), &arr, axis)?);
                    axis += 1;
                }
                if i > 0 {
                    indices.push(bond_at(&mut bonds, ((i - 1, j), (i, j)), &arr, axis)?);
                    axis += 1;
                }
                if j > 0 {
                    indices.push(bond_at(&mut bonds, ((i, j - 1), (i, j)), &arr, axis)?);
                    axis += 1;
                }
                if arr.ndim() != axis + 1 {
                    return Err(BoundaryError::Core(CoreError::ShapeMismatch {
                        shape: arr.shape().to_vec(),
                        dims: indices.iter().map(|ix| ix.dim).collect(),
                    }));
                }
                indices.push(Index::labeled(fill(SITE_IND, &[i, j]), arr.shape()[axis]));

                let tensor = Tensor::new(indices, arr)?;
                net.add_tensor_at(i, j, tensor);
            }
        }
        Ok(Self { inner: net })
    }

    /// A reproducible random PEPS with uniform bond dimension.
    ///
    /// Entries are drawn uniformly and each site tensor is normalized to
    /// unit Frobenius norm, keeping contraction values of moderate size.
    pub fn rand(
        lx: usize,
        ly: usize,
        bond_dim: usize,
        phys_dim: usize,
        seed: u64,
    ) -> Result<Self> {
        if lx == 0 || ly == 0 || bond_dim == 0 || phys_dim == 0 {
            return Err(BoundaryError::BadLattice);
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut arrays = Vec::with_capacity(lx);
        for i in 0..lx {
            let mut row = Vec::with_capacity(ly);
            for j in 0..ly {
                let mut dims = Vec::new();
                if i + 1 < lx {
                    dims.push(bond_dim);
                }
                if j + 1 < ly {
                    dims.push(bond_dim);
                }
                if i > 0 {
                    dims.push(bond_dim);
                }
                if j > 0 {
                    dims.push(bond_dim);
                }
                dims.push(phys_dim);

                let total: usize = dims.iter().product();
                let mut vals: Vec<T> =
                    (0..total).map(|_| T::sample_uniform(&mut rng)).collect();
                let norm = vals.iter().map(|v| v.abs_sq()).sum::<f64>().sqrt();
                if norm > 0.0 {
                    let scale = <T as TnScalar>::from_f64(1.0 / norm);
                    for v in &mut vals {
                        *v *= scale;
                    }
                }
                let arr = ArrayD::from_shape_vec(IxDyn(&dims), vals)
                    .map_err(|_| BoundaryError::BadLattice)?;
                row.push(arr);
            }
            arrays.push(row);
        }
        Self::from_arrays(arrays)
    }

    /// The closed bra-ket double-layer network `<psi|psi>`.
    ///
    /// Ket tensors are shared as-is and tagged [`KET_TAG`]; the bra layer
    /// holds their conjugates with duplicated virtual bonds, tagged
    /// [`BRA_TAG`]. Physical indices are shared between the layers, so the
    /// full contraction gives the squared norm. This is the canonical input
    /// of the multi-layer boundary contraction mode.
    pub fn norm_network(&self) -> Result<TensorNetwork2D<T>> {
        let mut net = TensorNetwork2D::new(self.lx(), self.ly())?;
        let mut bra_bonds: HashMap<IndexId, Index> = HashMap::new();

        for (i, j) in self.gen_site_coos() {
            let ket = self.site((i as i64, j as i64))?.clone();

            let conj = ket.conj();
            // virtual bonds are unlabeled; physical indices keep their
            // identity so the layers contract against each other
            let bra_indices: Vec<Index> = conj
                .indices()
                .iter()
                .map(|ix| {
                    if ix.label.is_some() {
                        ix.clone()
                    } else {
                        bra_bonds
                            .entry(ix.id)
                            .or_insert_with(|| Index::bond(ix.dim))
                            .clone()
                    }
                })
                .collect();
            let bra = Tensor::new(bra_indices, conj.data().clone())?;

            let ket_tid = net.add_tensor_at(i, j, ket);
            let bra_tid = net.add_tensor_at(i, j, bra);
            if let Some(t) = net.tn_mut().tensor_mut(ket_tid) {
                t.tags_mut().insert(KET_TAG);
            }
            if let Some(t) = net.tn_mut().tensor_mut(bra_tid) {
                t.tags_mut().insert(BRA_TAG);
            }
        }
        Ok(net)
    }
}

/// Look up or create the bond between two neighboring sites, checking the
/// dimension against the array axis.
fn bond_at<T: TnScalar>(
    bonds: &mut HashMap<((usize, usize), (usize, usize)), Index>,
    key: ((usize, usize), (usize, usize)),
    arr: &ArrayD<T>,
    axis: usize,
) -> Result<Index> {
    let dim = *arr
        .shape()
        .get(axis)
        .ok_or(BoundaryError::Core(CoreError::ShapeMismatch {
            shape: arr.shape().to_vec(),
            dims: vec![],
        }))?;
    let ix = bonds.entry(key).or_insert_with(|| Index::bond(dim));
    if ix.dim != dim {
        return Err(BoundaryError::Core(CoreError::ShapeMismatch {
            shape: arr.shape().to_vec(),
            dims: vec![ix.dim],
        }));
    }
    Ok(ix.clone())
}
