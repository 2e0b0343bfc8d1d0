//! Matrix factorizations lifted to tensors.
//!
//! Both entry points unfold the tensor over a caller-chosen index
//! bipartition, factorize the resulting matrix with `nalgebra`, and refold
//! the factors with a freshly generated bond index between them.

use nalgebra::DMatrix;

use crate::error::{CoreError, Result};
use crate::index::Index;
use crate::scalar::TnScalar;
use crate::tensor::Tensor;
use crate::truncation::{retained_rank, TruncationParams};

/// Split `t` as `Q * R` with `Q` isometric over the `left` index group.
///
/// Returns `(q, r)` where `q` has indices `[left..., bond]` and `r` has
/// `[bond, rest...]`. Contracting them reproduces `t` exactly; the norm of
/// the tensor moves entirely into `r`, which is what a gauge-fixing sweep
/// pushes along a line.
pub fn qr_split<T: TnScalar>(t: &Tensor<T>, left: &[Index]) -> Result<(Tensor<T>, Tensor<T>)> {
    let right = complement(t, left)?;
    let mat = t.to_matrix(left, &right)?;
    let (q, r) = mat.qr().unpack();

    let bond = Index::bond(q.ncols());
    let qt = Tensor::from_matrix(left.to_vec(), vec![bond.clone()], &q)?;
    let rt = Tensor::from_matrix(vec![bond], right, &r)?;
    Ok((qt, rt))
}

/// Result of a truncated SVD split.
#[derive(Debug, Clone)]
pub struct SvdSplit<T: TnScalar> {
    /// Left isometry, indices `[left..., bond]`.
    pub u: Tensor<T>,
    /// Retained singular values, descending.
    pub s: Vec<f64>,
    /// Right isometry (conjugate-transposed), indices `[bond, rest...]`.
    pub vh: Tensor<T>,
    /// The new bond index connecting `u` and `vh`.
    pub bond: Index,
}

/// Truncated SVD of `t` over the `left` index group.
///
/// The retained rank follows `params` (relative discarded weight and/or a
/// rank cap); the singular values are returned separately so the caller
/// decides which side absorbs them.
pub fn svd_split<T: TnScalar>(
    t: &Tensor<T>,
    left: &[Index],
    params: &TruncationParams,
) -> Result<SvdSplit<T>> {
    let right = complement(t, left)?;
    let mat = t.to_matrix(left, &right)?;
    let (m, n) = (mat.nrows(), mat.ncols());

    let svd = mat
        .try_svd(true, true, f64::EPSILON, 0)
        .ok_or(CoreError::SvdFailed)?;
    let u_full = svd.u.ok_or(CoreError::SvdFailed)?;
    let vt_full = svd.v_t.ok_or(CoreError::SvdFailed)?;

    // nalgebra does not guarantee ordering of the singular values
    let k = svd.singular_values.len();
    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&a, &b| {
        svd.singular_values[b]
            .partial_cmp(&svd.singular_values[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let sorted: Vec<f64> = order.iter().map(|&i| svd.singular_values[i]).collect();

    let r = retained_rank(&sorted, params);
    let s = sorted[..r].to_vec();

    let u_mat = DMatrix::from_fn(m, r, |i, c| u_full[(i, order[c])]);
    let vh_mat = DMatrix::from_fn(r, n, |c, j| vt_full[(order[c], j)]);

    let bond = Index::bond(r);
    let u = Tensor::from_matrix(left.to_vec(), vec![bond.clone()], &u_mat)?;
    let vh = Tensor::from_matrix(vec![bond.clone()], right, &vh_mat)?;
    Ok(SvdSplit { u, s, vh, bond })
}

/// Indices of `t` not contained in `left`, in axis order.
fn complement<T: TnScalar>(t: &Tensor<T>, left: &[Index]) -> Result<Vec<Index>> {
    for ix in left {
        if !t.has_index(ix) {
            return Err(CoreError::UnknownIndex);
        }
    }
    Ok(t.indices()
        .iter()
        .filter(|ix| !left.contains(ix))
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::contract_pair;
    use approx::assert_relative_eq;
    use ndarray::{ArrayD, IxDyn};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_tensor(dims: &[usize], seed: u64) -> Tensor<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let indices: Vec<Index> = dims.iter().map(|&d| Index::bond(d)).collect();
        let total: usize = dims.iter().product();
        let vals: Vec<f64> = (0..total).map(|_| rng.gen::<f64>() * 2.0 - 1.0).collect();
        let data = ArrayD::from_shape_vec(IxDyn(dims), vals).unwrap();
        Tensor::new(indices, data).unwrap()
    }

    fn assert_tensors_close(a: &Tensor<f64>, b: &Tensor<f64>) {
        let order = a.indices().to_vec();
        let da = a.permuted_dense(&order).unwrap();
        let db = b.permuted_dense(&order).unwrap();
        for (x, y) in da.iter().zip(db.iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-10, max_relative = 1e-8);
        }
    }

    #[test]
    fn qr_reconstructs() {
        let t = random_tensor(&[2, 3, 4], 7);
        let left = t.indices()[..2].to_vec();
        let (q, r) = qr_split(&t, &left).unwrap();
        let back = contract_pair(&q, &r).unwrap();
        assert_tensors_close(&t, &back);
    }

    #[test]
    fn qr_is_isometric() {
        let t = random_tensor(&[3, 4, 2], 11);
        let left = t.indices()[..2].to_vec();
        let (q, _) = qr_split(&t, &left).unwrap();

        // Q^T Q should be the identity on the bond
        let qc = q.conj();
        let m = {
            let bond = q.indices().last().unwrap().clone();
            let rows = q.indices()[..2].to_vec();
            let qm = q.to_matrix(&rows, &[bond.clone()]).unwrap();
            let qcm = qc.to_matrix(&rows, &[bond]).unwrap();
            qcm.transpose() * qm
        };
        for i in 0..m.nrows() {
            for j in 0..m.ncols() {
                let expect = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(m[(i, j)], expect, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn svd_exact_reconstructs() {
        let t = random_tensor(&[3, 2, 4], 13);
        let left = t.indices()[..1].to_vec();
        let mut split = svd_split(&t, &left, &TruncationParams::new()).unwrap();
        split.vh.scale_index(&split.bond, &split.s).unwrap();
        let back = contract_pair(&split.u, &split.vh).unwrap();
        assert_tensors_close(&t, &back);
    }

    #[test]
    fn svd_rank_cap() {
        let t = random_tensor(&[4, 4], 17);
        let left = t.indices()[..1].to_vec();
        let params = TruncationParams::new().with_max_rank(2);
        let split = svd_split(&t, &left, &params).unwrap();
        assert_eq!(split.bond.dim, 2);
        assert_eq!(split.s.len(), 2);
        // descending order
        assert!(split.s[0] >= split.s[1]);
    }

    #[test]
    fn svd_unknown_index_errors() {
        let t = random_tensor(&[2, 2], 19);
        let stray = Index::bond(2);
        assert!(svd_split(&t, &[stray], &TruncationParams::new()).is_err());
    }
}
