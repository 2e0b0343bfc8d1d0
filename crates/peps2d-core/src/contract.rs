//! Exact tensor contraction.

use crate::error::{CoreError, Result};
use crate::scalar::TnScalar;
use crate::tags::TagSet;
use crate::tensor::Tensor;

/// Contract two tensors over all of their shared indices.
///
/// With no shared index this is the outer product. The result's indices are
/// `a`'s exclusive indices followed by `b`'s, and its tags are the union of
/// both tag sets.
pub fn contract_pair<T: TnScalar>(a: &Tensor<T>, b: &Tensor<T>) -> Result<Tensor<T>> {
    let shared = a.common_indices(b);
    let a_keep = a.exclusive_indices(b);
    let b_keep = b.exclusive_indices(a);

    let am = a.to_matrix(&a_keep, &shared)?;
    let bm = b.to_matrix(&shared, &b_keep)?;
    let cm = am * bm;

    let mut tags = TagSet::new();
    tags.union_with(a.tags());
    tags.union_with(b.tags());
    Ok(Tensor::from_matrix(a_keep, b_keep, &cm)?.with_tags(tags))
}

/// Contract a collection of tensors down to one.
///
/// The pair order is chosen greedily: at each step contract the pair whose
/// result has the smallest total size, which keeps intermediate tensors
/// small for the thin residual networks this is used on. Disconnected
/// tensors end up combined by outer products last.
pub fn contract_all<T: TnScalar>(tensors: Vec<Tensor<T>>) -> Result<Tensor<T>> {
    let mut pool: Vec<Tensor<T>> = tensors;
    if pool.is_empty() {
        return Err(CoreError::EmptyContraction);
    }

    while pool.len() > 1 {
        let mut best: Option<(usize, usize, usize)> = None;
        for i in 0..pool.len() {
            for j in (i + 1)..pool.len() {
                let cost = result_size(&pool[i], &pool[j]);
                // prefer connected pairs, then smaller results
                let connected = !pool[i].common_indices(&pool[j]).is_empty();
                let rank = if connected { cost } else { usize::MAX / 2 + cost.min(usize::MAX / 4) };
                match best {
                    Some((_, _, b)) if b <= rank => {}
                    _ => best = Some((i, j, rank)),
                }
            }
        }
        // pool.len() >= 2, so a pair always exists
        let (i, j, _) = best.ok_or(CoreError::EmptyContraction)?;
        let tj = pool.swap_remove(j);
        let ti = pool.swap_remove(i);
        pool.push(contract_pair(&ti, &tj)?);
    }

    pool.pop().ok_or(CoreError::EmptyContraction)
}

/// Total element count of the tensor produced by contracting `a` with `b`.
fn result_size<T: TnScalar>(a: &Tensor<T>, b: &Tensor<T>) -> usize {
    let am: usize = a.exclusive_indices(b).iter().map(|ix| ix.dim).product();
    let bm: usize = b.exclusive_indices(a).iter().map(|ix| ix.dim).product();
    am.saturating_mul(bm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Index;
    use ndarray::{ArrayD, IxDyn};

    fn t(indices: Vec<Index>, vals: Vec<f64>) -> Tensor<f64> {
        let dims: Vec<usize> = indices.iter().map(|ix| ix.dim).collect();
        let data = ArrayD::from_shape_vec(IxDyn(&dims), vals).unwrap();
        Tensor::new(indices, data).unwrap()
    }

    #[test]
    fn matrix_product() {
        let i = Index::bond(2);
        let k = Index::bond(2);
        let j = Index::bond(2);
        let a = t(vec![i.clone(), k.clone()], vec![1., 2., 3., 4.]);
        let b = t(vec![k, j.clone()], vec![5., 6., 7., 8.]);

        let c = contract_pair(&a, &b).unwrap();
        let m = c.to_matrix(&[i], &[j]).unwrap();
        assert_eq!(m[(0, 0)], 19.0);
        assert_eq!(m[(0, 1)], 22.0);
        assert_eq!(m[(1, 0)], 43.0);
        assert_eq!(m[(1, 1)], 50.0);
    }

    #[test]
    fn inner_product_to_scalar() {
        let i = Index::bond(3);
        let a = t(vec![i.clone()], vec![1., 2., 3.]);
        let b = t(vec![i], vec![4., 5., 6.]);
        let c = contract_pair(&a, &b).unwrap();
        assert_eq!(c.into_scalar().unwrap(), 32.0);
    }

    #[test]
    fn outer_product() {
        let i = Index::bond(2);
        let j = Index::bond(3);
        let a = t(vec![i], vec![1., 2.]);
        let b = t(vec![j], vec![1., 10., 100.]);
        let c = contract_pair(&a, &b).unwrap();
        assert_eq!(c.ndim(), 2);
        let flat: Vec<f64> = c.data().iter().copied().collect();
        assert_eq!(flat, vec![1., 10., 100., 2., 20., 200.]);
    }

    #[test]
    fn chain_contraction() {
        // 1 -- 2 -- 3 ring of vectors/matrices reduces to a scalar
        let i = Index::bond(2);
        let j = Index::bond(2);
        let a = t(vec![i.clone()], vec![1., 2.]);
        let m = t(vec![i, j.clone()], vec![1., 0., 0., 1.]);
        let b = t(vec![j], vec![3., 4.]);
        let s = contract_all(vec![a, m, b]).unwrap().into_scalar().unwrap();
        assert_eq!(s, 11.0);
    }

    #[test]
    fn scalar_factor() {
        let i = Index::bond(2);
        let s = Tensor::from_scalar(3.0);
        let v = t(vec![i], vec![1., 2.]);
        let c = contract_pair(&s, &v).unwrap();
        let flat: Vec<f64> = c.data().iter().copied().collect();
        assert_eq!(flat, vec![3., 6.]);
    }

    #[test]
    fn empty_pool_errors() {
        assert!(contract_all(Vec::<Tensor<f64>>::new()).is_err());
    }
}
