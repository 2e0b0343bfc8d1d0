use approx::assert_relative_eq;
use ndarray::{ArrayD, IxDyn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use peps2d_core::{
    Absorb, Index, TagMatch, TagSet, Tensor, TensorNetwork, TruncationParams,
};

fn random_tensor(indices: Vec<Index>, tags: &[&str], rng: &mut ChaCha8Rng) -> Tensor<f64> {
    let dims: Vec<usize> = indices.iter().map(|ix| ix.dim).collect();
    let total: usize = dims.iter().product();
    let vals: Vec<f64> = (0..total).map(|_| rng.gen::<f64>() * 2.0 - 1.0).collect();
    let data = ArrayD::from_shape_vec(IxDyn(&dims), vals).unwrap();
    Tensor::new(indices, data)
        .unwrap()
        .with_tags(tags.iter().copied().collect::<TagSet>())
}

/// A three-site chain `A -- M -- B` with open boundary vectors, so the
/// fully contracted network is a scalar.
fn chain(seed: u64) -> TensorNetwork<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let ij = Index::bond(3);
    let jk = Index::bond(4);
    let mut tn = TensorNetwork::new();
    tn.add_tensor(random_tensor(vec![ij.clone()], &["A", "EDGE"], &mut rng));
    tn.add_tensor(random_tensor(vec![ij, jk.clone()], &["M"], &mut rng));
    tn.add_tensor(random_tensor(vec![jk], &["B", "EDGE"], &mut rng));
    tn
}

fn value(tn: &TensorNetwork<f64>) -> f64 {
    tn.contract_all_tensors().unwrap().into_scalar().unwrap()
}

#[test]
fn contract_tags_merges_and_unions() {
    let mut tn = chain(1);
    let before = value(&tn);

    let tid = tn.contract_tags(&["EDGE"], TagMatch::Any).unwrap();
    assert_eq!(tn.len(), 2);
    let merged = tn.tensor(tid).unwrap();
    assert!(merged.tags().contains("A"));
    assert!(merged.tags().contains("B"));
    let listed: Vec<&str> = merged.tags().iter().collect();
    assert!(listed.contains(&"EDGE"));

    assert_relative_eq!(value(&tn), before, max_relative = 1e-10);
}

#[test]
fn unique_selection_errors() {
    let tn = chain(2);
    assert!(tn.tid_unique(&["EDGE"]).is_err());
    assert!(tn.tid_unique(&["MISSING"]).is_err());
    assert!(tn.tid_unique(&["M"]).is_ok());
}

#[test]
fn canonize_preserves_value() {
    let mut tn = chain(3);
    let before = value(&tn);
    tn.canonize_between(&["A"], &["M"]).unwrap();
    assert_relative_eq!(value(&tn), before, max_relative = 1e-8);

    // non-adjacent pair is rejected
    assert!(tn.canonize_between(&["A"], &["B"]).is_err());
}

#[test]
fn compress_without_truncation_preserves_value() {
    let mut tn = chain(4);
    let before = value(&tn);
    tn.compress_between(&["A"], &["M"], &TruncationParams::new(), Absorb::Right)
        .unwrap();
    assert_relative_eq!(value(&tn), before, max_relative = 1e-8);
}

#[test]
fn compress_caps_bond_dimension() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let i = Index::bond(2);
    let jk = Index::bond(6);
    let l = Index::bond(2);
    let mut tn = TensorNetwork::new();
    tn.add_tensor(random_tensor(vec![i.clone(), jk.clone()], &["L"], &mut rng));
    tn.add_tensor(random_tensor(vec![jk, l.clone()], &["R"], &mut rng));

    let params = TruncationParams::new().with_max_rank(2);
    tn.compress_between(&["L"], &["R"], &params, Absorb::Both).unwrap();

    let tl = tn.select(&["L"]).unwrap();
    let tr = tn.select(&["R"]).unwrap();
    let shared = tl.common_indices(tr);
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].dim, 2);
}

#[test]
fn to_dense_orders_axes_by_label() {
    let a = Index::labeled("a", 2);
    let b = Index::labeled("b", 3);
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let mut tn = TensorNetwork::new();
    tn.add_tensor(random_tensor(vec![a, b], &["T"], &mut rng));

    let ab = tn.to_dense(&["a", "b"]).unwrap();
    let ba = tn.to_dense(&["b", "a"]).unwrap();
    assert_eq!(ab.shape(), &[2, 3]);
    assert_eq!(ba.shape(), &[3, 2]);
    for i in 0..2 {
        for j in 0..3 {
            assert_eq!(ab[IxDyn(&[i, j])], ba[IxDyn(&[j, i])]);
        }
    }

    assert!(tn.to_dense(&["missing"]).is_err());
}
