use approx::assert_relative_eq;
use ndarray::{ArrayD, IxDyn};
use peps2d_core::Index;

use peps2d_boundary::{BoundaryError, BoundaryOptions, Peps, BRA_TAG, KET_TAG};

/// A 3x3 network of scalar-like sites (all bond and physical dimensions 1)
/// contracts to the product of the site values.
#[test]
fn product_grid_contracts_to_product() {
    let mut arrays = Vec::new();
    let mut product = 1.0;
    for i in 0..3usize {
        let mut row = Vec::new();
        for j in 0..3usize {
            let v = 1.0 + (3 * i + j) as f64 / 10.0;
            product *= v;
            let naxes = 1
                + usize::from(i < 2)
                + usize::from(j < 2)
                + usize::from(i > 0)
                + usize::from(j > 0);
            let arr = ArrayD::from_elem(IxDyn(&vec![1; naxes]), v);
            row.push(arr);
        }
        arrays.push(row);
    }
    let psi = Peps::<f64>::from_arrays(arrays).unwrap();

    let result = psi.contract_boundary(&BoundaryOptions::new()).unwrap();
    let got = result.into_tensor().unwrap().into_scalar().unwrap();
    assert_relative_eq!(got, product, max_relative = 1e-10);
}

/// Without truncation the boundary contraction is exact: the residual
/// tensor agrees with the full dense contraction.
#[test]
fn untruncated_boundary_is_exact() {
    let psi = Peps::<f64>::rand(3, 3, 2, 2, 21).unwrap();
    let dense = psi.to_dense().unwrap();

    let result = psi.contract_boundary(&BoundaryOptions::new()).unwrap();
    let t = result.into_tensor().unwrap();

    // reorder the residual's open indices into row-major site order
    let mut order: Vec<Index> = Vec::new();
    for (i, j) in psi.gen_site_coos() {
        let label = psi.site_ind(i as i64, j as i64).unwrap();
        order.push(t.index_with_label(&label).unwrap().clone());
    }
    let got = t.permuted_dense(&order).unwrap();

    assert_eq!(got.shape(), dense.shape());
    for (x, y) in got.iter().zip(dense.iter()) {
        assert_relative_eq!(x, y, epsilon = 1e-10, max_relative = 1e-8);
    }
}

#[test]
fn truncated_boundary_runs_and_stays_finite() {
    let psi = Peps::<f64>::rand(4, 4, 3, 2, 22).unwrap();
    let opts = BoundaryOptions::new().with_max_bond(2).with_cutoff(1e-10);
    let t = psi
        .contract_boundary(&opts)
        .unwrap()
        .into_tensor()
        .unwrap();
    assert!(t.data().iter().all(|v| v.is_finite()));
}

#[test]
fn single_direction_sequence() {
    let psi = Peps::<f64>::rand(4, 3, 2, 2, 23).unwrap();
    let dense = psi.to_dense().unwrap();

    let opts = BoundaryOptions::new().with_sequence("b").unwrap();
    let t = psi
        .contract_boundary(&opts)
        .unwrap()
        .into_tensor()
        .unwrap();

    let mut order: Vec<Index> = Vec::new();
    for (i, j) in psi.gen_site_coos() {
        let label = psi.site_ind(i as i64, j as i64).unwrap();
        order.push(t.index_with_label(&label).unwrap().clone());
    }
    let got = t.permuted_dense(&order).unwrap();
    for (x, y) in got.iter().zip(dense.iter()) {
        assert_relative_eq!(x, y, epsilon = 1e-10, max_relative = 1e-8);
    }
}

#[test]
fn no_canonize_and_wider_strip_still_exact() {
    let psi = Peps::<f64>::rand(4, 4, 2, 2, 27).unwrap();
    let dense = psi.to_dense().unwrap();

    let opts = BoundaryOptions::new()
        .without_canonize()
        .with_max_separation(2)
        .with_frontiers(Some(0), Some(3), Some(0), Some(3));
    let t = psi
        .contract_boundary(&opts)
        .unwrap()
        .into_tensor()
        .unwrap();

    let mut order: Vec<Index> = Vec::new();
    for (i, j) in psi.gen_site_coos() {
        let label = psi.site_ind(i as i64, j as i64).unwrap();
        order.push(t.index_with_label(&label).unwrap().clone());
    }
    let got = t.permuted_dense(&order).unwrap();
    for (x, y) in got.iter().zip(dense.iter()) {
        assert_relative_eq!(x, y, epsilon = 1e-10, max_relative = 1e-8);
    }
}

#[test]
fn invalid_sequence_is_rejected() {
    let err = BoundaryOptions::new().with_sequence("bxq").unwrap_err();
    assert!(matches!(err, BoundaryError::InvalidSequence('x')));
}

/// Contracting around a protected site leaves the surrounding window of
/// the lattice untouched as a network.
#[test]
fn around_stops_at_protected_region() {
    let psi = Peps::<f64>::rand(5, 5, 2, 2, 24).unwrap();
    let center = psi.site((2, 2)).unwrap().clone();

    let opts = BoundaryOptions::new().with_around(vec![(2, 2)]);
    let remaining = psi
        .contract_boundary(&opts)
        .unwrap()
        .into_network()
        .unwrap();

    // frontier stops one line short of the protected site on every side
    assert_eq!(remaining.tn().len(), 9);
    for i in 1..=3i64 {
        for j in 1..=3i64 {
            let tag = remaining.site_tag(i, j);
            assert!(remaining.tn().tid_unique(&[&tag]).is_ok());
        }
    }

    // the protected tensor itself was never modified
    let kept = remaining.site((2, 2)).unwrap();
    assert_eq!(kept.data(), center.data());
    assert_eq!(kept.indices(), center.indices());
}

/// Multi-layer contraction of the bra-ket norm network reproduces the
/// squared norm.
#[test]
fn multilayer_norm_contraction() {
    let psi = Peps::<f64>::rand(3, 3, 2, 2, 25).unwrap();
    let dense = psi.to_dense().unwrap();
    let expect: f64 = dense.iter().map(|v| v * v).sum();

    let norm = psi.norm_network().unwrap();
    let opts = BoundaryOptions::new().with_layer_tags([KET_TAG, BRA_TAG]);
    let got = norm
        .contract_boundary(&opts)
        .unwrap()
        .into_tensor()
        .unwrap()
        .into_scalar()
        .unwrap();
    assert_relative_eq!(got, expect, max_relative = 1e-8);
}

/// The multi-layer mode with a bond cap runs on a larger norm network.
#[test]
fn multilayer_truncated_runs() {
    let psi = Peps::<f64>::rand(4, 4, 2, 2, 26).unwrap();
    let norm = psi.norm_network().unwrap();
    let opts = BoundaryOptions::new()
        .with_layer_tags([KET_TAG, BRA_TAG])
        .with_max_bond(8);
    let got = norm
        .contract_boundary(&opts)
        .unwrap()
        .into_tensor()
        .unwrap()
        .into_scalar()
        .unwrap();
    // squared norm of a nonzero state
    assert!(got.is_finite());
    assert!(got > 0.0);
}
