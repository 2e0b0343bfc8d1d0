use approx::assert_relative_eq;
use ndarray::{ArrayD, IxDyn};
use peps2d_core::{Index, Tensor};

use peps2d_boundary::{Peps, TagScheme, TensorNetwork2D};

#[test]
fn tag_enumeration_and_bond_coos() {
    let psi = Peps::<f64>::rand(2, 3, 2, 2, 31).unwrap();

    assert_eq!(psi.row_tags(), vec!["ROW0", "ROW1"]);
    assert_eq!(psi.col_tags(), vec!["COL0", "COL1", "COL2"]);
    assert_eq!(psi.site_tags().len(), 6);
    assert_eq!(psi.site_tags()[0], "I0,0");

    // 2x3 lattice: 3 vertical + 4 horizontal bonds
    let bonds = psi.gen_bond_coos();
    assert_eq!(bonds.len(), 7);
    assert!(bonds.contains(&((0, 0), (1, 0))));
    assert!(bonds.contains(&((1, 1), (1, 2))));

    // wrapped line tags
    assert_eq!(psi.row_tag(-1), "ROW1");
    assert_eq!(psi.col_tag(3), "COL0");
}

#[test]
fn site_refs_resolve_coords_and_tags() {
    let psi = Peps::<f64>::rand(2, 2, 2, 2, 32).unwrap();
    assert_eq!(psi.resolve((1, 1)), "I1,1");
    assert_eq!(psi.resolve("I1,1"), "I1,1");
    let by_coord = psi.site((1i64, 1i64)).unwrap();
    let by_tag = psi.site("I1,1").unwrap();
    assert_eq!(by_coord.data(), by_tag.data());
}

#[test]
fn custom_tag_scheme() {
    let scheme = TagScheme {
        site: "S{}.{}".to_string(),
        row: "R{}".to_string(),
        col: "C{}".to_string(),
    };
    let mut net = TensorNetwork2D::<f64>::new(1, 2)
        .unwrap()
        .with_tag_scheme(scheme);
    let bond = Index::bond(2);
    let a = Tensor::new(
        vec![bond.clone()],
        ArrayD::from_shape_vec(IxDyn(&[2]), vec![1.0, 2.0]).unwrap(),
    )
    .unwrap();
    let b = Tensor::new(
        vec![bond],
        ArrayD::from_shape_vec(IxDyn(&[2]), vec![3.0, 4.0]).unwrap(),
    )
    .unwrap();
    net.add_tensor_at(0, 0, a);
    net.add_tensor_at(0, 1, b);

    assert_eq!(net.site_tag(0, 1), "S0.1");
    assert!(net.site("S0.0").is_ok());
    let got = net.contract().unwrap().into_scalar().unwrap();
    assert_relative_eq!(got, 11.0);
}

/// A hand-built 1x2 operator network: identity on each site, connected by
/// a trivial bond.
#[test]
fn operator_network_to_dense() {
    let mut net = TensorNetwork2D::<f64>::new(1, 2)
        .unwrap()
        .with_operator_ind_templates("k{},{}", "b{},{}");

    let bond = Index::bond(1);
    for j in 0..2usize {
        let upper = Index::labeled(net.upper_ind(0, j as i64).unwrap(), 2);
        let lower = Index::labeled(net.lower_ind(0, j as i64).unwrap(), 2);
        let eye = ArrayD::from_shape_vec(IxDyn(&[2, 2, 1]), vec![1.0, 0.0, 0.0, 1.0]).unwrap();
        let t = Tensor::new(vec![upper, lower, bond.clone()], eye).unwrap();
        net.add_tensor_at(0, j, t);
    }

    assert_eq!(net.phys_dim(0, 0).unwrap(), 2);
    assert!(net.site_ind(0, 0).is_none());

    // axes: k0,0  k0,1  b0,0  b0,1 — identity as a 4-index kronecker delta
    let dense = net.to_dense().unwrap();
    assert_eq!(dense.shape(), &[2, 2, 2, 2]);
    for a in 0..2 {
        for b in 0..2 {
            for c in 0..2 {
                for d in 0..2 {
                    let expect = if a == c && b == d { 1.0 } else { 0.0 };
                    assert_eq!(dense[IxDyn(&[a, b, c, d])], expect);
                }
            }
        }
    }
}
