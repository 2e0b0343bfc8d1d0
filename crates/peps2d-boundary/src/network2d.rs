//! The 2D lattice view over a tag-addressed tensor network.

use ndarray::ArrayD;
use peps2d_core::{CoreError, Index, Tensor, TensorId, TensorNetwork, TnScalar};

use crate::error::{BoundaryError, Result};
use crate::lattice::{fill, wrap, SiteRef, TagScheme};

/// A square-lattice tensor network.
///
/// Geometry is expressed purely through tags: every tensor at site `(i, j)`
/// carries the site, row and column tags of the [`TagScheme`], and several
/// tensors may share one site (e.g. the two layers of a bra-ket network).
///
/// Physical (open) indices are optional capabilities, configured as label
/// templates: a state-like network has one `site_ind` label per site, an
/// operator-like network an upper and a lower label per site, and a closed
/// network none at all.
#[derive(Debug, Clone)]
pub struct TensorNetwork2D<T: TnScalar> {
    pub(crate) tn: TensorNetwork<T>,
    lx: usize,
    ly: usize,
    tags: TagScheme,
    site_ind: Option<String>,
    upper_ind: Option<String>,
    lower_ind: Option<String>,
}

impl<T: TnScalar> TensorNetwork2D<T> {
    /// Create an empty lattice network of the given extents.
    pub fn new(lx: usize, ly: usize) -> Result<Self> {
        if lx == 0 || ly == 0 {
            return Err(BoundaryError::BadLattice);
        }
        Ok(Self {
            tn: TensorNetwork::new(),
            lx,
            ly,
            tags: TagScheme::default(),
            site_ind: None,
            upper_ind: None,
            lower_ind: None,
        })
    }

    /// Use a non-default tag scheme.
    pub fn with_tag_scheme(mut self, tags: TagScheme) -> Self {
        self.tags = tags;
        self
    }

    /// Declare this a state-like network with the given physical index
    /// label template (two placeholders, e.g. `"k{},{}"`).
    pub fn with_site_ind_template(mut self, template: impl Into<String>) -> Self {
        self.site_ind = Some(template.into());
        self
    }

    /// Declare this an operator-like network with upper and lower physical
    /// index label templates.
    pub fn with_operator_ind_templates(
        mut self,
        upper: impl Into<String>,
        lower: impl Into<String>,
    ) -> Self {
        self.upper_ind = Some(upper.into());
        self.lower_ind = Some(lower.into());
        self
    }

    /// Number of rows.
    pub fn lx(&self) -> usize {
        self.lx
    }

    /// Number of columns.
    pub fn ly(&self) -> usize {
        self.ly
    }

    /// Number of lattice sites.
    pub fn num_sites(&self) -> usize {
        self.lx * self.ly
    }

    /// The underlying tag-addressed network.
    pub fn tn(&self) -> &TensorNetwork<T> {
        &self.tn
    }

    /// Mutable access to the underlying network.
    pub fn tn_mut(&mut self) -> &mut TensorNetwork<T> {
        &mut self.tn
    }

    /// The tag for site `(i, j)`, coordinates wrapped into range.
    pub fn site_tag(&self, i: i64, j: i64) -> String {
        self.tags.site_tag(wrap(i, self.lx), wrap(j, self.ly))
    }

    /// The tag for row `i`, wrapped into range.
    pub fn row_tag(&self, i: i64) -> String {
        self.tags.row_tag(wrap(i, self.lx))
    }

    /// The tag for column `j`, wrapped into range.
    pub fn col_tag(&self, j: i64) -> String {
        self.tags.col_tag(wrap(j, self.ly))
    }

    /// All row tags, bottom to top.
    pub fn row_tags(&self) -> Vec<String> {
        (0..self.lx).map(|i| self.tags.row_tag(i)).collect()
    }

    /// All column tags, left to right.
    pub fn col_tags(&self) -> Vec<String> {
        (0..self.ly).map(|j| self.tags.col_tag(j)).collect()
    }

    /// All site tags in row-major order.
    pub fn site_tags(&self) -> Vec<String> {
        self.gen_site_coos()
            .map(|(i, j)| self.tags.site_tag(i, j))
            .collect()
    }

    /// All site coordinates in row-major order.
    pub fn gen_site_coos(&self) -> impl Iterator<Item = (usize, usize)> {
        let (lx, ly) = (self.lx, self.ly);
        (0..lx).flat_map(move |i| (0..ly).map(move |j| (i, j)))
    }

    /// All nearest-neighbor coordinate pairs, each listed once with the
    /// lower-left site first.
    pub fn gen_bond_coos(&self) -> Vec<((usize, usize), (usize, usize))> {
        let mut coos = Vec::new();
        for (i, j) in self.gen_site_coos() {
            if i + 1 < self.lx {
                coos.push(((i, j), (i + 1, j)));
            }
            if j + 1 < self.ly {
                coos.push(((i, j), (i, j + 1)));
            }
        }
        coos
    }

    /// Resolve a site reference to a tag.
    pub fn resolve(&self, site: impl Into<SiteRef>) -> String {
        match site.into() {
            SiteRef::Coord(i, j) => self.site_tag(i, j),
            SiteRef::Tag(tag) => tag,
        }
    }

    /// The single tensor at `site` (errors when the site holds several).
    pub fn site(&self, site: impl Into<SiteRef>) -> Result<&Tensor<T>> {
        let tag = self.resolve(site);
        Ok(self.tn.select(&[&tag])?)
    }

    /// Add a tensor at site `(i, j)`, attaching its site, row and column
    /// tags on top of any tags it already carries.
    pub fn add_tensor_at(&mut self, i: usize, j: usize, mut tensor: Tensor<T>) -> TensorId {
        tensor.tags_mut().insert(self.tags.site_tag(i, j));
        tensor.tags_mut().insert(self.tags.row_tag(i));
        tensor.tags_mut().insert(self.tags.col_tag(j));
        self.tn.add_tensor(tensor)
    }

    /// Physical index label at `(i, j)` for a state-like network.
    pub fn site_ind(&self, i: i64, j: i64) -> Option<String> {
        self.site_ind
            .as_deref()
            .map(|t| fill(t, &[wrap(i, self.lx), wrap(j, self.ly)]))
    }

    /// Upper physical index label at `(i, j)` for an operator-like network.
    pub fn upper_ind(&self, i: i64, j: i64) -> Option<String> {
        self.upper_ind
            .as_deref()
            .map(|t| fill(t, &[wrap(i, self.lx), wrap(j, self.ly)]))
    }

    /// Lower physical index label at `(i, j)` for an operator-like network.
    pub fn lower_ind(&self, i: i64, j: i64) -> Option<String> {
        self.lower_ind
            .as_deref()
            .map(|t| fill(t, &[wrap(i, self.lx), wrap(j, self.ly)]))
    }

    /// Dimension of the physical index at `(i, j)` (the upper one for
    /// operator-like networks).
    pub fn phys_dim(&self, i: i64, j: i64) -> Result<usize> {
        let label = self
            .site_ind(i, j)
            .or_else(|| self.upper_ind(i, j))
            .ok_or(BoundaryError::BadLattice)?;
        Ok(self.tn.ind_size(&label)?)
    }

    /// The bond between two adjacent sites, or `None` when the sites share
    /// no index. Each site must hold exactly one tensor.
    pub fn bond(&self, a: impl Into<SiteRef>, b: impl Into<SiteRef>) -> Result<Option<Index>> {
        let ta = self.tn.tid_unique(&[&self.resolve(a)])?;
        let tb = self.tn.tid_unique(&[&self.resolve(b)])?;
        Ok(self.tn.shared_indices(ta, tb)?.into_iter().next())
    }

    /// Dimension of the bond between two adjacent sites.
    pub fn bond_size(&self, a: impl Into<SiteRef>, b: impl Into<SiteRef>) -> Result<usize> {
        self.bond(a, b)?
            .map(|ix| ix.dim)
            .ok_or(BoundaryError::Core(CoreError::NotAdjacent))
    }

    /// Rewrite all physical index labels from a new template (state-like
    /// networks only).
    pub fn reindex_sites(&mut self, new_template: &str) -> Result<()> {
        let old_template = self.site_ind.clone().ok_or(BoundaryError::BadLattice)?;
        for (i, j) in self.gen_site_coos() {
            let old = fill(&old_template, &[i, j]);
            let new = fill(new_template, &[i, j]);
            self.tn.relabel(&old, &new);
        }
        self.site_ind = Some(new_template.to_string());
        Ok(())
    }

    /// Contract the whole network exactly into one tensor.
    pub fn contract(&self) -> Result<Tensor<T>> {
        Ok(self.tn.contract_all_tensors()?)
    }

    /// Contract exactly and materialize the dense array.
    ///
    /// Axes follow row-major site order: the per-site physical indices for
    /// a state-like network, upper indices then lower indices for an
    /// operator-like network. A closed network (no physical capability)
    /// collapses to a rank-0 array.
    pub fn to_dense(&self) -> Result<ArrayD<T>> {
        let mut labels: Vec<String> = Vec::new();
        if self.site_ind.is_some() {
            for (i, j) in self.gen_site_coos() {
                if let Some(l) = self.site_ind(i as i64, j as i64) {
                    labels.push(l);
                }
            }
        } else if self.upper_ind.is_some() {
            for (i, j) in self.gen_site_coos() {
                if let Some(l) = self.upper_ind(i as i64, j as i64) {
                    labels.push(l);
                }
            }
            for (i, j) in self.gen_site_coos() {
                if let Some(l) = self.lower_ind(i as i64, j as i64) {
                    labels.push(l);
                }
            }
        }
        let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
        Ok(self.tn.to_dense(&refs)?)
    }
}
