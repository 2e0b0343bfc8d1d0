//! Inward boundary contraction of the lattice.
//!
//! The frontier starts at the lattice edges and moves inward one row or
//! column at a time: the outer line is absorbed into its neighbor, the
//! merged line is gauge-fixed by a QR sweep one way, then compressed by a
//! truncated-SVD sweep back. The scheduler cycles through the configured
//! directions until either the remaining strip is thin enough to contract
//! exactly, or every direction has hit the protected region.

use peps2d_core::{TagMatch, Tensor, TnScalar};

use crate::error::{BoundaryError, Result};
use crate::network2d::TensorNetwork2D;
use crate::options::{BoundaryOptions, FromDirection};
use crate::sweep::Sweep;

/// Outcome of a boundary contraction.
#[derive(Debug, Clone)]
pub enum BoundaryResult<T: TnScalar> {
    /// The fully contracted residual (no protected region).
    Tensor(Tensor<T>),
    /// The partially contracted network left around a protected region.
    Network(TensorNetwork2D<T>),
}

impl<T: TnScalar> BoundaryResult<T> {
    /// The residual tensor, if the contraction ran to completion.
    pub fn into_tensor(self) -> Option<Tensor<T>> {
        match self {
            BoundaryResult::Tensor(t) => Some(t),
            BoundaryResult::Network(_) => None,
        }
    }

    /// The remaining network, if a protected region stopped the
    /// contraction.
    pub fn into_network(self) -> Option<TensorNetwork2D<T>> {
        match self {
            BoundaryResult::Tensor(_) => None,
            BoundaryResult::Network(tn) => Some(tn),
        }
    }
}

/// Bounding box of the protected sites.
struct StopBox {
    i_min: usize,
    i_max: usize,
    j_min: usize,
    j_max: usize,
}

impl<T: TnScalar> TensorNetwork2D<T> {
    /// Absorb rows `xrange.0 .. xrange.1` upward into their neighbors,
    /// compressing the merged boundary over the inclusive column span
    /// `yrange`.
    pub fn contract_boundary_from_bottom(
        &mut self,
        xrange: (usize, usize),
        yrange: (usize, usize),
        opts: &BoundaryOptions,
    ) -> Result<()> {
        let layers = opts.layer_tags.clone();
        for i in xrange.0.min(xrange.1)..xrange.0.max(xrange.1) {
            match &layers {
                None => self.absorb_row_up(i, yrange, None, opts)?,
                Some(tags) => {
                    self.fuse_line(
                        (yrange.0..=yrange.1).map(|j| (i, j)).collect::<Vec<_>>(),
                    )?;
                    for tag in tags {
                        self.absorb_row_up(i, yrange, Some(tag), opts)?;
                        for j in yrange.0..=yrange.1 {
                            self.drop_absorbed_tag((i, j), (i + 1, j))?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Absorb rows `xrange.1 ..= xrange.0 + 1` downward into their
    /// neighbors.
    pub fn contract_boundary_from_top(
        &mut self,
        xrange: (usize, usize),
        yrange: (usize, usize),
        opts: &BoundaryOptions,
    ) -> Result<()> {
        let layers = opts.layer_tags.clone();
        let (lo, hi) = (xrange.0.min(xrange.1), xrange.0.max(xrange.1));
        for i in ((lo + 1)..=hi).rev() {
            match &layers {
                None => self.absorb_row_down(i, yrange, None, opts)?,
                Some(tags) => {
                    self.fuse_line(
                        (yrange.0..=yrange.1).map(|j| (i, j)).collect::<Vec<_>>(),
                    )?;
                    for tag in tags {
                        self.absorb_row_down(i, yrange, Some(tag), opts)?;
                        for j in yrange.0..=yrange.1 {
                            self.drop_absorbed_tag((i, j), (i - 1, j))?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Absorb columns `yrange.0 .. yrange.1` rightward into their
    /// neighbors, compressing over the inclusive row span `xrange`.
    pub fn contract_boundary_from_left(
        &mut self,
        xrange: (usize, usize),
        yrange: (usize, usize),
        opts: &BoundaryOptions,
    ) -> Result<()> {
        let layers = opts.layer_tags.clone();
        for j in yrange.0.min(yrange.1)..yrange.0.max(yrange.1) {
            match &layers {
                None => self.absorb_col_right(j, xrange, None, opts)?,
                Some(tags) => {
                    self.fuse_line(
                        (xrange.0..=xrange.1).map(|i| (i, j)).collect::<Vec<_>>(),
                    )?;
                    for tag in tags {
                        self.absorb_col_right(j, xrange, Some(tag), opts)?;
                        for i in xrange.0..=xrange.1 {
                            self.drop_absorbed_tag((i, j), (i, j + 1))?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Absorb columns `yrange.1 ..= yrange.0 + 1` leftward into their
    /// neighbors.
    pub fn contract_boundary_from_right(
        &mut self,
        xrange: (usize, usize),
        yrange: (usize, usize),
        opts: &BoundaryOptions,
    ) -> Result<()> {
        let layers = opts.layer_tags.clone();
        let (lo, hi) = (yrange.0.min(yrange.1), yrange.0.max(yrange.1));
        for j in ((lo + 1)..=hi).rev() {
            match &layers {
                None => self.absorb_col_left(j, xrange, None, opts)?,
                Some(tags) => {
                    self.fuse_line(
                        (xrange.0..=xrange.1).map(|i| (i, j)).collect::<Vec<_>>(),
                    )?;
                    for tag in tags {
                        self.absorb_col_left(j, xrange, Some(tag), opts)?;
                        for i in xrange.0..=xrange.1 {
                            self.drop_absorbed_tag((i, j), (i, j - 1))?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Run the inward contraction on a copy of the network.
    pub fn contract_boundary(&self, opts: &BoundaryOptions) -> Result<BoundaryResult<T>> {
        let mut tn = self.clone();
        match tn.contract_boundary_inplace(opts)? {
            Some(t) => Ok(BoundaryResult::Tensor(t)),
            None => Ok(BoundaryResult::Network(tn)),
        }
    }

    /// Run the inward contraction in place.
    ///
    /// Returns the residual tensor, or `None` when a protected region
    /// (`around`) left the network partially contracted.
    pub fn contract_boundary_inplace(&mut self, opts: &BoundaryOptions) -> Result<Option<Tensor<T>>> {
        if opts.sequence.is_empty() {
            return Err(BoundaryError::BadLattice);
        }

        let mut bottom = opts.bottom.unwrap_or(0);
        let mut top = opts.top.unwrap_or(self.lx() - 1);
        let mut left = opts.left.unwrap_or(0);
        let mut right = opts.right.unwrap_or(self.ly() - 1);
        if bottom > top || left > right || top >= self.lx() || right >= self.ly() {
            return Err(BoundaryError::BadLattice);
        }

        let stop = match &opts.around {
            None => None,
            Some(coos) => Some(self.stop_box(coos)?),
        };

        // worst case: one direction advances per cycle
        let budget = opts.sequence.len() * (self.lx() + self.ly() + 2);
        let mut steps = 0usize;
        let mut reached = vec![false; opts.sequence.len()];

        loop {
            if stop.is_none() && thin(bottom, top, left, right, opts.max_separation) {
                return Ok(Some(self.contract()?));
            }
            for (k, dir) in opts.sequence.iter().enumerate() {
                steps += 1;
                if steps > budget {
                    return Err(BoundaryError::NoTermination(budget));
                }
                match dir {
                    FromDirection::Bottom => {
                        if stop.as_ref().map_or(true, |s| bottom + 1 < s.i_min) {
                            self.contract_boundary_from_bottom(
                                (bottom, bottom + 1),
                                (left, right),
                                opts,
                            )?;
                            bottom += 1;
                        } else {
                            reached[k] = true;
                        }
                    }
                    FromDirection::Left => {
                        if stop.as_ref().map_or(true, |s| left + 1 < s.j_min) {
                            self.contract_boundary_from_left(
                                (bottom, top),
                                (left, left + 1),
                                opts,
                            )?;
                            left += 1;
                        } else {
                            reached[k] = true;
                        }
                    }
                    FromDirection::Top => {
                        if stop.as_ref().map_or(true, |s| top > s.i_max + 1) {
                            self.contract_boundary_from_top(
                                (top - 1, top),
                                (left, right),
                                opts,
                            )?;
                            top -= 1;
                        } else {
                            reached[k] = true;
                        }
                    }
                    FromDirection::Right => {
                        if stop.as_ref().map_or(true, |s| right > s.j_max + 1) {
                            self.contract_boundary_from_right(
                                (bottom, top),
                                (right - 1, right),
                                opts,
                            )?;
                            right -= 1;
                        } else {
                            reached[k] = true;
                        }
                    }
                }
                match &stop {
                    None => {
                        if thin(bottom, top, left, right, opts.max_separation) {
                            return Ok(Some(self.contract()?));
                        }
                    }
                    Some(_) => {
                        if reached.iter().all(|&r| r) {
                            return Ok(None);
                        }
                    }
                }
            }
        }
    }

    /// Absorb row `i` into row `i + 1`, then canonize rightward and
    /// compress leftward.
    fn absorb_row_up(
        &mut self,
        i: usize,
        yrange: (usize, usize),
        layer: Option<&str>,
        opts: &BoundaryOptions,
    ) -> Result<()> {
        for j in yrange.0..=yrange.1 {
            let t1 = self.site_tag(i as i64, j as i64);
            let t2 = self.site_tag(i as i64 + 1, j as i64);
            self.absorb_pair(&t1, &t2, layer)?;
        }
        if opts.canonize {
            self.canonize_row(i, Sweep::Right, Some(yrange))?;
        }
        self.compress_row(i, Sweep::Left, Some(yrange), &opts.compress)
    }

    /// Absorb row `i` into row `i - 1`, then canonize leftward and
    /// compress rightward.
    fn absorb_row_down(
        &mut self,
        i: usize,
        yrange: (usize, usize),
        layer: Option<&str>,
        opts: &BoundaryOptions,
    ) -> Result<()> {
        for j in yrange.0..=yrange.1 {
            let t1 = self.site_tag(i as i64, j as i64);
            let t2 = self.site_tag(i as i64 - 1, j as i64);
            self.absorb_pair(&t1, &t2, layer)?;
        }
        if opts.canonize {
            self.canonize_row(i, Sweep::Left, Some(yrange))?;
        }
        self.compress_row(i, Sweep::Right, Some(yrange), &opts.compress)
    }

    /// Absorb column `j` into column `j + 1`, then canonize downward and
    /// compress upward.
    fn absorb_col_right(
        &mut self,
        j: usize,
        xrange: (usize, usize),
        layer: Option<&str>,
        opts: &BoundaryOptions,
    ) -> Result<()> {
        for i in xrange.0..=xrange.1 {
            let t1 = self.site_tag(i as i64, j as i64);
            let t2 = self.site_tag(i as i64, j as i64 + 1);
            self.absorb_pair(&t1, &t2, layer)?;
        }
        if opts.canonize {
            self.canonize_column(j, Sweep::Down, Some(xrange))?;
        }
        self.compress_column(j, Sweep::Up, Some(xrange), &opts.compress)
    }

    /// Absorb column `j` into column `j - 1`, then canonize upward and
    /// compress downward.
    fn absorb_col_left(
        &mut self,
        j: usize,
        xrange: (usize, usize),
        layer: Option<&str>,
        opts: &BoundaryOptions,
    ) -> Result<()> {
        for i in xrange.0..=xrange.1 {
            let t1 = self.site_tag(i as i64, j as i64);
            let t2 = self.site_tag(i as i64, j as i64 - 1);
            self.absorb_pair(&t1, &t2, layer)?;
        }
        if opts.canonize {
            self.canonize_column(j, Sweep::Up, Some(xrange))?;
        }
        self.compress_column(j, Sweep::Down, Some(xrange), &opts.compress)
    }

    /// Merge all tensors at `t1` with the neighbor at `t2` — either every
    /// tensor at either coordinate, or only the `layer`-tagged one at `t2`.
    fn absorb_pair(&mut self, t1: &str, t2: &str, layer: Option<&str>) -> Result<()> {
        match layer {
            None => {
                self.tn.contract_tags(&[t1, t2], TagMatch::Any)?;
            }
            Some(l) => {
                self.tn.contract_between(&[t1], &[t2, l])?;
            }
        }
        Ok(())
    }

    /// Contract all tensors at each given coordinate into one.
    fn fuse_line(&mut self, coos: Vec<(usize, usize)>) -> Result<()> {
        for (i, j) in coos {
            let tag = self.site_tag(i as i64, j as i64);
            self.tn.contract_tags(&[&tag], TagMatch::Any)?;
        }
        Ok(())
    }

    /// After a layer merge, the boundary tensor at `outer` has picked up
    /// the site tag of `inner`; drop it again while other layers still
    /// carry it, so those can keep being addressed unambiguously.
    fn drop_absorbed_tag(&mut self, outer: (usize, usize), inner: (usize, usize)) -> Result<()> {
        let inner_tag = self.site_tag(inner.0 as i64, inner.1 as i64);
        if self.tn.tids_matching(&[&inner_tag], TagMatch::All).len() > 1 {
            let outer_tag = self.site_tag(outer.0 as i64, outer.1 as i64);
            let tid = self.tn.tid_unique(&[&outer_tag])?;
            self.tn.drop_tag(tid, &inner_tag);
        }
        Ok(())
    }

    /// Bounding box of the protected coordinates, validated in-lattice.
    fn stop_box(&self, coos: &[(usize, usize)]) -> Result<StopBox> {
        let first = *coos.first().ok_or(BoundaryError::BadLattice)?;
        let mut boxed = StopBox {
            i_min: first.0,
            i_max: first.0,
            j_min: first.1,
            j_max: first.1,
        };
        for &(i, j) in coos {
            if i >= self.lx() || j >= self.ly() {
                return Err(BoundaryError::BadLattice);
            }
            boxed.i_min = boxed.i_min.min(i);
            boxed.i_max = boxed.i_max.max(i);
            boxed.j_min = boxed.j_min.min(j);
            boxed.j_max = boxed.j_max.max(j);
        }
        Ok(boxed)
    }
}

fn thin(bottom: usize, top: usize, left: usize, right: usize, max_separation: usize) -> bool {
    top - bottom <= max_separation || right - left <= max_separation
}
