//! Row and column gauge-fixing / compression sweeps.
//!
//! These walk a single line of the lattice, applying the pairwise QR or
//! truncated-SVD primitives between neighboring sites. Pair order and
//! default absorb side follow the sweep direction, so a canonization sweep
//! one way followed by a compression sweep back leaves the truncated
//! tensors optimally conditioned.

use std::str::FromStr;

use peps2d_core::{Absorb, TnScalar};

use crate::error::{BoundaryError, Result};
use crate::network2d::TensorNetwork2D;
use crate::options::CompressOptions;

/// Direction of a line sweep. Rows sweep `Left`/`Right`, columns sweep
/// `Up`/`Down`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweep {
    /// Toward larger row index.
    Up,
    /// Toward smaller row index.
    Down,
    /// Toward smaller column index.
    Left,
    /// Toward larger column index.
    Right,
}

impl FromStr for Sweep {
    type Err = BoundaryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "up" => Ok(Sweep::Up),
            "down" => Ok(Sweep::Down),
            "left" => Ok(Sweep::Left),
            "right" => Ok(Sweep::Right),
            other => Err(BoundaryError::InvalidSweep {
                found: other.to_string(),
                expected: "up, down, left, right",
            }),
        }
    }
}

fn bad_sweep(sweep: Sweep, expected: &'static str) -> BoundaryError {
    BoundaryError::InvalidSweep {
        found: format!("{sweep:?}"),
        expected,
    }
}

fn span(range: Option<(usize, usize)>, len: usize) -> (usize, usize) {
    let (a, b) = range.unwrap_or((0, len - 1));
    (a.min(b), a.max(b))
}

impl<T: TnScalar> TensorNetwork2D<T> {
    /// Gauge-fix row `i` by a QR sweep, pushing the norm along the sweep
    /// direction. `yrange` is the inclusive column span, defaulting to the
    /// whole row.
    pub fn canonize_row(
        &mut self,
        i: usize,
        sweep: Sweep,
        yrange: Option<(usize, usize)>,
    ) -> Result<()> {
        let (jmin, jmax) = span(yrange, self.ly());
        match sweep {
            Sweep::Right => {
                for j in jmin..jmax {
                    let a = self.site_tag(i as i64, j as i64);
                    let b = self.site_tag(i as i64, j as i64 + 1);
                    self.tn.canonize_between(&[&a], &[&b])?;
                }
            }
            Sweep::Left => {
                for j in ((jmin + 1)..=jmax).rev() {
                    let a = self.site_tag(i as i64, j as i64);
                    let b = self.site_tag(i as i64, j as i64 - 1);
                    self.tn.canonize_between(&[&a], &[&b])?;
                }
            }
            other => return Err(bad_sweep(other, "left, right")),
        }
        Ok(())
    }

    /// Gauge-fix column `j` by a QR sweep over the inclusive row span
    /// `xrange` (whole column by default).
    pub fn canonize_column(
        &mut self,
        j: usize,
        sweep: Sweep,
        xrange: Option<(usize, usize)>,
    ) -> Result<()> {
        let (imin, imax) = span(xrange, self.lx());
        match sweep {
            Sweep::Up => {
                for i in imin..imax {
                    let a = self.site_tag(i as i64, j as i64);
                    let b = self.site_tag(i as i64 + 1, j as i64);
                    self.tn.canonize_between(&[&a], &[&b])?;
                }
            }
            Sweep::Down => {
                for i in ((imin + 1)..=imax).rev() {
                    let a = self.site_tag(i as i64, j as i64);
                    let b = self.site_tag(i as i64 - 1, j as i64);
                    self.tn.canonize_between(&[&a], &[&b])?;
                }
            }
            other => return Err(bad_sweep(other, "up, down")),
        }
        Ok(())
    }

    /// Canonize row `i` inward from both ends toward the protected column
    /// span `around`.
    pub fn canonize_row_around(&mut self, i: usize, around: (usize, usize)) -> Result<()> {
        let lo = around.0.min(around.1);
        let hi = around.0.max(around.1);
        self.canonize_row(i, Sweep::Right, Some((0, lo)))?;
        self.canonize_row(i, Sweep::Left, Some((hi, self.ly() - 1)))
    }

    /// Compress the bonds of row `i` by a truncated-SVD sweep.
    ///
    /// Unless overridden, the singular weight is absorbed into the tensor
    /// ahead in the sweep, so the weight travels with the sweep front.
    pub fn compress_row(
        &mut self,
        i: usize,
        sweep: Sweep,
        yrange: Option<(usize, usize)>,
        opts: &CompressOptions,
    ) -> Result<()> {
        let (jmin, jmax) = span(yrange, self.ly());
        let absorb = opts.absorb.unwrap_or(Absorb::Right);
        match sweep {
            Sweep::Right => {
                for j in jmin..jmax {
                    let a = self.site_tag(i as i64, j as i64);
                    let b = self.site_tag(i as i64, j as i64 + 1);
                    self.tn
                        .compress_between(&[&a], &[&b], &opts.truncation, absorb)?;
                }
            }
            Sweep::Left => {
                for j in ((jmin + 1)..=jmax).rev() {
                    let a = self.site_tag(i as i64, j as i64);
                    let b = self.site_tag(i as i64, j as i64 - 1);
                    self.tn
                        .compress_between(&[&a], &[&b], &opts.truncation, absorb)?;
                }
            }
            other => return Err(bad_sweep(other, "left, right")),
        }
        Ok(())
    }

    /// Compress the bonds of column `j` by a truncated-SVD sweep.
    ///
    /// Pairs are always listed bottom-site first; the default absorb side
    /// therefore depends on the sweep (`Right` going up, `Left` going
    /// down), keeping the weight at the sweep front either way.
    pub fn compress_column(
        &mut self,
        j: usize,
        sweep: Sweep,
        xrange: Option<(usize, usize)>,
        opts: &CompressOptions,
    ) -> Result<()> {
        let (imin, imax) = span(xrange, self.lx());
        match sweep {
            Sweep::Up => {
                let absorb = opts.absorb.unwrap_or(Absorb::Right);
                for i in imin..imax {
                    let a = self.site_tag(i as i64, j as i64);
                    let b = self.site_tag(i as i64 + 1, j as i64);
                    self.tn
                        .compress_between(&[&a], &[&b], &opts.truncation, absorb)?;
                }
            }
            Sweep::Down => {
                let absorb = opts.absorb.unwrap_or(Absorb::Left);
                for i in ((imin + 1)..=imax).rev() {
                    let a = self.site_tag(i as i64 - 1, j as i64);
                    let b = self.site_tag(i as i64, j as i64);
                    self.tn
                        .compress_between(&[&a], &[&b], &opts.truncation, absorb)?;
                }
            }
            other => return Err(bad_sweep(other, "up, down")),
        }
        Ok(())
    }
}
