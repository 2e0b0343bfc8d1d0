//! Option structs for compression and boundary contraction.

use peps2d_core::{Absorb, TruncationParams};

use crate::error::{BoundaryError, Result};

/// One inward absorption direction of the boundary scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FromDirection {
    /// Absorb the bottom row upward.
    Bottom,
    /// Absorb the left column rightward.
    Left,
    /// Absorb the top row downward.
    Top,
    /// Absorb the right column leftward.
    Right,
}

impl FromDirection {
    /// Parse the single-letter form used in sequence strings.
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            'b' => Ok(FromDirection::Bottom),
            'l' => Ok(FromDirection::Left),
            't' => Ok(FromDirection::Top),
            'r' => Ok(FromDirection::Right),
            other => Err(BoundaryError::InvalidSequence(other)),
        }
    }
}

/// How a single bond compression truncates and where the weight goes.
#[derive(Debug, Clone, Default)]
pub struct CompressOptions {
    /// Truncation criterion (relative discarded weight and/or rank cap).
    pub truncation: TruncationParams,
    /// Absorb side override; `None` means the sweep-dependent default.
    pub absorb: Option<Absorb>,
}

impl CompressOptions {
    /// No truncation, default absorb side.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap every compressed bond at `max_bond`.
    pub fn with_max_bond(mut self, max_bond: usize) -> Self {
        self.truncation = self.truncation.with_max_rank(max_bond);
        self
    }

    /// Allow a relative discarded singular weight of `cutoff`.
    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.truncation = self.truncation.with_rtol(cutoff);
        self
    }

    /// Force the absorb side instead of the sweep default.
    pub fn with_absorb(mut self, absorb: Absorb) -> Self {
        self.absorb = Some(absorb);
        self
    }
}

/// Options for [`TensorNetwork2D::contract_boundary`].
///
/// [`TensorNetwork2D::contract_boundary`]: crate::TensorNetwork2D::contract_boundary
#[derive(Debug, Clone)]
pub struct BoundaryOptions {
    /// Gauge-fix each boundary line before compressing it.
    pub canonize: bool,
    /// How boundary bonds are truncated.
    pub compress: CompressOptions,
    /// When set, absorb the layers of each inner site one tag at a time
    /// (for e.g. bra-ket double-layer networks).
    pub layer_tags: Option<Vec<String>>,
    /// Once two opposite frontiers are at most this far apart, contract
    /// the remaining strip exactly. Ignored when `around` is set.
    pub max_separation: usize,
    /// Cyclic order of inward directions.
    pub sequence: Vec<FromDirection>,
    /// Sites whose bounding box must stay uncontracted.
    pub around: Option<Vec<(usize, usize)>>,
    /// Starting bottom frontier row (default 0).
    pub bottom: Option<usize>,
    /// Starting top frontier row (default `lx - 1`).
    pub top: Option<usize>,
    /// Starting left frontier column (default 0).
    pub left: Option<usize>,
    /// Starting right frontier column (default `ly - 1`).
    pub right: Option<usize>,
}

impl Default for BoundaryOptions {
    fn default() -> Self {
        Self {
            canonize: true,
            compress: CompressOptions::default(),
            layer_tags: None,
            max_separation: 1,
            sequence: vec![
                FromDirection::Bottom,
                FromDirection::Left,
                FromDirection::Top,
                FromDirection::Right,
            ],
            around: None,
            bottom: None,
            top: None,
            left: None,
            right: None,
        }
    }
}

impl BoundaryOptions {
    /// Defaults: canonize, no truncation, sequence `"bltr"`,
    /// `max_separation = 1`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap every compressed bond at `max_bond`.
    pub fn with_max_bond(mut self, max_bond: usize) -> Self {
        self.compress = self.compress.with_max_bond(max_bond);
        self
    }

    /// Allow a relative discarded singular weight of `cutoff` per
    /// compression.
    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.compress = self.compress.with_cutoff(cutoff);
        self
    }

    /// Skip the canonization sweeps.
    pub fn without_canonize(mut self) -> Self {
        self.canonize = false;
        self
    }

    /// Parse a direction cycle from its string form, e.g. `"bltr"` or
    /// `"bt"`.
    pub fn with_sequence(mut self, sequence: &str) -> Result<Self> {
        let mut dirs = Vec::with_capacity(sequence.len());
        for c in sequence.chars() {
            dirs.push(FromDirection::from_char(c)?);
        }
        if dirs.is_empty() {
            return Err(BoundaryError::BadLattice);
        }
        self.sequence = dirs;
        Ok(self)
    }

    /// Absorb each inner site layer by layer, in this tag order.
    pub fn with_layer_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layer_tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Protect the bounding box of these sites from contraction.
    pub fn with_around(mut self, sites: Vec<(usize, usize)>) -> Self {
        self.around = if sites.is_empty() { None } else { Some(sites) };
        self
    }

    /// Stop and contract exactly once two opposite frontiers are at most
    /// this far apart.
    pub fn with_max_separation(mut self, max_separation: usize) -> Self {
        self.max_separation = max_separation;
        self
    }

    /// Override the starting frontier positions.
    pub fn with_frontiers(
        mut self,
        bottom: Option<usize>,
        top: Option<usize>,
        left: Option<usize>,
        right: Option<usize>,
    ) -> Self {
        self.bottom = bottom;
        self.top = top;
        self.left = left;
        self.right = right;
        self
    }
}
