//! Coordinate and tag conventions for square lattices.

/// Templates for the tags and index labels attached to lattice tensors.
///
/// Each template contains `{}` placeholders filled left to right, so the
/// defaults produce tags like `I3,0`, `ROW3`, `COL0` and physical index
/// labels like `k3,0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagScheme {
    /// Per-site tag template, two placeholders.
    pub site: String,
    /// Per-row tag template, one placeholder.
    pub row: String,
    /// Per-column tag template, one placeholder.
    pub col: String,
}

impl Default for TagScheme {
    fn default() -> Self {
        Self {
            site: "I{},{}".to_string(),
            row: "ROW{}".to_string(),
            col: "COL{}".to_string(),
        }
    }
}

impl TagScheme {
    /// The tag for site `(i, j)`.
    pub fn site_tag(&self, i: usize, j: usize) -> String {
        fill(&self.site, &[i, j])
    }

    /// The tag shared by all tensors in row `i`.
    pub fn row_tag(&self, i: usize) -> String {
        fill(&self.row, &[i])
    }

    /// The tag shared by all tensors in column `j`.
    pub fn col_tag(&self, j: usize) -> String {
        fill(&self.col, &[j])
    }
}

/// Fill successive `{}` placeholders in `template` with `args`.
pub(crate) fn fill(template: &str, args: &[usize]) -> String {
    let mut out = String::with_capacity(template.len() + 4 * args.len());
    let mut rest = template;
    for arg in args {
        match rest.find("{}") {
            Some(pos) => {
                out.push_str(&rest[..pos]);
                out.push_str(&arg.to_string());
                rest = &rest[pos + 2..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Wrap a possibly-negative coordinate into `0..n`.
pub(crate) fn wrap(x: i64, n: usize) -> usize {
    x.rem_euclid(n as i64) as usize
}

/// A way of naming one site of the lattice: either a coordinate (wrapped
/// into range, so `-1` means the last row/column) or a literal tag passed
/// through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteRef {
    /// A `(row, column)` coordinate, wrapped modulo the lattice extents.
    Coord(i64, i64),
    /// An explicit tag.
    Tag(String),
}

impl From<(i64, i64)> for SiteRef {
    fn from((i, j): (i64, i64)) -> Self {
        SiteRef::Coord(i, j)
    }
}

impl From<&str> for SiteRef {
    fn from(tag: &str) -> Self {
        SiteRef::Tag(tag.to_string())
    }
}

impl From<String> for SiteRef {
    fn from(tag: String) -> Self {
        SiteRef::Tag(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tags() {
        let scheme = TagScheme::default();
        assert_eq!(scheme.site_tag(3, 0), "I3,0");
        assert_eq!(scheme.row_tag(3), "ROW3");
        assert_eq!(scheme.col_tag(0), "COL0");
    }

    #[test]
    fn fill_ignores_extra_args() {
        assert_eq!(fill("X{}", &[1, 2]), "X1");
        assert_eq!(fill("plain", &[]), "plain");
    }

    #[test]
    fn wrap_negative() {
        assert_eq!(wrap(-1, 4), 3);
        assert_eq!(wrap(5, 4), 1);
        assert_eq!(wrap(0, 4), 0);
    }
}
