//! Lattice structures and their canonical direction tables.
//!
//! Each structure lists its neighbor offsets ordered by topological ring
//! ("order"); `per_order()[k]` is the number of offsets in ring `k + 1`.
//! Within a ring the table order is the deterministic tie rule.

use potts_core::{Site, Vec3};

const fn s(x: i32, y: i32, z: i32) -> Site {
    Site::new(x, y, z)
}

/// The geometric arrangement of lattice nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Structure {
    /// One-dimensional chain.
    Linear,
    /// Two-dimensional square grid.
    Square,
    /// Two-dimensional hexagonal grid in axial coordinates.
    Hexagonal,
    /// Three-dimensional cubic grid.
    Cubic,
}

impl Structure {
    /// Number of spatial dimensions.
    pub fn dims(self) -> usize {
        match self {
            Self::Linear => 1,
            Self::Square | Self::Hexagonal => 2,
            Self::Cubic => 3,
        }
    }

    /// Every tabulated neighbor offset, ordered by ring.
    pub fn directions(self) -> &'static [Site] {
        match self {
            Self::Linear => &LINEAR,
            Self::Square => &SQUARE,
            Self::Hexagonal => &HEXAGONAL,
            Self::Cubic => &CUBIC,
        }
    }

    /// Number of offsets in each ring of [`directions`](Self::directions).
    pub fn per_order(self) -> &'static [usize] {
        match self {
            Self::Linear => &[2, 2, 2],
            Self::Square => &[4, 4, 4, 8, 4, 4],
            Self::Hexagonal => &[6, 6, 6, 12, 6, 6, 12, 6, 12, 12, 6],
            Self::Cubic => &[6, 12, 8, 6, 24, 24, 12, 30, 8],
        }
    }

    /// Largest supported neighborhood order.
    pub fn max_order(self) -> u32 {
        self.per_order().len() as u32
    }

    /// Structure-specific named template, if one exists.
    ///
    /// Names are matched case-insensitively. Returns the offsets and the
    /// order the template is equivalent to.
    pub fn template(self, name: &str) -> Option<(&'static [Site], u32)> {
        match (self, name.to_ascii_lowercase().as_str()) {
            (Self::Cubic, "fchc") => Some((&FCHC, 2)),
            _ => None,
        }
    }

    /// Map lattice coordinates to orthogonal space.
    ///
    /// Identity except for the hexagonal lattice, whose second axis is
    /// sheared by half a node and compressed by `sin 60°`.
    pub fn to_orth(self, v: Vec3) -> Vec3 {
        match self {
            Self::Hexagonal => Vec3::new(v.x + 0.5 * v.y, SIN_60 * v.y, v.z),
            _ => v,
        }
    }
}

const SIN_60: f64 = 0.866_025_403_784_438_6;

// ── Direction tables ────────────────────────────────────────────

static LINEAR: [Site; 6] = [
    s(1, 0, 0),
    s(-1, 0, 0),
    s(2, 0, 0),
    s(-2, 0, 0),
    s(3, 0, 0),
    s(-3, 0, 0),
];

static SQUARE: [Site; 28] = [
    // edge neighbors
    s(1, 0, 0),
    s(0, 1, 0),
    s(-1, 0, 0),
    s(0, -1, 0),
    // corner neighbors
    s(1, 1, 0),
    s(-1, 1, 0),
    s(1, -1, 0),
    s(-1, -1, 0),
    // second ring along the axes
    s(2, 0, 0),
    s(-2, 0, 0),
    s(0, 2, 0),
    s(0, -2, 0),
    // knight moves
    s(2, 1, 0),
    s(-2, 1, 0),
    s(2, -1, 0),
    s(-2, -1, 0),
    s(1, 2, 0),
    s(-1, 2, 0),
    s(1, -2, 0),
    s(-1, -2, 0),
    // second ring diagonals
    s(2, 2, 0),
    s(-2, 2, 0),
    s(2, -2, 0),
    s(-2, -2, 0),
    // third ring along the axes
    s(3, 0, 0),
    s(0, 3, 0),
    s(-3, 0, 0),
    s(0, -3, 0),
];

// Counter-clockwise within each ring.
static HEXAGONAL: [Site; 90] = [
    s(1, 0, 0),
    s(0, 1, 0),
    s(-1, 1, 0),
    s(-1, 0, 0),
    s(0, -1, 0),
    s(1, -1, 0),
    //
    s(1, 1, 0),
    s(-1, 2, 0),
    s(-2, 1, 0),
    s(-1, -1, 0),
    s(1, -2, 0),
    s(2, -1, 0),
    //
    s(2, 0, 0),
    s(0, 2, 0),
    s(-2, 2, 0),
    s(-2, 0, 0),
    s(0, -2, 0),
    s(2, -2, 0),
    //
    s(2, 1, 0),
    s(1, 2, 0),
    s(-1, 3, 0),
    s(-2, 3, 0),
    s(-3, 2, 0),
    s(-3, 1, 0),
    s(-2, -1, 0),
    s(-1, -2, 0),
    s(1, -3, 0),
    s(2, -3, 0),
    s(3, -2, 0),
    s(3, -1, 0),
    //
    s(3, 0, 0),
    s(0, 3, 0),
    s(-3, 3, 0),
    s(-3, 0, 0),
    s(0, -3, 0),
    s(3, -3, 0),
    //
    s(2, 2, 0),
    s(-2, 4, 0),
    s(-4, 2, 0),
    s(-2, -2, 0),
    s(2, -4, 0),
    s(4, -2, 0),
    //
    s(3, 1, 0),
    s(1, 3, 0),
    s(-1, 4, 0),
    s(-3, 4, 0),
    s(-4, 3, 0),
    s(-4, 1, 0),
    s(-3, -1, 0),
    s(-1, -3, 0),
    s(1, -4, 0),
    s(3, -4, 0),
    s(4, -3, 0),
    s(4, -1, 0),
    //
    s(4, 0, 0),
    s(0, 4, 0),
    s(-4, 4, 0),
    s(-4, 0, 0),
    s(0, -4, 0),
    s(4, -4, 0),
    //
    s(3, 2, 0),
    s(2, 3, 0),
    s(-2, 5, 0),
    s(-3, 5, 0),
    s(-5, 3, 0),
    s(-5, 2, 0),
    s(-3, -2, 0),
    s(-2, -3, 0),
    s(2, -5, 0),
    s(3, -5, 0),
    s(5, -3, 0),
    s(5, -2, 0),
    //
    s(4, 1, 0),
    s(1, 4, 0),
    s(-1, 5, 0),
    s(-4, 5, 0),
    s(-5, 4, 0),
    s(-5, 1, 0),
    s(-4, -1, 0),
    s(-1, -4, 0),
    s(1, -5, 0),
    s(4, -5, 0),
    s(5, -4, 0),
    s(5, -1, 0),
    //
    s(5, 0, 0),
    s(0, 5, 0),
    s(-5, 5, 0),
    s(-5, 0, 0),
    s(0, -5, 0),
    s(5, -5, 0),
];

static CUBIC: [Site; 130] = [
    // faces
    s(1, 0, 0),
    s(0, 1, 0),
    s(0, 0, 1),
    s(-1, 0, 0),
    s(0, -1, 0),
    s(0, 0, -1),
    // edges
    s(1, 1, 0),
    s(-1, 1, 0),
    s(1, 0, 1),
    s(1, 0, -1),
    s(0, 1, 1),
    s(0, -1, 1),
    s(1, -1, 0),
    s(-1, -1, 0),
    s(-1, 0, 1),
    s(-1, 0, -1),
    s(0, 1, -1),
    s(0, -1, -1),
    // corners
    s(1, 1, 1),
    s(-1, 1, 1),
    s(1, -1, 1),
    s(1, 1, -1),
    s(-1, -1, -1),
    s(1, -1, -1),
    s(-1, 1, -1),
    s(-1, -1, 1),
    // faces of faces
    s(2, 0, 0),
    s(-2, 0, 0),
    s(0, 0, 2),
    s(0, 0, -2),
    s(0, 2, 0),
    s(0, -2, 0),
    // faces of edges
    s(2, 1, 0),
    s(-2, 1, 0),
    s(2, 0, 1),
    s(2, 0, -1),
    s(0, 2, 1),
    s(0, -2, 1),
    s(2, -1, 0),
    s(-2, -1, 0),
    s(-2, 0, 1),
    s(-2, 0, -1),
    s(0, 2, -1),
    s(0, -2, -1),
    s(1, 2, 0),
    s(-1, 2, 0),
    s(1, 0, 2),
    s(1, 0, -2),
    s(0, 1, 2),
    s(0, -1, 2),
    s(1, -2, 0),
    s(-1, -2, 0),
    s(-1, 0, 2),
    s(-1, 0, -2),
    s(0, 1, -2),
    s(0, -1, -2),
    // faces of corners
    s(2, 1, 1),
    s(-2, 1, 1),
    s(2, -1, 1),
    s(2, 1, -1),
    s(-2, -1, -1),
    s(2, -1, -1),
    s(-2, 1, -1),
    s(-2, -1, 1),
    s(1, 2, 1),
    s(-1, 2, 1),
    s(1, -2, 1),
    s(1, 2, -1),
    s(-1, -2, -1),
    s(1, -2, -1),
    s(-1, 2, -1),
    s(-1, -2, 1),
    s(1, 1, 2),
    s(-1, 1, 2),
    s(1, -1, 2),
    s(1, 1, -2),
    s(-1, -1, -2),
    s(1, -1, -2),
    s(-1, 1, -2),
    s(-1, -1, 2),
    // edges of edges
    s(2, 2, 0),
    s(-2, 2, 0),
    s(2, -2, 0),
    s(-2, -2, 0),
    s(2, 0, 2),
    s(2, 0, -2),
    s(-2, 0, 2),
    s(-2, 0, -2),
    s(0, 2, 2),
    s(0, -2, 2),
    s(0, 2, -2),
    s(0, -2, -2),
    // second-ring edges and third-ring faces
    s(2, 2, 1),
    s(2, 2, -1),
    s(-2, 2, 1),
    s(-2, 2, -1),
    s(2, 1, 2),
    s(2, -1, 2),
    s(2, 1, -2),
    s(2, -1, -2),
    s(1, 2, 2),
    s(-1, 2, 2),
    s(1, -2, 2),
    s(-1, -2, 2),
    s(2, -2, 1),
    s(2, -2, -1),
    s(-2, -2, 1),
    s(-2, -2, -1),
    s(-2, 1, 2),
    s(-2, -1, 2),
    s(-2, 1, -2),
    s(-2, -1, -2),
    s(1, 2, -2),
    s(-1, 2, -2),
    s(1, -2, -2),
    s(-1, -2, -2),
    s(3, 0, 0),
    s(-3, 0, 0),
    s(0, 3, 0),
    s(0, -3, 0),
    s(0, 0, 3),
    s(0, 0, -3),
    // second-ring corners
    s(2, 2, 2),
    s(-2, 2, 2),
    s(2, -2, 2),
    s(2, 2, -2),
    s(-2, -2, -2),
    s(2, -2, -2),
    s(-2, 2, -2),
    s(-2, -2, 2),
];

// Face-centered hypercubic template: faces counted twice, plus edges.
static FCHC: [Site; 24] = [
    s(1, 0, 0),
    s(-1, 0, 0),
    s(0, 0, 1),
    s(0, 0, -1),
    s(0, 1, 0),
    s(0, -1, 0),
    s(1, 0, 0),
    s(-1, 0, 0),
    s(0, 0, 1),
    s(0, 0, -1),
    s(0, 1, 0),
    s(0, -1, 0),
    s(1, 1, 0),
    s(-1, 1, 0),
    s(1, 0, 1),
    s(1, 0, -1),
    s(0, 1, 1),
    s(0, -1, 1),
    s(1, -1, 0),
    s(-1, -1, 0),
    s(-1, 0, 1),
    s(-1, 0, -1),
    s(0, 1, -1),
    s(0, -1, -1),
];

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Structure; 4] = [
        Structure::Linear,
        Structure::Square,
        Structure::Hexagonal,
        Structure::Cubic,
    ];

    #[test]
    fn ring_sizes_cover_the_table() {
        for st in ALL {
            let total: usize = st.per_order().iter().sum();
            assert_eq!(total, st.directions().len(), "{st:?}");
        }
    }

    #[test]
    fn tables_are_closed_under_negation() {
        for st in ALL {
            let dirs = st.directions();
            for d in dirs {
                assert!(dirs.contains(&-*d), "{st:?}: -{d} missing");
            }
        }
    }

    #[test]
    fn rings_are_closed_under_negation() {
        for st in ALL {
            let mut start = 0;
            for &n in st.per_order() {
                let ring = &st.directions()[start..start + n];
                for d in ring {
                    assert!(ring.contains(&-*d), "{st:?}: ring at {start} not symmetric");
                }
                start += n;
            }
        }
    }

    #[test]
    fn tables_stay_in_their_dimensions() {
        for st in ALL {
            for d in st.directions() {
                if st.dims() < 3 {
                    assert_eq!(d.z, 0);
                }
                if st.dims() < 2 {
                    assert_eq!(d.y, 0);
                }
            }
        }
    }

    #[test]
    fn fchc_is_cubic_only() {
        assert!(Structure::Cubic.template("FCHC").is_some());
        assert!(Structure::Square.template("fchc").is_none());
    }

    #[test]
    fn hex_first_ring_is_unit_distance() {
        for d in &Structure::Hexagonal.directions()[..6] {
            let len = Structure::Hexagonal.to_orth(d.to_vec3()).length();
            assert!((len - 1.0).abs() < 1e-12, "{d}: {len}");
        }
    }
}
