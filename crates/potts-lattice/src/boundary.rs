//! Boundary conditions per half-axis.

use std::fmt;

/// How a lattice treats neighbors that fall past one of its faces.
///
/// # Examples
///
/// ```
/// use potts_lattice::{Boundary, HalfAxis, LatticeConfig, LatticeDescriptor, Structure};
///
/// // Square lattices default to periodic in x and y, noflux in z.
/// let lattice = LatticeDescriptor::new(&LatticeConfig::new(Structure::Square, [8, 8, 1])).unwrap();
/// assert_eq!(lattice.boundary(HalfAxis::PlusX), Boundary::Periodic);
/// assert_eq!(lattice.boundary(HalfAxis::MinusZ), Boundary::NoFlux);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// Neighbors wrap to the opposite face.
    Periodic,
    /// Neighbors past the face do not exist.
    NoFlux,
}

/// One of the six faces of the lattice bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HalfAxis {
    /// The `x < 0` face.
    MinusX,
    /// The `x >= extent` face.
    PlusX,
    /// The `y < 0` face.
    MinusY,
    /// The `y >= extent` face.
    PlusY,
    /// The `z < 0` face.
    MinusZ,
    /// The `z >= extent` face.
    PlusZ,
}

impl HalfAxis {
    /// All half-axes in index order.
    pub const ALL: [HalfAxis; 6] = [
        HalfAxis::MinusX,
        HalfAxis::PlusX,
        HalfAxis::MinusY,
        HalfAxis::PlusY,
        HalfAxis::MinusZ,
        HalfAxis::PlusZ,
    ];

    /// Index into a six-element boundary table.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Coordinate axis this face belongs to.
    pub fn axis(self) -> usize {
        self.index() / 2
    }

    /// The face on the other side of the same axis.
    pub fn opposite(self) -> HalfAxis {
        Self::ALL[self.index() ^ 1]
    }

    /// Lower face of `axis`.
    pub fn lower(axis: usize) -> HalfAxis {
        Self::ALL[(axis * 2).min(4)]
    }

    /// Upper face of `axis`.
    pub fn upper(axis: usize) -> HalfAxis {
        Self::ALL[(axis * 2 + 1).min(5)]
    }
}

impl fmt::Display for HalfAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MinusX => "-x",
            Self::PlusX => "x",
            Self::MinusY => "-y",
            Self::PlusY => "y",
            Self::MinusZ => "-z",
            Self::PlusZ => "z",
        };
        f.write_str(name)
    }
}

/// Default boundary table for a lattice of `dims` dimensions.
///
/// Faces of the axes the model uses are periodic; the remaining faces
/// are noflux. The noflux default on unused axes keeps cells from seeing
/// themselves through a one-node-thick periodic z axis.
pub(crate) fn default_boundaries(dims: usize) -> [Boundary; 6] {
    let mut table = [Boundary::NoFlux; 6];
    for (i, b) in table.iter_mut().enumerate() {
        if i < dims * 2 {
            *b = Boundary::Periodic;
        }
    }
    table
}

/// Apply a single override to a boundary table.
///
/// Periodicity is a property of an axis, not of a face: when either the
/// new or the previous type of the face is periodic, the opposite face
/// takes the same type.
pub(crate) fn apply_override(table: &mut [Boundary; 6], face: HalfAxis, boundary: Boundary) {
    let set_opposite = boundary == Boundary::Periodic || table[face.index()] == Boundary::Periodic;
    table[face.index()] = boundary;
    if set_opposite {
        table[face.opposite().index()] = boundary;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_dimensionality() {
        let t = default_boundaries(2);
        assert_eq!(&t[..4], &[Boundary::Periodic; 4]);
        assert_eq!(&t[4..], &[Boundary::NoFlux; 2]);
        let t = default_boundaries(1);
        assert_eq!(t.iter().filter(|b| **b == Boundary::Periodic).count(), 2);
        let t = default_boundaries(3);
        assert!(t.iter().all(|b| *b == Boundary::Periodic));
    }

    #[test]
    fn periodic_override_sets_opposite() {
        let mut t = default_boundaries(1);
        apply_override(&mut t, HalfAxis::PlusY, Boundary::Periodic);
        assert_eq!(t[HalfAxis::MinusY.index()], Boundary::Periodic);
    }

    #[test]
    fn noflux_on_periodic_face_breaks_the_pair() {
        let mut t = default_boundaries(2);
        apply_override(&mut t, HalfAxis::MinusX, Boundary::NoFlux);
        assert_eq!(t[HalfAxis::MinusX.index()], Boundary::NoFlux);
        assert_eq!(t[HalfAxis::PlusX.index()], Boundary::NoFlux);
        assert_eq!(t[HalfAxis::PlusY.index()], Boundary::Periodic);
    }

    #[test]
    fn opposite_and_axis() {
        for face in HalfAxis::ALL {
            assert_eq!(face.opposite().opposite(), face);
            assert_eq!(face.opposite().axis(), face.axis());
        }
        assert_eq!(HalfAxis::lower(1), HalfAxis::MinusY);
        assert_eq!(HalfAxis::upper(2), HalfAxis::PlusZ);
    }
}
