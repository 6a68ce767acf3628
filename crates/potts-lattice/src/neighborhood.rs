//! Neighborhood definitions and the lazy neighbor iterator.

use std::fmt;

use potts_core::Site;

use crate::descriptor::LatticeDescriptor;
use crate::error::LatticeError;
use crate::structure::Structure;

/// How a neighborhood is selected from a structure's direction table.
#[derive(Clone, Debug, PartialEq)]
pub enum NeighborhoodSpec {
    /// All offsets within the first `n` topological rings.
    Order(u32),
    /// All complete rings whose members lie within this Euclidean
    /// distance (boundary inclusive), measured in orthogonal space.
    Distance(f64),
    /// A named template. Names that match no template but parse as a
    /// number are read as an order (integers) or a distance.
    Named(String),
}

impl Default for NeighborhoodSpec {
    fn default() -> Self {
        Self::Order(1)
    }
}

impl fmt::Display for NeighborhoodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Order(n) => write!(f, "order {n}"),
            Self::Distance(d) => write!(f, "distance {d}"),
            Self::Named(name) => write!(f, "'{name}'"),
        }
    }
}

const DISTANCE_TOLERANCE: f64 = 1e-5;

/// A resolved set of neighbor offsets.
///
/// Offsets may repeat (weighted templates); every offset's negation is
/// present, so the induced neighbor relation is symmetric.
#[derive(Clone, Debug, PartialEq)]
pub struct Neighborhood {
    offsets: Vec<Site>,
    order: u32,
}

impl Neighborhood {
    /// Resolve `spec` against `structure`.
    pub fn resolve(structure: Structure, spec: &NeighborhoodSpec) -> Result<Self, LatticeError> {
        match spec {
            NeighborhoodSpec::Order(order) => Self::by_order(structure, *order),
            NeighborhoodSpec::Distance(distance) => Self::by_distance(structure, *distance),
            NeighborhoodSpec::Named(name) => Self::by_name(structure, name),
        }
    }

    fn by_order(structure: Structure, order: u32) -> Result<Self, LatticeError> {
        if order == 0 {
            return Err(LatticeError::ZeroOrder);
        }
        let max = structure.max_order();
        if order > max {
            return Err(LatticeError::OrderTooLarge {
                requested: order,
                max,
            });
        }
        let count: usize = structure.per_order()[..order as usize].iter().sum();
        Ok(Self {
            offsets: structure.directions()[..count].to_vec(),
            order,
        })
    }

    fn by_distance(structure: Structure, distance: f64) -> Result<Self, LatticeError> {
        if !distance.is_finite() || distance <= 0.0 {
            return Err(LatticeError::InvalidDistance { value: distance });
        }
        if distance >= 4.0 {
            return Err(LatticeError::DistanceTooLarge { value: distance });
        }
        let dirs = structure.directions();
        let mut count = 0;
        let mut order = 0;
        for &ring in structure.per_order() {
            let first = structure.to_orth(dirs[count].to_vec3()).length();
            if first >= distance + DISTANCE_TOLERANCE {
                break;
            }
            count += ring;
            order += 1;
        }
        if count == 0 {
            return Err(LatticeError::EmptyNeighborhood);
        }
        Ok(Self {
            offsets: dirs[..count].to_vec(),
            order,
        })
    }

    fn by_name(structure: Structure, name: &str) -> Result<Self, LatticeError> {
        if let Some((offsets, order)) = structure.template(name) {
            return Ok(Self {
                offsets: offsets.to_vec(),
                order,
            });
        }
        let trimmed = name.trim();
        if let Ok(order) = trimmed.parse::<u32>() {
            return Self::by_order(structure, order);
        }
        if let Ok(distance) = trimmed.parse::<f64>() {
            return Self::by_distance(structure, distance);
        }
        Err(LatticeError::UnknownNeighborhood {
            name: name.to_string(),
        })
    }

    /// The neighbor offsets in canonical order.
    pub fn offsets(&self) -> &[Site] {
        &self.offsets
    }

    /// Number of offsets.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether the neighborhood has no offsets.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Topological order this neighborhood covers.
    pub fn order(&self) -> u32 {
        self.order
    }
}

/// Lazy iterator over the resolved neighbors of one site.
///
/// Offsets that leave the lattice through a noflux face are skipped.
/// Clone the iterator to restart it.
#[derive(Clone)]
pub struct Neighbors<'a> {
    lattice: &'a LatticeDescriptor,
    center: Site,
    offsets: std::slice::Iter<'a, Site>,
}

impl<'a> Neighbors<'a> {
    pub(crate) fn new(lattice: &'a LatticeDescriptor, hood: &'a Neighborhood, center: Site) -> Self {
        Self {
            lattice,
            center,
            offsets: hood.offsets.iter(),
        }
    }
}

impl Iterator for Neighbors<'_> {
    type Item = Site;

    fn next(&mut self) -> Option<Site> {
        for &offset in self.offsets.by_ref() {
            if let Some(site) = self.lattice.resolve(self.center + offset) {
                return Some(site);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.offsets.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Order tests ─────────────────────────────────────────────

    #[test]
    fn order_one_sizes() {
        let sizes: Vec<usize> = [
            Structure::Linear,
            Structure::Square,
            Structure::Hexagonal,
            Structure::Cubic,
        ]
        .iter()
        .map(|st| Neighborhood::resolve(*st, &NeighborhoodSpec::Order(1)).unwrap().len())
        .collect();
        assert_eq!(sizes, vec![2, 4, 6, 6]);
    }

    #[test]
    fn square_order_two_is_moore() {
        let n = Neighborhood::resolve(Structure::Square, &NeighborhoodSpec::Order(2)).unwrap();
        assert_eq!(n.len(), 8);
        assert_eq!(n.order(), 2);
    }

    #[test]
    fn order_zero_is_config_error() {
        assert_eq!(
            Neighborhood::resolve(Structure::Square, &NeighborhoodSpec::Order(0)),
            Err(LatticeError::ZeroOrder)
        );
    }

    #[test]
    fn order_beyond_table_is_config_error() {
        assert_eq!(
            Neighborhood::resolve(Structure::Linear, &NeighborhoodSpec::Order(4)),
            Err(LatticeError::OrderTooLarge {
                requested: 4,
                max: 3
            })
        );
    }

    // ── Distance tests ──────────────────────────────────────────

    #[test]
    fn distance_is_boundary_inclusive() {
        let n = Neighborhood::resolve(Structure::Square, &NeighborhoodSpec::Distance(1.0)).unwrap();
        assert_eq!(n.len(), 4);
        let n = Neighborhood::resolve(
            Structure::Square,
            &NeighborhoodSpec::Distance(std::f64::consts::SQRT_2),
        )
        .unwrap();
        assert_eq!(n.len(), 8);
        let n = Neighborhood::resolve(Structure::Square, &NeighborhoodSpec::Distance(2.0)).unwrap();
        assert_eq!(n.len(), 12);
    }

    #[test]
    fn hex_distance_uses_orthogonal_space() {
        let n =
            Neighborhood::resolve(Structure::Hexagonal, &NeighborhoodSpec::Distance(1.5)).unwrap();
        assert_eq!(n.len(), 6);
        let n =
            Neighborhood::resolve(Structure::Hexagonal, &NeighborhoodSpec::Distance(1.8)).unwrap();
        assert_eq!(n.len(), 12);
    }

    #[test]
    fn distance_bounds() {
        assert!(matches!(
            Neighborhood::resolve(Structure::Square, &NeighborhoodSpec::Distance(0.0)),
            Err(LatticeError::InvalidDistance { .. })
        ));
        assert!(matches!(
            Neighborhood::resolve(Structure::Square, &NeighborhoodSpec::Distance(-1.0)),
            Err(LatticeError::InvalidDistance { .. })
        ));
        assert!(matches!(
            Neighborhood::resolve(Structure::Square, &NeighborhoodSpec::Distance(4.0)),
            Err(LatticeError::DistanceTooLarge { .. })
        ));
        assert_eq!(
            Neighborhood::resolve(Structure::Square, &NeighborhoodSpec::Distance(0.5)),
            Err(LatticeError::EmptyNeighborhood)
        );
    }

    // ── Named tests ─────────────────────────────────────────────

    #[test]
    fn named_template_and_numeric_fallback() {
        let fchc =
            Neighborhood::resolve(Structure::Cubic, &NeighborhoodSpec::Named("fchc".into())).unwrap();
        assert_eq!(fchc.len(), 24);
        let by_order =
            Neighborhood::resolve(Structure::Square, &NeighborhoodSpec::Named("2".into())).unwrap();
        assert_eq!(by_order.len(), 8);
        let by_distance =
            Neighborhood::resolve(Structure::Square, &NeighborhoodSpec::Named("2.0".into()))
                .unwrap();
        assert_eq!(by_distance.len(), 12);
        assert_eq!(
            Neighborhood::resolve(Structure::Square, &NeighborhoodSpec::Named("moore".into())),
            Err(LatticeError::UnknownNeighborhood {
                name: "moore".into()
            })
        );
    }
}
