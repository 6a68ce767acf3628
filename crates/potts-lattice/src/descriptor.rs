//! The immutable lattice descriptor and its configuration.

use potts_core::{Site, Vec3};

use crate::boundary::{apply_override, default_boundaries, Boundary, HalfAxis};
use crate::error::LatticeError;
use crate::neighborhood::{Neighborhood, NeighborhoodSpec, Neighbors};
use crate::structure::Structure;

/// Setup-time description of a lattice.
///
/// Supplied by an external loader; [`LatticeDescriptor::new`] validates it.
#[derive(Clone, Debug, PartialEq)]
pub struct LatticeConfig {
    /// Node arrangement.
    pub structure: Structure,
    /// Extent along each axis. Axes beyond the structure's
    /// dimensionality are forced to 1.
    pub extent: [u32; 3],
    /// Boundary overrides applied in order on top of the default table.
    pub boundaries: Vec<(HalfAxis, Boundary)>,
    /// Physical length of one node. Default: 1.0.
    pub node_spacing: f64,
    /// Default neighborhood. Default: order 1.
    pub neighborhood: NeighborhoodSpec,
}

impl LatticeConfig {
    /// Configuration with default boundaries, spacing, and neighborhood.
    pub fn new(structure: Structure, extent: [u32; 3]) -> Self {
        Self {
            structure,
            extent,
            boundaries: Vec::new(),
            node_spacing: 1.0,
            neighborhood: NeighborhoodSpec::default(),
        }
    }

    /// Append a boundary override.
    pub fn with_boundary(mut self, face: HalfAxis, boundary: Boundary) -> Self {
        self.boundaries.push((face, boundary));
        self
    }

    /// Replace the default neighborhood.
    pub fn with_neighborhood(mut self, spec: NeighborhoodSpec) -> Self {
        self.neighborhood = spec;
        self
    }
}

/// Static lattice geometry.
///
/// Sites are indexed in row-major order with `x` varying fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct LatticeDescriptor {
    structure: Structure,
    extent: [i32; 3],
    boundaries: [Boundary; 6],
    node_spacing: f64,
    neighborhood: Neighborhood,
}

impl LatticeDescriptor {
    /// Validate `config` and build the descriptor.
    pub fn new(config: &LatticeConfig) -> Result<Self, LatticeError> {
        let dims = config.structure.dims();
        let mut extent = [1i32; 3];
        for (axis, slot) in extent.iter_mut().enumerate().take(dims) {
            let value = config.extent[axis];
            if value == 0 {
                return Err(LatticeError::EmptyAxis { axis });
            }
            *slot = i32::try_from(value).map_err(|_| LatticeError::AxisTooLarge { axis, value })?;
        }
        if !config.node_spacing.is_finite() || config.node_spacing <= 0.0 {
            return Err(LatticeError::InvalidNodeSpacing {
                value: config.node_spacing,
            });
        }
        let mut boundaries = default_boundaries(dims);
        for &(face, boundary) in &config.boundaries {
            apply_override(&mut boundaries, face, boundary);
        }
        let neighborhood = Neighborhood::resolve(config.structure, &config.neighborhood)?;
        Ok(Self {
            structure: config.structure,
            extent,
            boundaries,
            node_spacing: config.node_spacing,
            neighborhood,
        })
    }

    /// Node arrangement.
    pub fn structure(&self) -> Structure {
        self.structure
    }

    /// Number of spatial dimensions.
    pub fn dims(&self) -> usize {
        self.structure.dims()
    }

    /// Extent along each axis.
    pub fn extent(&self) -> [i32; 3] {
        self.extent
    }

    /// Boundary type of one face.
    pub fn boundary(&self, face: HalfAxis) -> Boundary {
        self.boundaries[face.index()]
    }

    /// Whether `axis` wraps.
    pub fn is_periodic(&self, axis: usize) -> bool {
        self.boundary(HalfAxis::lower(axis)) == Boundary::Periodic
            && self.boundary(HalfAxis::upper(axis)) == Boundary::Periodic
    }

    /// Physical length of one node.
    pub fn node_spacing(&self) -> f64 {
        self.node_spacing
    }

    /// Total number of sites.
    pub fn site_count(&self) -> usize {
        self.extent.iter().map(|&e| e as usize).product()
    }

    /// Whether `site` lies inside the bounding box.
    pub fn contains(&self, site: Site) -> bool {
        (0..3).all(|axis| {
            let v = site.axis(axis);
            v >= 0 && v < self.extent[axis]
        })
    }

    /// Canonical index of an in-lattice site.
    pub fn index_of(&self, site: Site) -> Option<usize> {
        if !self.contains(site) {
            return None;
        }
        let [ex, ey, _] = self.extent;
        Some(site.x as usize + ex as usize * (site.y as usize + ey as usize * site.z as usize))
    }

    /// Site at a canonical index. `index` must be below [`site_count`](Self::site_count).
    pub fn site_at(&self, index: usize) -> Site {
        debug_assert!(index < self.site_count(), "site index {index} out of range");
        let [ex, ey, _] = self.extent;
        let (ex, ey) = (ex as usize, ey as usize);
        Site::new(
            (index % ex) as i32,
            ((index / ex) % ey) as i32,
            (index / (ex * ey)) as i32,
        )
    }

    /// Every site in canonical order.
    pub fn sites(&self) -> impl Iterator<Item = Site> + '_ {
        (0..self.site_count()).map(move |i| self.site_at(i))
    }

    /// Map an arbitrary coordinate onto the lattice.
    ///
    /// Periodic faces wrap; a coordinate past a noflux face has no image.
    pub fn resolve(&self, site: Site) -> Option<Site> {
        let mut out = site;
        for axis in 0..3 {
            let len = self.extent[axis];
            let v = site.axis(axis);
            let face = if v < 0 {
                HalfAxis::lower(axis)
            } else if v >= len {
                HalfAxis::upper(axis)
            } else {
                continue;
            };
            match self.boundary(face) {
                Boundary::Periodic => out = out.with_axis(axis, v.rem_euclid(len)),
                Boundary::NoFlux => return None,
            }
        }
        Some(out)
    }

    /// The default neighborhood.
    pub fn default_neighborhood(&self) -> &Neighborhood {
        &self.neighborhood
    }

    /// Resolve another neighborhood against this lattice's structure.
    pub fn resolve_neighborhood(&self, spec: &NeighborhoodSpec) -> Result<Neighborhood, LatticeError> {
        Neighborhood::resolve(self.structure, spec)
    }

    /// Neighbors of `site` in the default neighborhood.
    pub fn neighborhood(&self, site: Site) -> Neighbors<'_> {
        Neighbors::new(self, &self.neighborhood, site)
    }

    /// Neighbors of `site` in `hood`.
    pub fn neighbors<'a>(&'a self, hood: &'a Neighborhood, site: Site) -> Neighbors<'a> {
        Neighbors::new(self, hood, site)
    }

    /// Convert lattice coordinates to orthogonal space.
    pub fn to_orth(&self, v: Vec3) -> Vec3 {
        self.structure.to_orth(v)
    }

    /// Convert lattice coordinates to physical units.
    pub fn to_physical(&self, v: Vec3) -> Vec3 {
        self.to_orth(v) * self.node_spacing
    }

    /// Displacement `a - b` in lattice coordinates, taking the minimum
    /// image along periodic axes.
    pub fn node_distance(&self, a: Vec3, b: Vec3) -> Vec3 {
        let mut d = a - b;
        for axis in 0..self.dims() {
            if self.is_periodic(axis) {
                let len = self.extent[axis] as f64;
                let v = d.axis(axis);
                if 2.0 * v.abs() > len {
                    d = d.with_axis(axis, v - len * (v / len).round());
                }
            }
        }
        d
    }

    /// Fold a point back into the bounding box along periodic axes.
    pub fn wrap_point(&self, v: Vec3) -> Vec3 {
        let mut out = v;
        for axis in 0..self.dims() {
            if self.is_periodic(axis) {
                let len = self.extent[axis] as f64;
                out = out.with_axis(axis, v.axis(axis).rem_euclid(len));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance;
    use proptest::prelude::*;

    fn square(w: u32, h: u32) -> LatticeDescriptor {
        LatticeDescriptor::new(&LatticeConfig::new(Structure::Square, [w, h, 1])).unwrap()
    }

    // ── Constructor tests ───────────────────────────────────────

    #[test]
    fn zero_extent_is_error() {
        assert_eq!(
            LatticeDescriptor::new(&LatticeConfig::new(Structure::Square, [4, 0, 1])),
            Err(LatticeError::EmptyAxis { axis: 1 })
        );
    }

    #[test]
    fn unused_axes_are_forced_to_one() {
        let l = LatticeDescriptor::new(&LatticeConfig::new(Structure::Linear, [10, 0, 7])).unwrap();
        assert_eq!(l.extent(), [10, 1, 1]);
        assert_eq!(l.site_count(), 10);
    }

    #[test]
    fn oversized_axis_is_error() {
        let big = i32::MAX as u32 + 1;
        assert!(matches!(
            LatticeDescriptor::new(&LatticeConfig::new(Structure::Linear, [big, 1, 1])),
            Err(LatticeError::AxisTooLarge { axis: 0, .. })
        ));
    }

    #[test]
    fn bad_node_spacing_is_error() {
        let mut cfg = LatticeConfig::new(Structure::Square, [4, 4, 1]);
        cfg.node_spacing = 0.0;
        assert!(matches!(
            LatticeDescriptor::new(&cfg),
            Err(LatticeError::InvalidNodeSpacing { .. })
        ));
    }

    #[test]
    fn bad_neighborhood_is_error() {
        let cfg = LatticeConfig::new(Structure::Square, [4, 4, 1])
            .with_neighborhood(NeighborhoodSpec::Order(0));
        assert_eq!(LatticeDescriptor::new(&cfg), Err(LatticeError::ZeroOrder));
    }

    // ── Index tests ─────────────────────────────────────────────

    #[test]
    fn index_round_trip() {
        let l = LatticeDescriptor::new(&LatticeConfig::new(Structure::Cubic, [3, 4, 5])).unwrap();
        for i in 0..l.site_count() {
            assert_eq!(l.index_of(l.site_at(i)), Some(i));
        }
        assert_eq!(l.index_of(Site::new(3, 0, 0)), None);
    }

    // ── Boundary tests ──────────────────────────────────────────

    #[test]
    fn periodic_wraps_noflux_drops() {
        let cfg = LatticeConfig::new(Structure::Square, [5, 5, 1])
            .with_boundary(HalfAxis::MinusY, Boundary::NoFlux);
        let l = LatticeDescriptor::new(&cfg).unwrap();
        assert_eq!(l.resolve(Site::new(-1, 2, 0)), Some(Site::new(4, 2, 0)));
        assert_eq!(l.resolve(Site::new(5, 2, 0)), Some(Site::new(0, 2, 0)));
        assert_eq!(l.resolve(Site::new(2, -1, 0)), None);
        assert_eq!(l.resolve(Site::new(2, 5, 0)), None);
        assert_eq!(l.resolve(Site::new(0, 0, 1)), None);
    }

    #[test]
    fn corner_neighbors_wrap_on_torus() {
        let l = square(5, 5);
        let n: Vec<Site> = l.neighborhood(Site::new(0, 0, 0)).collect();
        assert_eq!(
            n,
            vec![
                Site::new(1, 0, 0),
                Site::new(0, 1, 0),
                Site::new(4, 0, 0),
                Site::new(0, 4, 0)
            ]
        );
    }

    #[test]
    fn neighbor_iterator_restarts() {
        let l = square(5, 5);
        let it = l.neighborhood(Site::new(2, 2, 0));
        let first: Vec<Site> = it.clone().collect();
        let second: Vec<Site> = it.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn node_distance_takes_minimum_image() {
        let l = square(10, 10);
        let d = l.node_distance(Vec3::new(9.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(d, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(
            l.wrap_point(Vec3::new(-0.5, 10.5, 0.0)),
            Vec3::new(9.5, 0.5, 0.0)
        );
    }

    // ── Compliance suites ───────────────────────────────────────

    #[test]
    fn compliance_square_moore_torus() {
        let cfg = LatticeConfig::new(Structure::Square, [6, 5, 1])
            .with_neighborhood(NeighborhoodSpec::Order(2));
        compliance::run_full_compliance(&LatticeDescriptor::new(&cfg).unwrap());
    }

    #[test]
    fn compliance_square_noflux() {
        let cfg = LatticeConfig::new(Structure::Square, [6, 5, 1])
            .with_boundary(HalfAxis::PlusX, Boundary::NoFlux)
            .with_neighborhood(NeighborhoodSpec::Order(3));
        compliance::run_full_compliance(&LatticeDescriptor::new(&cfg).unwrap());
    }

    #[test]
    fn compliance_hex() {
        let cfg = LatticeConfig::new(Structure::Hexagonal, [8, 8, 1])
            .with_neighborhood(NeighborhoodSpec::Order(2));
        compliance::run_full_compliance(&LatticeDescriptor::new(&cfg).unwrap());
    }

    #[test]
    fn compliance_cubic_fchc() {
        let cfg = LatticeConfig::new(Structure::Cubic, [4, 4, 4])
            .with_neighborhood(NeighborhoodSpec::Named("fchc".into()));
        compliance::run_full_compliance(&LatticeDescriptor::new(&cfg).unwrap());
    }

    #[test]
    fn compliance_linear_tiny_ring() {
        // Two sites: both offsets of order 1 land on the same neighbor.
        let l = LatticeDescriptor::new(&LatticeConfig::new(Structure::Linear, [2, 1, 1])).unwrap();
        compliance::run_full_compliance(&l);
        assert_eq!(l.neighborhood(Site::new(0, 0, 0)).count(), 2);
    }

    // ── Property tests ──────────────────────────────────────────

    fn arb_boundary() -> impl Strategy<Value = Boundary> {
        prop_oneof![Just(Boundary::Periodic), Just(Boundary::NoFlux)]
    }

    proptest! {
        #[test]
        fn neighbors_symmetric(
            w in 1u32..8,
            h in 1u32..8,
            bx in arb_boundary(),
            by in arb_boundary(),
            order in 1u32..4,
        ) {
            let cfg = LatticeConfig::new(Structure::Square, [w, h, 1])
                .with_boundary(HalfAxis::MinusX, bx)
                .with_boundary(HalfAxis::MinusY, by)
                .with_neighborhood(NeighborhoodSpec::Order(order));
            let l = LatticeDescriptor::new(&cfg).unwrap();
            prop_assert!(compliance::neighbor_relation_is_symmetric(&l));
        }

        #[test]
        fn resolve_lands_inside(
            x in -20i32..20,
            y in -20i32..20,
        ) {
            let l = square(7, 3);
            let site = l.resolve(Site::new(x, y, 0)).unwrap();
            prop_assert!(l.contains(site));
        }
    }
}
