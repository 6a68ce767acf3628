//! Test utilities and mock types for Potts engine development.
//!
//! Provides registry fixtures (blocks of sites, three-segment chains),
//! in-memory [`SymbolSource`]s, and the mock plugins in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use potts_cells::CellRegistry;
use potts_core::{CellId, CellTypeId, Focus, Site, SymbolError, SymbolSource, Vec3};
use potts_lattice::{
    Boundary, HalfAxis, LatticeConfig, LatticeDescriptor, NeighborhoodSpec, Structure,
};

pub use fixtures::{ConstantDelta, FailingContributor, RecordingListener};

// ── Registries ──────────────────────────────────────────────────

/// Registry over `config` with an order-1 interface neighborhood and no
/// periodic center recompute.
pub fn registry(config: LatticeConfig) -> CellRegistry {
    let lattice = LatticeDescriptor::new(&config).expect("valid lattice config");
    CellRegistry::new(Arc::new(lattice), &NeighborhoodSpec::Order(1), 0)
        .expect("order-1 neighborhood resolves")
}

/// Periodic `n`×`n` square lattice.
pub fn periodic_square(n: u32) -> CellRegistry {
    registry(LatticeConfig::new(Structure::Square, [n, n, 1]))
}

/// `n`×`n` square lattice with noflux faces on both axes.
pub fn closed_square(n: u32) -> CellRegistry {
    registry(
        LatticeConfig::new(Structure::Square, [n, n, 1])
            .with_boundary(HalfAxis::MinusX, Boundary::NoFlux)
            .with_boundary(HalfAxis::MinusY, Boundary::NoFlux),
    )
}

/// Periodic ring of `n` sites.
pub fn ring(n: u32) -> CellRegistry {
    registry(LatticeConfig::new(Structure::Linear, [n, 1, 1]))
}

/// Assign every site of the rectangle `xs`×`ys` (z = 0) to `cell`.
pub fn fill(reg: &mut CellRegistry, cell: CellId, xs: Range<i32>, ys: Range<i32>) {
    for y in ys {
        for x in xs.clone() {
            reg.assign(Site::new(x, y, 0), cell).expect("site on lattice");
        }
    }
}

/// A new atomic cell of `cell_type` owning the rectangle `xs`×`ys`.
pub fn block(reg: &mut CellRegistry, cell_type: CellTypeId, xs: Range<i32>, ys: Range<i32>) -> CellId {
    let cell = reg.create_cell(cell_type);
    fill(reg, cell, xs, ys);
    cell
}

/// A composite of three 3×3 segments laid side by side along x,
/// starting at `(x0, y0)`. Returns `(composite, [s0, s1, s2])`.
pub fn three_segment_chain(
    reg: &mut CellRegistry,
    segment_type: CellTypeId,
    composite_type: CellTypeId,
    x0: i32,
    y0: i32,
) -> (CellId, [CellId; 3]) {
    let s0 = block(reg, segment_type, x0..x0 + 3, y0..y0 + 3);
    let s1 = block(reg, segment_type, x0 + 3..x0 + 6, y0..y0 + 3);
    let s2 = block(reg, segment_type, x0 + 6..x0 + 9, y0..y0 + 3);
    let composite = reg
        .create_composite(composite_type, &[s0, s1, s2])
        .expect("fresh atomic members");
    (composite, [s0, s1, s2])
}

// ── Symbol sources ──────────────────────────────────────────────

/// Symbol source backed by fixed, focus-independent values.
#[derive(Clone, Debug, Default)]
pub struct MapSymbols {
    scalars: HashMap<String, f64>,
    vectors: HashMap<String, Vec3>,
}

impl MapSymbols {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scalar(mut self, name: &str, value: f64) -> Self {
        self.scalars.insert(name.to_string(), value);
        self
    }

    pub fn with_vector(mut self, name: &str, value: Vec3) -> Self {
        self.vectors.insert(name.to_string(), value);
        self
    }
}

impl SymbolSource for MapSymbols {
    fn scalar(&self, symbol: &str, _focus: &Focus) -> Result<f64, SymbolError> {
        self.scalars
            .get(symbol)
            .copied()
            .ok_or_else(|| SymbolError::Unknown {
                symbol: symbol.to_string(),
            })
    }

    fn vector(&self, symbol: &str, _focus: &Focus) -> Result<Vec3, SymbolError> {
        self.vectors
            .get(symbol)
            .copied()
            .ok_or_else(|| SymbolError::Unknown {
                symbol: symbol.to_string(),
            })
    }
}

/// Symbol source whose every lookup fails with an evaluation error.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingSymbols;

impl SymbolSource for FailingSymbols {
    fn scalar(&self, symbol: &str, _focus: &Focus) -> Result<f64, SymbolError> {
        Err(SymbolError::Evaluation {
            symbol: symbol.to_string(),
            reason: "field solver unavailable".to_string(),
        })
    }

    fn vector(&self, symbol: &str, _focus: &Focus) -> Result<Vec3, SymbolError> {
        Err(SymbolError::Evaluation {
            symbol: symbol.to_string(),
            reason: "field solver unavailable".to_string(),
        })
    }
}
