//! Benchmark profiles for the Potts engine.
//!
//! - [`reference_profile`]: 100×100 square lattice tiled with 10×10
//!   cells, contact + volume + surface energies
//! - [`chain_profile`]: rows of five-segment rods under rod mechanics
//!   on an otherwise empty lattice

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use potts_core::{CellId, CellTypeId, Site};
use potts_energy::PluginSet;
use potts_engine::{ConfigError, EngineConfig, MetropolisEngine};
use potts_lattice::{LatticeConfig, Structure};
use potts_plugins::{BendingModel, InteractionEnergy, RodMechanics, SurfaceConstraint, VolumeConstraint};

/// Side of the reference lattice.
pub const SIDE: u32 = 100;

/// Side of one tiled cell.
pub const CELL_SIDE: i32 = 10;

fn config(seed: u64, workers: usize) -> EngineConfig {
    EngineConfig {
        lattice: LatticeConfig::new(Structure::Square, [SIDE, SIDE, 1]),
        temperature: 10.0,
        seed,
        workers,
        ..EngineConfig::default()
    }
}

fn tissue_plugins() -> Result<PluginSet, ConfigError> {
    let contact = InteractionEnergy::builder()
        .contact(CellTypeId(1), CellTypeId::MEDIUM, 16.0)
        .contact(CellTypeId(1), CellTypeId(1), 8.0)
        .default_energy(12.0)
        .build()?;
    let volume = VolumeConstraint::builder()
        .target(f64::from(CELL_SIDE * CELL_SIDE - 4))
        .strength(1.0)
        .build()?;
    let surface = SurfaceConstraint::builder()
        .target(f64::from(4 * CELL_SIDE))
        .strength(0.2)
        .build()?;
    Ok(PluginSet::new()
        .with_energy(Arc::new(contact))
        .with_energy(Arc::new(volume))
        .with_energy(Arc::new(surface)))
}

/// Reference profile: every other tile of the lattice holds a cell of
/// type 1, leaving medium channels between them.
pub fn reference_profile(seed: u64, workers: usize) -> Result<MetropolisEngine, ConfigError> {
    let mut engine = MetropolisEngine::new(config(seed, workers), tissue_plugins()?)?;
    engine.layout(|reg, _| {
        let tiles = SIDE as i32 / CELL_SIDE;
        for ty in 0..tiles {
            for tx in (ty % 2..tiles).step_by(2) {
                let cell = reg.create_cell(CellTypeId(1));
                for y in ty * CELL_SIDE + 1..(ty + 1) * CELL_SIDE - 1 {
                    for x in tx * CELL_SIDE + 1..(tx + 1) * CELL_SIDE - 1 {
                        reg.assign(Site::new(x, y, 0), cell)?;
                    }
                }
            }
        }
        Ok(())
    })?;
    Ok(engine)
}

/// Chain profile: five-segment rods laid along x in the medium rows of
/// an otherwise empty lattice.
pub fn chain_profile(seed: u64, workers: usize) -> Result<MetropolisEngine, ConfigError> {
    let rod = RodMechanics::builder()
        .bending_model(BendingModel::Tube, 1.0)
        .axial(2.0)
        .bending(4.0)
        .interface(1.0, 1.0)
        .build()?;
    let plugins = tissue_plugins()?.with_energy(Arc::new(rod));
    let mut engine = MetropolisEngine::new(config(seed, workers), plugins)?;
    engine.layout(|reg, _| {
        for row in (4..SIDE as i32).step_by(12) {
            let mut members: Vec<CellId> = Vec::with_capacity(5);
            for k in 0..5 {
                let segment = reg.create_cell(CellTypeId(1));
                for y in row..row + 4 {
                    for x in 10 + 4 * k..14 + 4 * k {
                        reg.assign(Site::new(x, y, 0), segment)?;
                    }
                }
                members.push(segment);
            }
            reg.create_composite(CellTypeId(2), &members)?;
        }
        Ok(())
    })?;
    Ok(engine)
}
