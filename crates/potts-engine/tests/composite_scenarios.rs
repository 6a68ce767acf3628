//! Composite chains under the Metropolis engine: growth that leaves the
//! chain geometry alone, thinning a contact, and severing one.

use std::sync::Arc;

use potts_cells::UpdateProposal;
use potts_core::{CellId, CellTypeId, Site};
use potts_energy::PluginSet;
use potts_engine::{EngineConfig, EngineState, MetropolisEngine, StepOutcome};
use potts_lattice::{LatticeConfig, Structure};
use potts_plugins::VolumeConstraint;
use potts_test_utils::{fill, three_segment_chain};

// ── Helpers ─────────────────────────────────────────────────────

fn engine(plugins: PluginSet) -> MetropolisEngine {
    let config = EngineConfig {
        lattice: LatticeConfig::new(Structure::Square, [20, 20, 1]),
        temperature: 1.0,
        seed: 5,
        ..EngineConfig::default()
    };
    MetropolisEngine::new(config, plugins).unwrap()
}

/// Chain of three 3×3 segments from (2, 2) to (10, 4).
fn with_chain(engine: &mut MetropolisEngine) -> (CellId, [CellId; 3]) {
    let mut out = (CellId::MEDIUM, [CellId::MEDIUM; 3]);
    engine
        .layout(|reg, _| {
            out = three_segment_chain(reg, CellTypeId(1), CellTypeId(2), 2, 2);
            Ok(())
        })
        .unwrap();
    out
}

fn proposal(engine: &MetropolisEngine, focus: (i32, i32), source: (i32, i32)) -> UpdateProposal {
    UpdateProposal::build(
        engine.registry(),
        Site::new(focus.0, focus.1, 0),
        Site::new(source.0, source.1, 0),
    )
    .unwrap()
}

// ── Scenarios ───────────────────────────────────────────────────

#[test]
fn middle_growth_keeps_end_orientations() {
    let volume = VolumeConstraint::builder()
        .cell_type(CellTypeId(1))
        .target(12.0)
        .build()
        .unwrap();
    let mut engine = engine(PluginSet::new().with_energy(Arc::new(volume)));
    let (chain, [s0, s1, s2]) = with_chain(&mut engine);
    let reg = engine.registry();
    let o0 = reg.orientation(s0).unwrap();
    let o2 = reg.orientation(s2).unwrap();
    let center = reg.center(chain).unwrap();

    // (6, 5) sits above the middle of s1 and touches neither s0 nor s2.
    let p = proposal(&engine, (6, 5), (6, 4));
    assert_eq!(p.gaining(), s1);
    // Volume 9 → 10 toward a target of 12: (12−10)² − (12−9)² = −5.
    let outcome = engine.apply(&p, 0.999).unwrap();
    assert_eq!(outcome, StepOutcome::Accepted { delta: -5.0 });

    let reg = engine.registry();
    assert_eq!(reg.cell_at(Site::new(6, 5, 0)), Ok(s1));
    assert_eq!(reg.orientation(s0).unwrap(), o0);
    assert_eq!(reg.orientation(s2).unwrap(), o2);
    assert_ne!(reg.center(chain).unwrap(), center);
}

#[test]
fn thinning_a_contact_is_accepted() {
    let mut engine = engine(PluginSet::new());
    let (_, [s0, s1, _]) = with_chain(&mut engine);
    assert_eq!(engine.registry().interface_length(s0, s1), 3);

    // s0 gives (4, 4) to the medium; two contacts with s1 remain.
    let p = proposal(&engine, (4, 4), (4, 5));
    assert_eq!(engine.apply(&p, 0.5).unwrap(), StepOutcome::Accepted { delta: 0.0 });
    assert_eq!(engine.registry().interface_length(s0, s1), 2);
}

#[test]
fn severing_a_contact_is_rejected() {
    let mut engine = engine(PluginSet::new());
    let mut ids = [CellId::MEDIUM; 3];
    engine
        .layout(|reg, _| {
            // s0 is a single row touching s1 through one relation.
            for (i, (xs, ys)) in [(2..5, 3..4), (5..8, 2..5), (8..11, 2..5)].into_iter().enumerate() {
                ids[i] = reg.create_cell(CellTypeId(1));
                fill(reg, ids[i], xs, ys);
            }
            reg.create_composite(CellTypeId(2), &ids).map(|_| ())
        })
        .unwrap();
    let [s0, s1, s2] = ids;
    assert_eq!(engine.registry().interface_length(s0, s1), 1);
    let hash = engine.state_hash();

    let p = proposal(&engine, (4, 3), (4, 4));
    assert_eq!(engine.apply(&p, 0.0).unwrap(), StepOutcome::Severed);
    assert_eq!(engine.state(), EngineState::Rejected);
    assert_eq!(engine.state_hash(), hash);
    assert_eq!(engine.totals().rejected_composite, 1);
    assert_eq!(engine.registry().interface_length(s1, s2), 3);
}

#[test]
fn chain_survives_a_run() {
    let mut engine = engine(PluginSet::new());
    let (chain, [s0, s1, s2]) = with_chain(&mut engine);
    engine.run_mcs(5).unwrap();
    let reg = engine.registry();
    assert!(reg.interface_length(s0, s1) > 0);
    assert!(reg.interface_length(s1, s2) > 0);
    assert_eq!(reg.center(chain).unwrap(), reg.member_weighted_center(chain).unwrap());
    assert_eq!(
        reg.node_count(chain).unwrap(),
        [s0, s1, s2].iter().map(|&s| reg.node_count(s).unwrap()).sum::<usize>()
    );
}
