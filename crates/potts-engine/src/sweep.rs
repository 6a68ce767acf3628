//! Partitioned parallel sweep.
//!
//! Each worker owns one random stream and a stripe of the lattice along
//! its longest axis. A sweep runs in rounds:
//!
//! 1. Workers draw and evaluate up to [`ROUND_BATCH`] candidates each,
//!    in parallel, against the frozen registry.
//! 2. A single writer walks the candidates in worker-index order, then
//!    draw order, and commits the accepted ones.
//!
//! A candidate whose read set intersects what earlier commits of the
//! round changed is rebuilt and re-evaluated against the current state,
//! keeping its original acceptance draw. Results therefore depend only
//! on the seed and the worker count, never on thread timing.
//!
//! The medium's aggregate counters are not part of any read set: the
//! medium touches nearly every commit, and its node count and center are
//! not tracked.

use std::thread;

use indexmap::IndexSet;
use potts_cells::{CellRegistry, UpdateProposal};
use potts_core::{CellId, Site, StepError};
use potts_energy::{EnergyContext, PluginSet};
use potts_lattice::{LatticeDescriptor, Neighborhood};
use potts_random::RandomSource;
use smallvec::SmallVec;
use tracing::debug;

use crate::composite::CompositeCellCoordinator;
use crate::metropolis::{accepts, evaluate, random_source, Evaluation, MetropolisEngine, StepOutcome};

/// Candidates each worker produces per round.
pub const ROUND_BATCH: usize = 64;

// ── Stripe ──────────────────────────────────────────────────────

/// A worker's slab of the lattice: `lo..hi` along `axis`, full extent
/// along the other axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Stripe {
    axis: usize,
    lo: i32,
    hi: i32,
}

impl Stripe {
    /// Split the longest axis (the first one on ties) into at most
    /// `workers` near-equal stripes. Never more stripes than layers.
    pub(crate) fn partition(lattice: &LatticeDescriptor, workers: usize) -> Vec<Stripe> {
        let extent = lattice.extent();
        let axis = (0..3).fold(0, |best, a| if extent[a] > extent[best] { a } else { best });
        let len = extent[axis].max(1) as usize;
        let n = workers.clamp(1, len);
        (0..n)
            .map(|w| Stripe {
                axis,
                lo: (w * len / n) as i32,
                hi: ((w + 1) * len / n) as i32,
            })
            .collect()
    }

    /// Uniform site inside the stripe.
    fn draw(&self, extent: [i32; 3], rng: &mut RandomSource) -> Site {
        let mut c = [0i32; 3];
        for (a, coord) in c.iter_mut().enumerate() {
            *coord = if a == self.axis {
                self.lo + rng.bounded_int((self.hi - self.lo - 1) as u64) as i32
            } else {
                rng.bounded_int((extent[a].max(1) - 1) as u64) as i32
            };
        }
        Site::new(c[0], c[1], c[2])
    }
}

// ── Candidates ──────────────────────────────────────────────────

/// One pre-evaluated copy attempt.
struct Candidate {
    focus: Site,
    source: Option<Site>,
    draw: f64,
    built: Option<(UpdateProposal, Evaluation)>,
    read_sites: SmallVec<[usize; 16]>,
    read_cells: SmallVec<[CellId; 8]>,
}

impl Candidate {
    fn touches(&self, dirty_sites: &IndexSet<usize>, dirty_cells: &IndexSet<CellId>) -> bool {
        self.read_sites.iter().any(|i| dirty_sites.contains(i))
            || self.read_cells.iter().any(|c| dirty_cells.contains(c))
    }
}

/// Cells whose aggregates `proposal` reads or writes, medium excluded.
fn involved_cells(proposal: &UpdateProposal) -> SmallVec<[CellId; 8]> {
    let mut cells: SmallVec<[CellId; 8]> = SmallVec::new();
    let neighbors = proposal.neighbors().iter().map(|&(c, _)| c);
    for cell in proposal.acting_cells().into_iter().chain(neighbors) {
        if !cell.is_medium() && !cells.contains(&cell) {
            cells.push(cell);
        }
    }
    cells
}

/// Shared read-only state handed to every worker.
#[derive(Clone, Copy)]
struct Frozen<'a> {
    ctx: &'a EnergyContext<'a>,
    plugins: &'a PluginSet,
    coordinator: &'a CompositeCellCoordinator,
    hood: &'a Neighborhood,
}

impl Frozen<'_> {
    fn registry(&self) -> &CellRegistry {
        self.ctx.registry()
    }

    fn propose(&self, stripe: Stripe, rng: &mut RandomSource, count: usize) -> Result<Vec<Candidate>, StepError> {
        let lattice = self.ctx.lattice();
        let extent = lattice.extent();
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let focus = stripe.draw(extent, rng);
            let source = random_source(lattice, self.hood, focus, rng);
            let draw = rng.uniform01();

            let mut read_sites: SmallVec<[usize; 16]> = SmallVec::new();
            read_sites.extend(lattice.index_of(focus));
            read_sites.extend(source.and_then(|s| lattice.index_of(s)));
            read_sites.extend(
                self.registry()
                    .interface_sites(focus)
                    .filter_map(|s| lattice.index_of(s)),
            );

            let proposal = source.and_then(|s| UpdateProposal::build(self.registry(), focus, s));
            let (built, read_cells) = match proposal {
                Some(p) => {
                    let evaluation = evaluate(&p, self.ctx, self.plugins, self.coordinator)?;
                    let cells = involved_cells(&p);
                    (Some((p, evaluation)), cells)
                }
                None => (None, SmallVec::new()),
            };
            out.push(Candidate {
                focus,
                source,
                draw,
                built,
                read_sites,
                read_cells,
            });
        }
        Ok(out)
    }
}

// ── Sweep ───────────────────────────────────────────────────────

impl MetropolisEngine {
    /// One Monte Carlo step split across the worker stripes.
    pub(crate) fn parallel_sweep(&mut self) -> Result<(), StepError> {
        let n = self.stripes.len();
        let mut remaining: Vec<usize> = (0..n)
            .map(|w| self.updates_per_mcs / n + usize::from(w < self.updates_per_mcs % n))
            .collect();

        while remaining.iter().any(|&r| r > 0) {
            let counts: Vec<usize> = remaining.iter().map(|&r| r.min(ROUND_BATCH)).collect();
            for (r, c) in remaining.iter_mut().zip(&counts) {
                *r -= c;
            }
            let batches = self.propose_round(&counts)?;
            self.commit_round(batches)?;
        }
        Ok(())
    }

    fn propose_round(&mut self, counts: &[usize]) -> Result<Vec<Vec<Candidate>>, StepError> {
        let ctx = EnergyContext::new(&self.registry, &self.properties, self.symbols.as_ref(), self.mcs());
        let frozen = Frozen {
            ctx: &ctx,
            plugins: &self.plugins,
            coordinator: &self.coordinator,
            hood: &self.update_hood,
        };
        let stripes = &self.stripes;
        let streams = self.pool.streams_mut();

        let results: Vec<Result<Vec<Candidate>, StepError>> = thread::scope(|scope| {
            let handles: Vec<_> = streams
                .iter_mut()
                .zip(stripes)
                .zip(counts)
                .map(|((rng, &stripe), &count)| scope.spawn(move || frozen.propose(stripe, rng, count)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });
        results.into_iter().collect()
    }

    fn commit_round(&mut self, batches: Vec<Vec<Candidate>>) -> Result<(), StepError> {
        let mut dirty_sites: IndexSet<usize> = IndexSet::new();
        let mut dirty_cells: IndexSet<CellId> = IndexSet::new();

        for candidate in batches.into_iter().flatten() {
            let touching = candidate.touches(&dirty_sites, &dirty_cells);
            let built = if touching {
                self.count_reevaluation();
                debug!(focus = ?candidate.focus, "re-evaluating touching candidate");
                match candidate
                    .source
                    .and_then(|s| UpdateProposal::build(&self.registry, candidate.focus, s))
                {
                    Some(p) => {
                        let evaluation = self.evaluate(&p)?;
                        Some((p, evaluation))
                    }
                    None => None,
                }
            } else {
                candidate.built
            };

            let outcome = match built {
                None => StepOutcome::NoOp,
                Some((_, Evaluation::Severed)) => StepOutcome::Severed,
                Some((proposal, Evaluation::Delta(delta))) => {
                    if accepts(delta, self.temperature, candidate.draw) {
                        let outcome = self.settle(&proposal, delta, true)?;
                        if outcome.is_accepted() {
                            dirty_sites.extend(self.registry.lattice().index_of(proposal.focus()));
                            dirty_cells.extend(involved_cells(&proposal));
                        }
                        outcome
                    } else {
                        StepOutcome::Rejected { delta }
                    }
                }
            };
            self.finish(outcome);
        }
        Ok(())
    }
}
