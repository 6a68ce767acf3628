//! The Metropolis copy-attempt loop.
//!
//! # Ownership
//!
//! [`MetropolisEngine`] owns the lattice, the cell registry, the per-cell
//! properties, the plugins, and one random stream per worker. Energy
//! terms only ever see shared borrows through an [`EnergyContext`]; the
//! engine is the single writer of site ownership, and listeners are the
//! single writers of properties between sweeps.
//!
//! # Step
//!
//! One copy attempt draws a focus site and a source site from the update
//! neighborhood, builds an [`UpdateProposal`] giving the focus to the
//! source's owner, runs the composite check, sums the energy deltas, and
//! accepts with probability `min(1, exp(−ΔE/T))`. A non-positive delta
//! is accepted without consuming a random number.

use std::sync::Arc;
use std::time::Instant;

use potts_cells::{CellProperties, CellRegistry, UpdateProposal};
use potts_core::{McsId, NoSymbols, RegistryError, Site, StepError, SymbolSource};
use potts_energy::{EnergyContext, PluginSet, ReportSink, TimeStep};
use potts_lattice::{LatticeDescriptor, Neighborhood};
use potts_random::{RandomPool, RandomSource};
use smallvec::SmallVec;
use tracing::{debug, info, trace};

use crate::composite::{CompositeCellCoordinator, CompositeVerdict};
use crate::config::{ConfigError, EngineConfig, Stepper};
use crate::edge::EdgeTracker;
use crate::metrics::SweepMetrics;
use crate::sweep::Stripe;

// Compile-time assertion: the engine can move to another thread.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<MetropolisEngine>();
    }
};

// ── States and outcomes ─────────────────────────────────────────

/// Where the engine is within the current copy attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EngineState {
    /// No attempt in flight, or the last attempt produced no proposal.
    #[default]
    Idle,
    /// A proposal was built and awaits evaluation.
    ProposalBuilt,
    /// Energy and composite checks have run.
    Evaluated,
    /// The last proposal was committed.
    Accepted,
    /// The last proposal was rejected.
    Rejected,
}

/// Result of one copy attempt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepOutcome {
    /// Focus and source already belonged to the same cell.
    NoOp,
    /// The proposal was committed.
    Accepted {
        /// Summed energy change.
        delta: f64,
    },
    /// The Metropolis criterion rejected the proposal.
    Rejected {
        /// Summed energy change.
        delta: f64,
    },
    /// The proposal would have severed a composite chain.
    Severed,
    /// The focus changed owner since the proposal was built.
    Discarded,
}

impl StepOutcome {
    /// Whether the proposal was committed.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Composite verdict plus energy, before the acceptance test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Evaluation {
    Severed,
    Delta(f64),
}

pub(crate) fn evaluate(
    proposal: &UpdateProposal,
    ctx: &EnergyContext<'_>,
    plugins: &PluginSet,
    coordinator: &CompositeCellCoordinator,
) -> Result<Evaluation, StepError> {
    if let CompositeVerdict::Severs { .. } = coordinator.update_check(proposal, ctx.registry())? {
        return Ok(Evaluation::Severed);
    }
    plugins.delta(proposal, ctx).map(Evaluation::Delta)
}

/// Metropolis criterion for a draw in `[0, 1)`.
pub(crate) fn accepts(delta: f64, temperature: f64, draw: f64) -> bool {
    delta <= 0.0 || draw < (-delta / temperature).exp()
}

/// Uniform site anywhere on the lattice.
fn random_site(lattice: &LatticeDescriptor, rng: &mut RandomSource) -> Site {
    let k = rng.bounded_int(lattice.site_count() as u64 - 1) as usize;
    lattice.site_at(k)
}

/// Uniform neighbor of `focus`. `None` when every offset leaves the
/// lattice.
pub(crate) fn random_source(
    lattice: &LatticeDescriptor,
    hood: &Neighborhood,
    focus: Site,
    rng: &mut RandomSource,
) -> Option<Site> {
    let candidates: SmallVec<[Site; 32]> = lattice.neighbors(hood, focus).collect();
    if candidates.is_empty() {
        return None;
    }
    let k = rng.bounded_int(candidates.len() as u64 - 1) as usize;
    Some(candidates[k])
}

// ── MetropolisEngine ────────────────────────────────────────────

/// Lattice Metropolis engine.
///
/// Create with [`new()`](Self::new), place cells with
/// [`layout()`](Self::layout), then drive with [`run_mcs()`](Self::run_mcs)
/// or single [`step()`](Self::step)s.
pub struct MetropolisEngine {
    pub(crate) lattice: Arc<LatticeDescriptor>,
    pub(crate) update_hood: Neighborhood,
    pub(crate) registry: CellRegistry,
    pub(crate) properties: CellProperties,
    pub(crate) plugins: PluginSet,
    pub(crate) symbols: Arc<dyn SymbolSource>,
    pub(crate) coordinator: CompositeCellCoordinator,
    pub(crate) pool: RandomPool,
    pub(crate) stripes: Vec<Stripe>,
    edges: Option<EdgeTracker>,
    pub(crate) temperature: f64,
    pub(crate) updates_per_mcs: usize,
    workers: usize,
    state: EngineState,
    mcs: McsId,
    started: bool,
    pub(crate) sweep: SweepMetrics,
    totals: SweepMetrics,
}

impl MetropolisEngine {
    /// Validate `config` and `plugins` and set up an empty lattice owned
    /// by the medium.
    pub fn new(config: EngineConfig, plugins: PluginSet) -> Result<Self, ConfigError> {
        config.validate()?;
        plugins.validate()?;
        let lattice = Arc::new(LatticeDescriptor::new(&config.lattice)?);
        let update_hood = lattice.resolve_neighborhood(&config.update_neighborhood)?;
        let registry = CellRegistry::new(
            Arc::clone(&lattice),
            &config.interface_neighborhood,
            config.center_recompute_interval,
        )?;
        let pool = RandomPool::seed(config.seed, config.workers);
        let updates_per_mcs = config.updates_per_mcs.unwrap_or(lattice.site_count());
        let edges = match config.stepper {
            Stepper::Random => None,
            Stepper::EdgeList => Some(EdgeTracker::build(&registry, &update_hood)),
        };
        let stripes = Stripe::partition(&lattice, config.workers);

        info!(
            structure = ?lattice.structure(),
            sites = lattice.site_count(),
            workers = config.workers,
            seeds = ?pool.seeds(),
            temperature = config.temperature,
            updates_per_mcs,
            stepper = ?config.stepper,
            "metropolis engine ready"
        );

        Ok(Self {
            lattice,
            update_hood,
            registry,
            properties: CellProperties::new(),
            plugins,
            symbols: Arc::new(NoSymbols),
            coordinator: CompositeCellCoordinator,
            pool,
            stripes,
            edges,
            temperature: config.temperature,
            updates_per_mcs,
            workers: config.workers,
            state: EngineState::Idle,
            mcs: McsId::default(),
            started: false,
            sweep: SweepMetrics::default(),
            totals: SweepMetrics::default(),
        })
    }

    /// Resolve symbolic parameters through `symbols`.
    pub fn with_symbols(mut self, symbols: Arc<dyn SymbolSource>) -> Self {
        self.symbols = symbols;
        self
    }

    /// Place cells and set initial properties.
    ///
    /// Only allowed before the first step. Composite geometry and the
    /// edge list are refreshed afterwards.
    pub fn layout<F>(&mut self, place: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut CellRegistry, &mut CellProperties) -> Result<(), RegistryError>,
    {
        if self.started {
            return Err(ConfigError::AlreadyRunning);
        }
        place(&mut self.registry, &mut self.properties)?;
        self.coordinator.refresh_all(&mut self.registry)?;
        if self.edges.is_some() {
            self.edges = Some(EdgeTracker::build(&self.registry, &self.update_hood));
        }
        Ok(())
    }

    // ── Accessors ───────────────────────────────────────────────

    /// The lattice.
    pub fn lattice(&self) -> &LatticeDescriptor {
        &self.lattice
    }

    /// Committed cell state.
    pub fn registry(&self) -> &CellRegistry {
        &self.registry
    }

    /// Per-cell properties.
    pub fn properties(&self) -> &CellProperties {
        &self.properties
    }

    /// The neighborhood copy sources are drawn from.
    pub fn update_neighborhood(&self) -> &Neighborhood {
        &self.update_hood
    }

    /// State after the most recent attempt.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Completed Monte Carlo steps.
    pub fn mcs(&self) -> McsId {
        self.mcs
    }

    /// Metropolis temperature.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Starting seed of every worker stream.
    pub fn seeds(&self) -> Vec<u64> {
        self.pool.seeds()
    }

    /// Number of workers.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Counters of the current (or most recent) Monte Carlo step.
    pub fn last_sweep(&self) -> &SweepMetrics {
        &self.sweep
    }

    /// Counters since construction.
    pub fn totals(&self) -> &SweepMetrics {
        &self.totals
    }

    /// Digest of the committed state.
    pub fn state_hash(&self) -> u64 {
        self.registry.state_hash()
    }

    pub(crate) fn context(&self) -> EnergyContext<'_> {
        EnergyContext::new(&self.registry, &self.properties, self.symbols.as_ref(), self.mcs)
    }

    /// Absolute energy of the whole system.
    pub fn total_hamiltonian(&self) -> Result<f64, StepError> {
        self.plugins.total_hamiltonian(&self.context())
    }

    /// Run every reporter into `sink`.
    pub fn report(&self, sink: &mut dyn ReportSink) -> Result<(), StepError> {
        self.plugins.report(&self.context(), sink)
    }

    // ── Stepping ────────────────────────────────────────────────

    /// One copy attempt on worker 0's stream.
    pub fn step(&mut self) -> Result<StepOutcome, StepError> {
        self.started = true;
        self.state = EngineState::Idle;
        let rng = self.pool.primary();
        let focus = match &self.edges {
            Some(edges) => edges.pick(&self.registry, rng),
            None => Some(random_site(&self.lattice, rng)),
        };
        let proposal = focus
            .and_then(|f| random_source(&self.lattice, &self.update_hood, f, rng).map(|s| (f, s)))
            .and_then(|(f, s)| UpdateProposal::build(&self.registry, f, s));
        let Some(proposal) = proposal else {
            return Ok(self.finish(StepOutcome::NoOp));
        };
        self.state = EngineState::ProposalBuilt;

        let evaluation = self.evaluate(&proposal)?;
        self.state = EngineState::Evaluated;
        let outcome = match evaluation {
            Evaluation::Severed => StepOutcome::Severed,
            Evaluation::Delta(delta) => {
                let accepted = delta <= 0.0 || {
                    let draw = self.pool.primary().uniform01();
                    accepts(delta, self.temperature, draw)
                };
                self.settle(&proposal, delta, accepted)?
            }
        };
        Ok(self.finish(outcome))
    }

    /// Evaluate and, if accepted against `draw`, commit an externally
    /// built proposal.
    ///
    /// A proposal whose focus changed owner, or whose gaining cell no
    /// longer exists, is discarded without evaluation.
    pub fn apply(&mut self, proposal: &UpdateProposal, draw: f64) -> Result<StepOutcome, StepError> {
        self.started = true;
        self.state = EngineState::ProposalBuilt;
        let owner = self.registry.cell_at(proposal.focus())?;
        if owner != proposal.losing() || !self.registry.contains(proposal.gaining()) {
            debug!(
                site = ?proposal.focus(),
                expected = %proposal.losing(),
                found = %owner,
                "discarding stale proposal"
            );
            return Ok(self.finish(StepOutcome::Discarded));
        }
        let outcome = self.decide(proposal, draw)?;
        Ok(self.finish(outcome))
    }

    /// Evaluate, test against `draw`, and commit if accepted.
    pub(crate) fn decide(&mut self, proposal: &UpdateProposal, draw: f64) -> Result<StepOutcome, StepError> {
        let evaluation = self.evaluate(proposal)?;
        self.state = EngineState::Evaluated;
        match evaluation {
            Evaluation::Severed => Ok(StepOutcome::Severed),
            Evaluation::Delta(delta) => {
                self.settle(proposal, delta, accepts(delta, self.temperature, draw))
            }
        }
    }

    pub(crate) fn evaluate(&self, proposal: &UpdateProposal) -> Result<Evaluation, StepError> {
        evaluate(proposal, &self.context(), &self.plugins, &self.coordinator)
    }

    pub(crate) fn settle(
        &mut self,
        proposal: &UpdateProposal,
        delta: f64,
        accepted: bool,
    ) -> Result<StepOutcome, StepError> {
        if !accepted {
            return Ok(StepOutcome::Rejected { delta });
        }
        if self.commit(proposal)? {
            Ok(StepOutcome::Accepted { delta })
        } else {
            Ok(StepOutcome::Discarded)
        }
    }

    /// Commit plus post-commit bookkeeping. `false` when stale.
    fn commit(&mut self, proposal: &UpdateProposal) -> Result<bool, StepError> {
        match self.registry.commit(proposal) {
            Ok(()) => {}
            Err(RegistryError::StaleProposal { site, expected, found }) => {
                debug!(?site, %expected, %found, "discarding stale proposal");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        }
        self.coordinator.after_commit(proposal, &mut self.registry)?;
        if let Some(edges) = &mut self.edges {
            edges.update_around(&self.registry, &self.update_hood, proposal.focus());
        }
        Ok(true)
    }

    /// Record `outcome` and move to the matching terminal state.
    pub(crate) fn finish(&mut self, outcome: StepOutcome) -> StepOutcome {
        self.state = match outcome {
            StepOutcome::Accepted { .. } => EngineState::Accepted,
            StepOutcome::Rejected { .. } | StepOutcome::Severed => EngineState::Rejected,
            StepOutcome::NoOp | StepOutcome::Discarded => EngineState::Idle,
        };
        self.sweep.record(outcome);
        self.totals.record(outcome);
        outcome
    }

    pub(crate) fn count_reevaluation(&mut self) {
        self.sweep.serialized_reevaluations += 1;
        self.totals.serialized_reevaluations += 1;
    }

    /// Run `n` Monte Carlo steps of `updates_per_mcs` attempts each.
    ///
    /// Listeners fire after every step at their interval. Returns the
    /// counters summed over the `n` steps.
    pub fn run_mcs(&mut self, n: u64) -> Result<SweepMetrics, StepError> {
        let mut summary = SweepMetrics::default();
        for _ in 0..n {
            let start = Instant::now();
            self.sweep = SweepMetrics::default();
            if self.workers > 1 {
                self.parallel_sweep()?;
            } else {
                for _ in 0..self.updates_per_mcs {
                    self.step()?;
                }
            }
            let wall_us = start.elapsed().as_micros() as u64;
            self.sweep.wall_us = wall_us;
            self.totals.wall_us += wall_us;
            self.mcs = self.mcs.next();

            let step = TimeStep {
                mcs: self.mcs,
                registry: &self.registry,
                symbols: self.symbols.as_ref(),
            };
            let fired = self.plugins.fire_listeners(&step, &mut self.properties)?;
            trace!(
                mcs = %self.mcs,
                attempts = self.sweep.attempts,
                accepted = self.sweep.accepted,
                rate = self.sweep.acceptance_rate(),
                reevaluated = self.sweep.serialized_reevaluations,
                listeners = fired,
                "sweep finished"
            );
            summary += &self.sweep;
        }
        Ok(summary)
    }
}
