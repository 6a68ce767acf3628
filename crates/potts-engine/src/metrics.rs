//! Per-sweep counters for the Metropolis engine.
//!
//! [`SweepMetrics`] is filled while a Monte Carlo step runs. The engine
//! keeps the most recent step and a running total.

use std::ops::AddAssign;

use crate::metropolis::StepOutcome;

/// Counters collected during one or more Monte Carlo steps.
///
/// Every copy attempt lands in exactly one of `no_ops`,
/// `accepted`, `rejected_energy`, `rejected_composite`, or
/// `stale_discards`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepMetrics {
    /// Copy attempts drawn.
    pub attempts: u64,
    /// Attempts where source and focus already belonged to the same cell.
    pub no_ops: u64,
    /// Attempts that produced a proposal and were evaluated.
    pub proposals: u64,
    /// Proposals committed.
    pub accepted: u64,
    /// Proposals rejected by the Metropolis criterion.
    pub rejected_energy: u64,
    /// Proposals rejected because they would sever a composite chain.
    pub rejected_composite: u64,
    /// Proposals dropped because their focus changed owner.
    pub stale_discards: u64,
    /// Parallel candidates rebuilt and re-evaluated against newer state.
    pub serialized_reevaluations: u64,
    /// Wall-clock time of the step, in microseconds.
    pub wall_us: u64,
}

impl SweepMetrics {
    /// Fraction of evaluated proposals that were committed.
    pub fn acceptance_rate(&self) -> f64 {
        if self.proposals == 0 {
            0.0
        } else {
            self.accepted as f64 / self.proposals as f64
        }
    }

    /// Count one finished copy attempt.
    pub(crate) fn record(&mut self, outcome: StepOutcome) {
        self.attempts += 1;
        match outcome {
            StepOutcome::NoOp => self.no_ops += 1,
            StepOutcome::Accepted { .. } => {
                self.proposals += 1;
                self.accepted += 1;
            }
            StepOutcome::Rejected { .. } => {
                self.proposals += 1;
                self.rejected_energy += 1;
            }
            StepOutcome::Severed => {
                self.proposals += 1;
                self.rejected_composite += 1;
            }
            StepOutcome::Discarded => self.stale_discards += 1,
        }
    }
}

impl AddAssign<&SweepMetrics> for SweepMetrics {
    fn add_assign(&mut self, other: &SweepMetrics) {
        self.attempts += other.attempts;
        self.no_ops += other.no_ops;
        self.proposals += other.proposals;
        self.accepted += other.accepted;
        self.rejected_energy += other.rejected_energy;
        self.rejected_composite += other.rejected_composite;
        self.stale_discards += other.stale_discards;
        self.serialized_reevaluations += other.serialized_reevaluations;
        self.wall_us += other.wall_us;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = SweepMetrics::default();
        assert_eq!(m.attempts, 0);
        assert_eq!(m.proposals, 0);
        assert_eq!(m.acceptance_rate(), 0.0);
    }

    #[test]
    fn every_outcome_counts_one_attempt() {
        let mut m = SweepMetrics::default();
        m.record(StepOutcome::NoOp);
        m.record(StepOutcome::Accepted { delta: -1.0 });
        m.record(StepOutcome::Rejected { delta: 3.0 });
        m.record(StepOutcome::Severed);
        m.record(StepOutcome::Discarded);
        assert_eq!(m.attempts, 5);
        assert_eq!(m.proposals, 3);
        assert_eq!(
            m.no_ops + m.accepted + m.rejected_energy + m.rejected_composite + m.stale_discards,
            m.attempts
        );
        assert!((m.acceptance_rate() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn totals_accumulate() {
        let mut total = SweepMetrics::default();
        let step = SweepMetrics {
            attempts: 10,
            accepted: 4,
            wall_us: 7,
            ..SweepMetrics::default()
        };
        total += &step;
        total += &step;
        assert_eq!(total.attempts, 20);
        assert_eq!(total.accepted, 8);
        assert_eq!(total.wall_us, 14);
    }
}
