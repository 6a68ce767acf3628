//! Seeding a set of worker streams from one master seed.

use tracing::info;

use crate::source::RandomSource;

/// Upper bound (inclusive) of derived worker seeds.
const DERIVED_SEED_MAX: u64 = 9_999_999;

/// The random streams of every worker in a run.
///
/// Worker 0 is seeded directly from the master seed. The seeds of
/// workers `1..n` are drawn from worker 0's stream before any worker
/// runs. The derived seeds therefore depend on the worker count:
/// changing the number of workers changes every stream but the first,
/// and runs with different parallelism are not expected to agree.
#[derive(Clone, Debug)]
pub struct RandomPool {
    master: u64,
    streams: Vec<RandomSource>,
}

impl RandomPool {
    /// Seed `workers` streams (at least one) from `master`.
    pub fn seed(master: u64, workers: usize) -> Self {
        let workers = workers.max(1);
        let mut first = RandomSource::from_seed(master);
        let derived: Vec<u64> = (1..workers)
            .map(|_| first.bounded_int(DERIVED_SEED_MAX))
            .collect();
        info!(master, workers, ?derived, "seeded random streams");
        let mut streams = Vec::with_capacity(workers);
        streams.push(first);
        streams.extend(derived.into_iter().map(RandomSource::from_seed));
        Self { master, streams }
    }

    /// The master seed.
    pub fn master_seed(&self) -> u64 {
        self.master
    }

    /// Number of streams.
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Whether the pool has no streams. Never true for a seeded pool.
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// The starting seed of every stream, in worker order.
    pub fn seeds(&self) -> Vec<u64> {
        self.streams.iter().filter_map(RandomSource::seed_value).collect()
    }

    /// Worker 0's stream, used by serial stepping.
    pub fn primary(&mut self) -> &mut RandomSource {
        &mut self.streams[0]
    }

    /// One worker's stream.
    pub fn worker(&mut self, index: usize) -> Option<&mut RandomSource> {
        self.streams.get_mut(index)
    }

    /// All streams, for handing one to each worker.
    pub fn streams_mut(&mut self) -> &mut [RandomSource] {
        &mut self.streams
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_zero_uses_master_seed() {
        let pool = RandomPool::seed(1234, 4);
        assert_eq!(pool.len(), 4);
        assert_eq!(pool.seeds()[0], 1234);
    }

    #[test]
    fn derived_seeds_come_from_worker_zero() {
        let pool = RandomPool::seed(99, 3);
        let mut reference = RandomSource::from_seed(99);
        let expected = vec![
            99,
            reference.bounded_int(DERIVED_SEED_MAX),
            reference.bounded_int(DERIVED_SEED_MAX),
        ];
        assert_eq!(pool.seeds(), expected);
    }

    #[test]
    fn worker_zero_stream_continues_after_derivation() {
        let mut pool = RandomPool::seed(5, 2);
        let mut reference = RandomSource::from_seed(5);
        reference.bounded_int(DERIVED_SEED_MAX);
        let a = pool.worker(0).map(|w| w.uniform01());
        assert_eq!(a, Some(reference.uniform01()));
    }

    #[test]
    fn reproducible_for_fixed_worker_count() {
        let mut a = RandomPool::seed(77, 4);
        let mut b = RandomPool::seed(77, 4);
        for w in 0..4 {
            let xa: Vec<u64> = (0..10).map(|_| a.worker(w).unwrap().bounded_int(1000)).collect();
            let xb: Vec<u64> = (0..10).map(|_| b.worker(w).unwrap().bounded_int(1000)).collect();
            assert_eq!(xa, xb);
        }
    }

    #[test]
    fn worker_count_changes_derived_seeds() {
        let two = RandomPool::seed(77, 2).seeds();
        let three = RandomPool::seed(77, 3).seeds();
        assert_eq!(two[..2], three[..2]);
        assert_eq!(three.len(), 3);
    }

    #[test]
    fn zero_workers_still_gives_one_stream() {
        assert_eq!(RandomPool::seed(1, 0).len(), 1);
    }
}
