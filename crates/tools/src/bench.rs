//! Timing harness for key derivation.

use std::hint::black_box;
use std::time::Instant;

use cache_key::{CacheKeyBuilder, DirectIdentity, QueryFilter};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

use crate::perf_log::PerfRecord;

pub const BENCH_TEST_NAME: &str = "cache_key_build";

#[derive(Clone, Copy, Debug)]
pub struct BenchConfig {
    /// Identities per domain.
    pub scale: u32,
    pub iterations: u32,
    pub seed: u64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self { scale: 8, iterations: 10_000, seed: 42 }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BenchOutcome {
    pub total_ms: f64,
    /// XOR of every key, so the work cannot be optimized away.
    pub checksum: u64,
}

impl BenchOutcome {
    pub fn to_record(self, config: &BenchConfig) -> PerfRecord {
        PerfRecord::now(BENCH_TEST_NAME, config.scale, self.total_ms)
    }
}

/// Query with `scale` identities per domain drawn from a pool four times as
/// large, so overlaps and duplicates show up.
pub fn random_query(rng: &mut ChaCha8Rng, scale: u32) -> QueryFilter<i64> {
    let pool = u64::from(scale.max(1)) * 4;
    let mut draw = || (0..scale).map(|_| (rng.next_u64() % pool) as i64).collect::<Vec<_>>();
    let all = draw();
    let any = draw();
    let exclude = draw();
    QueryFilter::new().with_all(all).with_any(any).with_none(exclude)
}

/// Builds keys for a fixed set of seeded queries, reusing one builder.
pub fn run(config: &BenchConfig) -> BenchOutcome {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let queries: Vec<_> = (0..64).map(|_| random_query(&mut rng, config.scale)).collect();
    let mut builder = CacheKeyBuilder::new();

    let start = Instant::now();
    let mut checksum = 0u64;
    for i in 0..config.iterations {
        let query = &queries[i as usize % queries.len()];
        let key = query.cache_key_with(&mut builder, &DirectIdentity);
        checksum ^= black_box(key).as_u64();
    }
    let total_ms = start.elapsed().as_secs_f64() * 1000.0;

    tracing::debug!(
        scale = config.scale,
        iterations = config.iterations,
        total_ms,
        checksum,
        "bench finished"
    );
    BenchOutcome { total_ms, checksum }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_checksum() {
        let config = BenchConfig { scale: 4, iterations: 200, seed: 7 };
        assert_eq!(run(&config).checksum, run(&config).checksum);
    }

    #[test]
    fn random_query_respects_scale() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let query = random_query(&mut rng, 5);
        assert_eq!(query.all.len(), 5);
        assert_eq!(query.any.len(), 5);
        assert_eq!(query.exclude.len(), 5);
        assert!(query.all.iter().all(|id| (0..20).contains(id)));
    }

    #[test]
    fn record_carries_scale_and_name() {
        let config = BenchConfig { scale: 3, iterations: 10, seed: 1 };
        let record = run(&config).to_record(&config);
        assert_eq!(record.test, BENCH_TEST_NAME);
        assert_eq!(record.scale, 3);
        assert!(record.time_ms >= 0.0);
    }
}
