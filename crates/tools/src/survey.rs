//! Collision survey over random query shapes.
//!
//! Each key remembers only an xxh3 digest of the layout that produced it. A
//! key seen again with a different layout digest is a real collision; the
//! same digest means the same query shape was drawn twice.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use cache_key::{CacheKeyBuilder, DirectIdentity};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use xxhash_rust::xxh3::xxh3_64;

#[derive(Clone, Copy, Debug)]
pub struct SurveyConfig {
    pub seed: u64,
    pub queries: u32,
    /// Identities are drawn from `0..universe`.
    pub universe: u64,
    /// Upper bound (inclusive) on identities per domain.
    pub max_per_domain: u32,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self { seed: 42, queries: 100_000, universe: 32, max_per_domain: 4 }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SurveyReport {
    pub distinct_shapes: usize,
    pub repeats: usize,
    pub collisions: Vec<SurveyCollision>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurveyCollision {
    pub key: i64,
    pub first_digest: u64,
    pub second_digest: u64,
    pub second_layout: Vec<i64>,
}

/// Key to layout digest of the first shape seen with that key.
#[derive(Debug, Default)]
struct Tally {
    digests: HashMap<i64, u64>,
    report: SurveyReport,
}

impl Tally {
    fn record(&mut self, key: i64, layout: &[i64]) {
        let digest = layout_digest(layout);
        match self.digests.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(digest);
                self.report.distinct_shapes += 1;
            }
            Entry::Occupied(slot) if *slot.get() == digest => {
                self.report.repeats += 1;
            }
            Entry::Occupied(slot) => {
                tracing::warn!(key, "collision between distinct layouts");
                self.report.collisions.push(SurveyCollision {
                    key,
                    first_digest: *slot.get(),
                    second_digest: digest,
                    second_layout: layout.to_vec(),
                });
            }
        }
    }
}

fn layout_digest(layout: &[i64]) -> u64 {
    let bytes: Vec<u8> = layout.iter().flat_map(|value| value.to_le_bytes()).collect();
    xxh3_64(&bytes)
}

fn draw_domain(rng: &mut ChaCha8Rng, config: &SurveyConfig) -> Vec<i64> {
    let len = rng.next_u64() % (u64::from(config.max_per_domain) + 1);
    (0..len).map(|_| (rng.next_u64() % config.universe.max(1)) as i64).collect()
}

pub fn run(config: &SurveyConfig) -> SurveyReport {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut builder = CacheKeyBuilder::new();
    let mut tally = Tally::default();

    for _ in 0..config.queries {
        let all = draw_domain(&mut rng, config);
        let any = draw_domain(&mut rng, config);
        let exclude = draw_domain(&mut rng, config);
        let key = builder.build(&all, &any, &exclude, &DirectIdentity);
        tally.record(key.as_i64(), builder.last_layout());
    }

    let report = tally.report;
    tracing::debug!(
        queries = config.queries,
        distinct = report.distinct_shapes,
        repeats = report.repeats,
        collisions = report.collisions.len(),
        "survey finished"
    );
    report
}
