//! Query cache key derivation.
//!
//! `build` resolves and sorts each domain, assembles the tagged layout and
//! folds it through FNV-1a. It never fails: tokens without an identity are
//! dropped before counting.

use crate::fnv::hash_layout;
use crate::layout::{Layout, assemble_into, extract_sorted_into};
use crate::resolve::IdentityResolver;
use crate::types::{CacheKey, ComponentIdentity};

/// Derives the cache key for one `(all, any, exclude)` query shape.
pub fn build<T, R>(all: &[T], any: &[T], exclude: &[T], resolver: &R) -> CacheKey
where
    R: IdentityResolver<T> + ?Sized,
{
    CacheKeyBuilder::new().build(all, any, exclude, resolver)
}

/// Key builder that keeps its scratch buffers between calls.
///
/// Produces exactly the keys of [`build`]; it only saves the allocations.
#[derive(Clone, Debug, Default)]
pub struct CacheKeyBuilder {
    all: Vec<ComponentIdentity>,
    any: Vec<ComponentIdentity>,
    exclude: Vec<ComponentIdentity>,
    layout: Vec<i64>,
}

impl CacheKeyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build<T, R>(&mut self, all: &[T], any: &[T], exclude: &[T], resolver: &R) -> CacheKey
    where
        R: IdentityResolver<T> + ?Sized,
    {
        extract_sorted_into(all, resolver, &mut self.all);
        extract_sorted_into(any, resolver, &mut self.any);
        extract_sorted_into(exclude, resolver, &mut self.exclude);

        assemble_into(&mut self.layout, [&self.all, &self.any, &self.exclude]);
        let key = CacheKey::from_hash(hash_layout(&self.layout));

        tracing::trace!(
            all = self.all.len(),
            any = self.any.len(),
            exclude = self.exclude.len(),
            skipped = all.len() + any.len() + exclude.len() - self.resolved_len(),
            key = key.as_i64(),
            "query cache key built"
        );
        key
    }

    /// Layout hashed by the most recent `build` call.
    pub fn last_layout(&self) -> &[i64] {
        &self.layout
    }

    /// Owned copy of the most recent layout.
    pub fn to_layout(&self) -> Layout {
        Layout::from_values(self.layout.clone())
    }

    fn resolved_len(&self) -> usize {
        self.all.len() + self.any.len() + self.exclude.len()
    }
}
