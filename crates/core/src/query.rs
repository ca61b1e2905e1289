use serde::{Deserialize, Serialize};

use crate::builder::{CacheKeyBuilder, build};
use crate::resolve::IdentityResolver;
use crate::types::{CacheKey, Domain};

/// Component constraints of one query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter<T> {
    pub all: Vec<T>,
    pub any: Vec<T>,
    pub exclude: Vec<T>,
}

impl<T> Default for QueryFilter<T> {
    fn default() -> Self {
        Self { all: Vec::new(), any: Vec::new(), exclude: Vec::new() }
    }
}

impl<T> QueryFilter<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_all(mut self, components: impl IntoIterator<Item = T>) -> Self {
        self.all.extend(components);
        self
    }

    pub fn with_any(mut self, components: impl IntoIterator<Item = T>) -> Self {
        self.any.extend(components);
        self
    }

    pub fn with_none(mut self, components: impl IntoIterator<Item = T>) -> Self {
        self.exclude.extend(components);
        self
    }

    pub fn components(&self, domain: Domain) -> &[T] {
        match domain {
            Domain::All => &self.all,
            Domain::Any => &self.any,
            Domain::Exclude => &self.exclude,
        }
    }

    pub fn cache_key<R>(&self, resolver: &R) -> CacheKey
    where
        R: IdentityResolver<T> + ?Sized,
    {
        build(&self.all, &self.any, &self.exclude, resolver)
    }

    pub fn cache_key_with<R>(&self, builder: &mut CacheKeyBuilder, resolver: &R) -> CacheKey
    where
        R: IdentityResolver<T> + ?Sized,
    {
        builder.build(&self.all, &self.any, &self.exclude, resolver)
    }
}
