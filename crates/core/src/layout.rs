//! Identity extraction and the flat layout that gets hashed.
//!
//! A layout is `[tag, count, id_1..id_count]` for each domain in
//! `Domain::ORDER`. The tag and count framing keeps `all=[A, B]` apart from
//! `any=[A, B]`; sorting makes each domain order-insensitive.

use crate::fnv::hash_layout;
use crate::resolve::IdentityResolver;
use crate::types::{ComponentIdentity, Domain};

/// Resolved identities of one domain, ascending, duplicates kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortedIdentitySet(Vec<ComponentIdentity>);

impl SortedIdentitySet {
    /// Resolves every token, skipping the ones without an identity, and sorts.
    pub fn collect<T, R>(tokens: &[T], resolver: &R) -> Self
    where
        R: IdentityResolver<T> + ?Sized,
    {
        let mut ids = Vec::new();
        extract_sorted_into(tokens, resolver, &mut ids);
        Self(ids)
    }

    pub fn from_identities(mut ids: Vec<ComponentIdentity>) -> Self {
        ids.sort_unstable();
        Self(ids)
    }

    pub fn as_slice(&self) -> &[ComponentIdentity] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Clears `out`, fills it with resolved identities of `tokens` and sorts it.
pub(crate) fn extract_sorted_into<T, R>(tokens: &[T], resolver: &R, out: &mut Vec<ComponentIdentity>)
where
    R: IdentityResolver<T> + ?Sized,
{
    out.clear();
    out.reserve(tokens.len());
    out.extend(tokens.iter().filter_map(|token| resolver.resolve(token)));
    // Equal identities are indistinguishable, so an unstable sort is enough.
    out.sort_unstable();
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Layout {
    values: Vec<i64>,
}

impl Layout {
    /// Exact number of integers a layout with these domain sizes holds.
    pub const fn required_capacity(all: usize, any: usize, exclude: usize) -> usize {
        2 + all + 2 + any + 2 + exclude
    }

    pub fn assemble(
        all: &SortedIdentitySet,
        any: &SortedIdentitySet,
        exclude: &SortedIdentitySet,
    ) -> Self {
        let mut values = Vec::new();
        assemble_into(&mut values, [all.as_slice(), any.as_slice(), exclude.as_slice()]);
        Self { values }
    }

    pub(crate) fn from_values(values: Vec<i64>) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.values
    }

    /// Identity run of one domain. A truncated layout yields an empty run.
    pub fn block(&self, domain: Domain) -> &[i64] {
        let mut rest = self.values.as_slice();
        for current in Domain::ORDER {
            let [_tag, count, tail @ ..] = rest else {
                return &[];
            };
            let Some((ids, next)) = usize::try_from(*count).ok().and_then(|n| tail.split_at_checked(n))
            else {
                return &[];
            };
            if current == domain {
                return ids;
            }
            rest = next;
        }
        &[]
    }

    pub fn hash(&self) -> u64 {
        hash_layout(&self.values)
    }
}

/// Writes the three domain blocks into `values`, replacing its contents.
///
/// `blocks` must already be sorted and follow `Domain::ORDER`.
pub(crate) fn assemble_into(values: &mut Vec<i64>, blocks: [&[ComponentIdentity]; 3]) {
    let [all, any, exclude] = blocks;
    values.clear();
    values.reserve_exact(Layout::required_capacity(all.len(), any.len(), exclude.len()));
    for (domain, ids) in Domain::ORDER.into_iter().zip(blocks) {
        values.push(domain.tag());
        values.push(ids.len() as i64);
        values.extend(ids.iter().map(|id| id.0));
    }
}
