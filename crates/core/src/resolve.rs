//! Identity resolution seam between the key builder and the host object system.
//!
//! The builder never interprets tokens itself. It asks a resolver for a stable
//! identity and drops any token the resolver cannot place.

use crate::types::ComponentIdentity;

/// Maps an opaque component token to its stable identity, if it has one.
pub trait IdentityResolver<T: ?Sized> {
    fn resolve(&self, token: &T) -> Option<ComponentIdentity>;
}

impl<T, F> IdentityResolver<T> for F
where
    T: ?Sized,
    F: Fn(&T) -> Option<ComponentIdentity>,
{
    fn resolve(&self, token: &T) -> Option<ComponentIdentity> {
        self(token)
    }
}

/// Resolver for tokens that already carry their identity.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectIdentity;

impl IdentityResolver<ComponentIdentity> for DirectIdentity {
    fn resolve(&self, token: &ComponentIdentity) -> Option<ComponentIdentity> {
        Some(*token)
    }
}

impl IdentityResolver<i64> for DirectIdentity {
    fn resolve(&self, token: &i64) -> Option<ComponentIdentity> {
        Some(ComponentIdentity(*token))
    }
}

// `None` stands in for a released or foreign object.
impl IdentityResolver<Option<ComponentIdentity>> for DirectIdentity {
    fn resolve(&self, token: &Option<ComponentIdentity>) -> Option<ComponentIdentity> {
        *token
    }
}
