//! In-process component identity source.
//!
//! Hands out slotmap-backed tokens for named component types. A token keeps
//! resolving to the same identity until it is unregistered; after that it is
//! stale and resolves to nothing, the same as a released host object.

use std::collections::BTreeMap;

use slotmap::{Key, SlotMap, new_key_type};

use crate::resolve::IdentityResolver;
use crate::types::ComponentIdentity;

new_key_type! {
    pub struct ComponentToken;
}

#[derive(Clone, Debug, Default)]
pub struct ComponentRegistry {
    names: SlotMap<ComponentToken, String>,
    by_name: BTreeMap<String, ComponentToken>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing token for `name`, or registers a new one.
    pub fn register(&mut self, name: &str) -> ComponentToken {
        if let Some(token) = self.by_name.get(name) {
            return *token;
        }
        let token = self.names.insert(name.to_string());
        self.by_name.insert(name.to_string(), token);
        tracing::trace!(component = name, identity = identity_of(token).0, "component registered");
        token
    }

    /// Drops the component. Outstanding tokens for it become unresolvable.
    pub fn unregister(&mut self, token: ComponentToken) -> Option<String> {
        let name = self.names.remove(token)?;
        self.by_name.remove(&name);
        Some(name)
    }

    pub fn token(&self, name: &str) -> Option<ComponentToken> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, token: ComponentToken) -> Option<&str> {
        self.names.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl IdentityResolver<ComponentToken> for ComponentRegistry {
    fn resolve(&self, token: &ComponentToken) -> Option<ComponentIdentity> {
        self.names.contains_key(*token).then(|| identity_of(*token))
    }
}

// Slot index and version together; a reused slot never repeats an identity.
fn identity_of(token: ComponentToken) -> ComponentIdentity {
    ComponentIdentity(token.data().as_ffi() as i64)
}
