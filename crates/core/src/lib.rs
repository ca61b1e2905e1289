pub mod builder;
pub mod fnv;
pub mod layout;
pub mod query;
pub mod registry;
pub mod resolve;
pub mod types;

pub use builder::{CacheKeyBuilder, build};
pub use layout::{Layout, SortedIdentitySet};
pub use query::QueryFilter;
pub use registry::{ComponentRegistry, ComponentToken};
pub use resolve::{DirectIdentity, IdentityResolver};
pub use types::*;
