use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a component instance or type token.
///
/// Assigned by the host identity system and only meaningful within one process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentIdentity(pub i64);

impl From<i64> for ComponentIdentity {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Query filter category. The numeric tags are part of the key format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Domain {
    All,
    Any,
    Exclude,
}

impl Domain {
    /// Order in which domain blocks appear in a layout.
    pub const ORDER: [Domain; 3] = [Domain::All, Domain::Any, Domain::Exclude];

    pub const fn tag(self) -> i64 {
        match self {
            Domain::All => 1,
            Domain::Any => 2,
            Domain::Exclude => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CacheKey(pub i64);

impl CacheKey {
    /// Reinterprets the raw FNV accumulator; the bit pattern is kept as-is.
    pub const fn from_hash(hash: u64) -> Self {
        Self(hash as i64)
    }

    pub const fn as_i64(self) -> i64 {
        self.0
    }

    pub const fn as_u64(self) -> u64 {
        self.0 as u64
    }

    /// `0x` followed by exactly 16 lowercase hex digits.
    pub fn to_hex(self) -> String {
        format!("0x{:016x}", self.as_u64())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
