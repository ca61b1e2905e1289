//! Byte-wise FNV-1a (64-bit) used to fold key layouts.
//!
//! Integers are always decomposed little-endian so keys match other
//! implementations of the same layout regardless of host byte order.

use std::hash::Hasher;

pub const FNV_OFFSET: u64 = 14_695_981_039_346_656_037;
pub const FNV_PRIME: u64 = 1_099_511_628_211;

#[derive(Clone, Copy, Debug)]
pub struct Fnv1a64 {
    state: u64,
}

impl Default for Fnv1a64 {
    fn default() -> Self {
        Self { state: FNV_OFFSET }
    }
}

impl Fnv1a64 {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Hasher for Fnv1a64 {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= u64::from(byte);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    // The signed `write_*` defaults forward to these, so every integer
    // write is little-endian.
    fn write_u16(&mut self, value: u16) {
        self.write(&value.to_le_bytes());
    }

    fn write_u32(&mut self, value: u32) {
        self.write(&value.to_le_bytes());
    }

    fn write_u64(&mut self, value: u64) {
        self.write(&value.to_le_bytes());
    }

    fn write_u128(&mut self, value: u128) {
        self.write(&value.to_le_bytes());
    }

    fn write_usize(&mut self, value: usize) {
        self.write(&value.to_le_bytes());
    }

    fn write_i64(&mut self, value: i64) {
        self.write(&value.to_le_bytes());
    }
}

/// FNV-1a over a byte slice, usable in const contexts.
pub const fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// Folds every layout integer, eight little-endian bytes at a time.
pub fn hash_layout(layout: &[i64]) -> u64 {
    let mut hasher = Fnv1a64::new();
    for &value in layout {
        hasher.write_i64(value);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_published_vectors() {
        assert_eq!(fnv1a_64(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a_64(b"a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(fnv1a_64(b"foobar"), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn streaming_equals_one_shot() {
        let mut hasher = Fnv1a64::new();
        hasher.write(b"foo");
        hasher.write(b"bar");
        assert_eq!(hasher.finish(), fnv1a_64(b"foobar"));
    }

    #[test]
    fn integers_fold_little_endian() {
        let layout = [1_i64, -2, i64::MAX];
        let mut bytes = Vec::new();
        for value in layout {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        assert_eq!(hash_layout(&layout), fnv1a_64(&bytes));
    }

    #[test]
    fn every_integer_width_is_little_endian() {
        let mut hasher = Fnv1a64::new();
        hasher.write_u16(0x0102);
        hasher.write_i32(-2);
        hasher.write_u128(7);
        hasher.write_usize(9);

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x0102_u16.to_le_bytes());
        bytes.extend_from_slice(&(-2_i32).to_le_bytes());
        bytes.extend_from_slice(&7_u128.to_le_bytes());
        bytes.extend_from_slice(&9_usize.to_le_bytes());
        assert_eq!(hasher.finish(), fnv1a_64(&bytes));
    }

    #[test]
    fn empty_layout_is_offset_basis() {
        assert_eq!(hash_layout(&[]), FNV_OFFSET);
    }
}
