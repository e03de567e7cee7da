//! State Digests
//!
//! SHA-256 over a fixed field order, one domain tag per kind of data:
//!
//! | Domain       | Covers                                        |
//! |--------------|-----------------------------------------------|
//! | `World`      | tick, every occupied slot, level flags        |
//! | `Inputs`     | a pad recording's tick range and deltas       |
//! | `Resources`  | animation, manifest and atlas tables          |
//!
//! Integers go in little-endian. Field order is part of the digest, so
//! callers must feed fields in a fixed order.

use sha2::{Sha256, Digest};
use super::fixed::{Fixed, Speed};
use super::vec2::{FixedVec2, SpeedVec};

/// Digest output (32 bytes).
pub type StateHash = [u8; 32];

/// What a digest is over. The tag is hashed first so equal bytes in
/// different domains never collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashDomain {
    /// Whole-world simulation state
    World,
    /// Input recording
    Inputs,
    /// Compiled-in sprite tables
    Resources,
}

impl HashDomain {
    const fn tag(self) -> &'static [u8] {
        match self {
            HashDomain::World => b"HEDGEHOG_WORLD_V1",
            HashDomain::Inputs => b"HEDGEHOG_INPUTS_V1",
            HashDomain::Resources => b"HEDGEHOG_RESOURCES_V1",
        }
    }
}

/// Incremental digest builder.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Start a digest in `domain`.
    pub fn new(domain: HashDomain) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain.tag());
        Self { hasher }
    }

    /// Add a byte table, prefixed by its length so adjacent tables cannot
    /// shift into each other.
    pub fn update_table(&mut self, bytes: &[u8]) {
        self.update_u32(bytes.len() as u32);
        self.hasher.update(bytes);
    }

    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    #[inline]
    pub fn update_i8(&mut self, value: i8) {
        self.update_u8(value as u8);
    }

    #[inline]
    pub fn update_u16(&mut self, value: u16) {
        self.hasher.update(value.to_le_bytes());
    }

    #[inline]
    pub fn update_i16(&mut self, value: i16) {
        self.update_u16(value as u16);
    }

    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Q16.16 value, as its raw 32 bits.
    #[inline]
    pub fn update_fixed(&mut self, value: Fixed) {
        self.update_u32(value as u32);
    }

    /// Q8.8 value, as its raw 16 bits.
    #[inline]
    pub fn update_speed(&mut self, value: Speed) {
        self.update_i16(value);
    }

    /// Position, x then y.
    #[inline]
    pub fn update_vec2(&mut self, value: FixedVec2) {
        self.update_fixed(value.x);
        self.update_fixed(value.y);
    }

    /// Velocity, x then y.
    #[inline]
    pub fn update_speed_vec(&mut self, value: SpeedVec) {
        self.update_speed(value.x);
        self.update_speed(value.y);
    }

    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Finish the digest.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// World digest: the tick first, then whatever `add_state` feeds.
///
/// Used by `World::compute_hash()`.
pub fn compute_state_hash<F>(tick: u32, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::new(HashDomain::World);
    hasher.update_u32(tick);
    add_state(&mut hasher);
    hasher.finalize()
}
