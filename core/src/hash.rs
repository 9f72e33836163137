//! Keyed 64-bit hash functions.
//!
//! The table only needs one thing from a hash function: a deterministic,
//! seeded, well-mixed 64-bit word per key. [`Hash64`] is that seam.
//! [`Ahash64`] is the default implementation; [`Mix64`] is a
//! dependency-free multiply-xor finalizer whose output is bit-stable
//! across library versions, which the splitter tests rely on.

use std::hash::{Hash, Hasher};

use ahash::RandomState;

/// A keyed hash function producing a full 64-bit word.
///
/// Implementations must be deterministic for a given seed: the growth
/// machinery recomputes hashes during migration and relies on getting
/// the same word back.
pub trait Hash64: Clone {
    /// Construct the function from a 64-bit seed.
    fn with_seed(seed: u64) -> Self;

    /// Hash a key.
    fn hash64<K: Hash + ?Sized>(&self, key: &K) -> u64;
}

/// Default hasher, backed by `ahash`.
///
/// The four internal seeds are derived from the one given seed by
/// odd-constant multiplication, so distinct seeds give unrelated
/// functions while equal seeds give identical ones.
#[derive(Clone)]
pub struct Ahash64 {
    state: RandomState,
}

impl Hash64 for Ahash64 {
    fn with_seed(seed: u64) -> Self {
        let state = RandomState::with_seeds(
            seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ 0x2545_F491_4F6C_DD1D,
            seed.wrapping_mul(0xC2B2_AE3D_27D4_EB4F) ^ 0x1656_67B1_9E37_79F9,
            seed.wrapping_mul(0x165F_5E0B_28A0_C9C5) | 1,
            seed.wrapping_mul(0x27D4_EB2F_1656_67C5) | 1,
        );
        Self { state }
    }

    #[inline]
    fn hash64<K: Hash + ?Sized>(&self, key: &K) -> u64 {
        self.state.hash_one(key)
    }
}

/// Multiply-xor hash with a murmur-style finalizer.
///
/// Weaker mixing than [`Ahash64`] but fully defined by this crate, so
/// its output never changes underneath a stored test expectation.
#[derive(Clone, Copy)]
pub struct Mix64 {
    seed: u64,
}

impl Hash64 for Mix64 {
    fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    #[inline]
    fn hash64<K: Hash + ?Sized>(&self, key: &K) -> u64 {
        let mut state = MixState(self.seed);
        key.hash(&mut state);
        state.finish()
    }
}

/// Hasher state for [`Mix64`]: fold every written word into the
/// accumulator, avalanche on finish.
struct MixState(u64);

impl MixState {
    #[inline]
    fn fold(&mut self, word: u64) {
        self.0 = (self.0 ^ word).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        self.0 = self.0.rotate_left(29);
    }
}

impl Hasher for MixState {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for chunk in bytes.chunks(8) {
            let mut word = [0u8; 8];
            word[..chunk.len()].copy_from_slice(chunk);
            self.fold(u64::from_le_bytes(word));
        }
    }

    #[inline]
    fn write_u64(&mut self, value: u64) {
        self.fold(value);
    }

    #[inline]
    fn finish(&self) -> u64 {
        // fmix64 finalizer
        let mut h = self.0;
        h ^= h >> 33;
        h = h.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
        h ^= h >> 33;
        h = h.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
        h ^= h >> 33;
        h
    }
}
