//! Random-walk displacement with cyclic replacement.
//!
//! When every candidate bucket for a new element is full, the walk
//! evicts a random incumbent, moves it toward one of its other homes,
//! and repeats, logging each move. A walk that runs out of budget is
//! unwound move by move, restoring the table exactly; the caller then
//! reports the insert as failed.

use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::bucket::{Slot, TableData, TableKey};
use crate::layout::{BucketPos, Layout};
use crate::split::HashCoords;

/// Maximum number of hash functions supported by the walk.
pub const MAX_HASHES: usize = 8;

/// Random-walk displacement state: a deterministic PRNG plus the step
/// budget. One instance per table; re-seeding reproduces the exact
/// sequence of walks.
#[derive(Debug, Clone)]
pub struct RandomWalk {
    rng: Xoshiro256PlusPlus,
    steps: usize,
}

impl RandomWalk {
    /// Create a walk with the given step budget and RNG seed.
    pub fn new(steps: usize, seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            steps,
        }
    }

    /// Step budget per displacement.
    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Seat `pending` (whose coordinates are `h`) by evicting incumbents.
    ///
    /// Returns the chain length on success. On failure the chain is
    /// unwound in reverse and `None` is returned with the table in its
    /// pre-call state.
    pub fn displace<K, D, C, L, const BS: usize>(
        &mut self,
        layout: &mut L,
        mut rehash: impl FnMut(&K) -> C,
        mut pending: Slot<K, D>,
        mut h: C,
    ) -> Option<usize>
    where
        K: TableKey,
        D: TableData,
        C: HashCoords,
        L: Layout<K, D, BS>,
    {
        let mut pos = layout.position(&h, self.rng.random_range(0..L::NH));
        let mut chain: Vec<(Slot<K, D>, BucketPos)> = vec![(pending, pos)];

        for _ in 0..self.steps {
            if layout.bucket(pos).has_space() {
                break;
            }
            let evict = self.rng.random_range(0..BS);
            pending = layout.bucket_mut(pos).replace(evict, pending);
            h = rehash(&pending.key);
            pos = self.next_pos(layout, &h, pos);
            chain.push((pending, pos));
        }

        if layout.bucket_mut(pos).insert(pending.key, pending.data) {
            return Some(chain.len() - 1);
        }

        self.unwind::<K, D, C, L, BS>(layout, &chain);
        None
    }

    /// Pick the evicted element's next bucket: any of its candidates
    /// other than the bucket it was just evicted from. If every
    /// candidate aliases the current bucket there is nowhere else to
    /// go and the walk stays put.
    fn next_pos<K, D, C, L, const BS: usize>(&mut self, layout: &L, h: &C, current: BucketPos) -> BucketPos
    where
        K: TableKey,
        D: TableData,
        C: HashCoords,
        L: Layout<K, D, BS>,
    {
        debug_assert!(L::NH <= MAX_HASHES);
        let mut others = [BucketPos { table: 0, index: 0 }; MAX_HASHES];
        let mut count = 0;
        for i in 0..L::NH {
            let cand = layout.position(h, i);
            if cand != current && count < others.len() {
                others[count] = cand;
                count += 1;
            }
        }
        match count {
            0 => current,
            1 => others[0],
            n => others[self.rng.random_range(0..n)],
        }
    }

    /// Reverse the logged moves: the element seated at each chain entry
    /// comes back out, and the element it displaced goes back in. The
    /// final entry was never seated, and after unwinding neither is the
    /// original element.
    fn unwind<K, D, C, L, const BS: usize>(&self, layout: &mut L, chain: &[(Slot<K, D>, BucketPos)])
    where
        K: TableKey,
        D: TableData,
        C: HashCoords,
        L: Layout<K, D, BS>,
    {
        let (mut carry, _) = chain[chain.len() - 1];
        for &(placed, pos) in chain[..chain.len() - 1].iter().rev() {
            let bucket = layout.bucket_mut(pos);
            let removed = bucket.remove(&placed.key);
            let reinserted = bucket.insert(carry.key, carry.data);
            debug_assert!(removed && reinserted, "displacement unwind inconsistent");
            carry = placed;
        }
    }
}
