//! The cuckoo table core: insert, find and remove across the bucket,
//! hashing, displacement and layout components.
//!
//! Inserts hash the key once, probe all `NH` candidate buckets in one
//! pass (which also detects duplicates), seat the element in the
//! candidate with the most free slots, and fall back to the random walk
//! when every candidate is full. Growth runs inside the layout's
//! post-insert hook; elements the migration could not place directly
//! come back here and are reinserted through the normal path with the
//! element count pinned.

use std::marker::PhantomData;

use crate::bucket::{Bucket, Slot, TableData, TableKey};
use crate::config::TableConfig;
use crate::displace::{RandomWalk, MAX_HASHES};
use crate::error::{TableError, TableResult};
use crate::flat::FlatLayout;
use crate::hash::Ahash64;
use crate::histogram::ChainHistogram;
use crate::homogeneous::HomogeneousLayout;
use crate::independent::IndependentLayout;
use crate::layout::{BucketPos, Layout};
use crate::split::{HashScheme, SplitScheme};

/// Bucketed cuckoo dictionary.
///
/// Generic over the key/data pair, the hash scheme `S`, the table
/// layout `L` and the bucket size `BS`. The aliases [`FlatTable`],
/// [`HomogeneousTable`] and [`IndependentTable`] pick the usual
/// combinations.
pub struct CuckooTable<K, D, S, L, const BS: usize> {
    len: usize,
    hasher: S,
    layout: L,
    walk: RandomWalk,
    hist: ChainHistogram,
    _marker: PhantomData<(K, D)>,
}

impl<K, D, S, L, const BS: usize> CuckooTable<K, D, S, L, BS>
where
    K: TableKey,
    D: TableData,
    S: HashScheme,
    L: Layout<K, D, BS>,
{
    /// Create a table from a configuration.
    pub fn new(config: TableConfig) -> Self {
        debug_assert!((2..=MAX_HASHES).contains(&L::NH));
        Self {
            len: 0,
            hasher: S::with_seed(config.hash_seed),
            layout: L::with_config(&config),
            walk: RandomWalk::new(config.displacement_steps, config.seed),
            hist: ChainHistogram::new(config.displacement_steps),
            _marker: PhantomData,
        }
    }

    /// Create a table sized for `capacity` elements, defaults otherwise.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(TableConfig::new().with_capacity(capacity))
    }

    /// Number of stored elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total slot count across all sub-tables.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.layout.capacity()
    }

    /// Current load factor.
    pub fn load_factor(&self) -> f64 {
        if self.capacity() == 0 {
            0.0
        } else {
            self.len as f64 / self.capacity() as f64
        }
    }

    /// Insert a key/data pair. Returns `false` when the key is already
    /// present or no seat could be found within the displacement
    /// budget; the table is unchanged in both cases.
    pub fn insert(&mut self, key: K, data: D) -> bool {
        self.try_insert(key, data).is_ok()
    }

    /// Insert a key/data pair, reporting why an insert was rejected.
    pub fn try_insert(&mut self, key: K, data: D) -> TableResult<()> {
        if key == K::default() {
            return Err(TableError::SentinelKey);
        }
        let h = self.hasher.hash(&key);
        self.seat(Slot::new(key, data), h)?;
        let hasher = &self.hasher;
        let spill = self
            .layout
            .on_insert_success(&h, self.len, |k| hasher.hash(k));
        self.drain_spill(spill);
        Ok(())
    }

    /// Look up a key.
    pub fn get(&self, key: &K) -> Option<D> {
        let h = self.hasher.hash(key);
        for i in 0..L::NH {
            let pos = self.layout.position(&h, i);
            if let Some(data) = self.layout.bucket(pos).find(key) {
                return Some(data);
            }
        }
        None
    }

    /// Whether a key is present.
    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Remove a key. Returns `false` if it was not present.
    pub fn remove(&mut self, key: &K) -> bool {
        let h = self.hasher.hash(key);
        for i in 0..L::NH {
            let pos = self.layout.position(&h, i);
            if self.layout.bucket_mut(pos).remove(key) {
                self.len -= 1;
                self.layout.on_erase_success(&h);
                return true;
            }
        }
        false
    }

    /// Number of sub-tables in the layout.
    #[inline]
    pub fn num_subtables(&self) -> usize {
        self.layout.num_tables()
    }

    /// Bucket array of sub-table `i`, or `None` out of range. For
    /// instrumentation only; the slice's bucket order is unspecified.
    pub fn subtable(&self, i: usize) -> Option<&[Bucket<K, D, BS>]> {
        self.layout.subtable(i)
    }

    /// The candidate bucket addresses for a key, in hash-coordinate
    /// order. For instrumentation only.
    pub fn candidate_positions(&self, key: &K) -> Vec<BucketPos> {
        let h = self.hasher.hash(key);
        (0..L::NH).map(|i| self.layout.position(&h, i)).collect()
    }

    /// Distribution of displacement-chain lengths over successful
    /// inserts.
    #[inline]
    pub fn chain_histogram(&self) -> &ChainHistogram {
        &self.hist
    }

    /// Reset the chain-length histogram.
    pub fn clear_histogram(&mut self) {
        self.hist.clear();
    }

    /// Seat an already-hashed element and update count and histogram.
    /// Layout bookkeeping (growth) is the caller's next step.
    fn seat(&mut self, slot: Slot<K, D>, h: S::Coords) -> TableResult<()> {
        // one probe pass: duplicate detection plus freest-candidate
        // selection, ties to the lowest index
        let mut best: Option<(usize, BucketPos)> = None;
        for i in 0..L::NH {
            let pos = self.layout.position(&h, i);
            match self.layout.bucket(pos).probe(&slot.key) {
                None => return Err(TableError::KeyExists),
                Some(free) => {
                    if best.is_none_or(|(best_free, _)| free > best_free) {
                        best = Some((free, pos));
                    }
                }
            }
        }
        let (free, pos) = best.expect("at least two candidate buckets");

        let chain = if free > 0 {
            let seated = self.layout.bucket_mut(pos).insert(slot.key, slot.data);
            debug_assert!(seated, "probed-free bucket rejected insert");
            seated.then_some(0)
        } else {
            let hasher = &self.hasher;
            self.walk
                .displace(&mut self.layout, |k| hasher.hash(k), slot, h)
        };

        let Some(chain) = chain else {
            return Err(TableError::DisplacementExhausted);
        };

        self.hist.record(chain);
        self.len += 1;
        Ok(())
    }

    /// Reinsert elements the migration could not place directly.
    ///
    /// Runs them through the normal seating path — displacement and,
    /// for lockstep layouts, further growth included — then restores
    /// the element count, since migration never changes cardinality.
    fn drain_spill(&mut self, mut pending: Vec<Slot<K, D>>) {
        if pending.is_empty() {
            return;
        }
        let saved = self.len;
        while let Some(slot) = pending.pop() {
            let h = self.hasher.hash(&slot.key);
            match self.seat(slot, h) {
                Ok(()) => {
                    let hasher = &self.hasher;
                    let mut more = self
                        .layout
                        .on_spill_reinsert(&h, self.len, |k| hasher.hash(k));
                    pending.append(&mut more);
                }
                Err(err) => {
                    // no recovery contract: the count stays inflated
                    // relative to the elements actually placed
                    debug_assert!(false, "spill reinsertion failed: {err}");
                }
            }
        }
        self.len = saved;
    }
}

impl<K, D, S, L, const BS: usize> Default for CuckooTable<K, D, S, L, BS>
where
    K: TableKey,
    D: TableData,
    S: HashScheme,
    L: Layout<K, D, BS>,
{
    fn default() -> Self {
        Self::new(TableConfig::default())
    }
}

/// Single-array table: one sub-table, the `tab` bits unused.
pub type FlatTable<K, D, const BS: usize = 4, const NH: usize = 2> =
    CuckooTable<K, D, SplitScheme<Ahash64, 1, NH>, FlatLayout<K, D, BS, NH>, BS>;

/// Two-level table with `TL` sub-tables grown in lockstep.
pub type HomogeneousTable<K, D, const TL: usize = 4, const BS: usize = 4, const NH: usize = 2> =
    CuckooTable<K, D, SplitScheme<Ahash64, TL, NH>, HomogeneousLayout<K, D, TL, BS, NH>, BS>;

/// Two-level table with independently sized and grown sub-tables.
pub type IndependentTable<K, D, const TL: usize = 4, const BS: usize = 4, const NH: usize = 2> =
    CuckooTable<K, D, SplitScheme<Ahash64, TL, NH>, IndependentLayout<K, D, TL, BS, NH>, BS>;
