//! Homogeneous two-level layout: `TL` sub-tables grown in lockstep.
//!
//! Every sub-table shares one length and one scaling factor. The `tab`
//! field of a coordinate picks the sub-table, so a key's candidates can
//! be spread across different sub-tables. Growth therefore has to
//! migrate all `TL` sub-tables in one pass before the shared factor can
//! change.

use crate::bucket::{Bucket, Slot, TableData, TableKey};
use crate::config::TableConfig;
use crate::layout::{scale, BucketPos, Layout};
use crate::split::{log2_exact, HashCoords};

/// Sizing floor per sub-table, for the same reason the flat layout has
/// one: near-degenerate arrays turn every growth trigger into a
/// perfect-fill problem.
const MIN_SUBTABLE_BUCKETS: usize = 8;

/// Lockstep two-level layout.
#[derive(Debug)]
pub struct HomogeneousLayout<K, D, const TL: usize, const BS: usize, const NH: usize> {
    tables: [Vec<Bucket<K, D, BS>>; TL],
    ll_size: usize,
    factor: f64,
    thresh: usize,
    alpha: f64,
    beta: f64,
    spill: Vec<Slot<K, D>>,
}

impl<K, D, const TL: usize, const BS: usize, const NH: usize> HomogeneousLayout<K, D, TL, BS, NH>
where
    K: TableKey,
    D: TableData,
{
    /// Denominator mapping a raw `loc` to `[0, ll_size)`: the location
    /// field spans `32 − log2(TL)` bits.
    const FAC_DIV: f64 = (1u64 << (32 - log2_exact(TL))) as f64;

    /// Current growth threshold in elements.
    #[inline]
    pub fn thresh(&self) -> usize {
        self.thresh
    }

    /// Buckets per sub-table.
    #[inline]
    pub fn subtable_len(&self) -> usize {
        self.ll_size
    }

    #[inline]
    fn capacity_slots(&self) -> usize {
        TL * self.ll_size * BS
    }

    /// Grow every sub-table to a new shared length sized for `len`
    /// elements, migrating each in turn. The shared factor changes only
    /// after the last sub-table has migrated.
    fn grow<C: HashCoords>(&mut self, len: usize, mut rehash: impl FnMut(&K) -> C) {
        let new_size = (len as f64 * self.alpha / (TL * BS) as f64) as usize;
        let new_size = new_size.max(self.ll_size + 1);
        let new_factor = new_size as f64 / Self::FAC_DIV;

        for table in 0..TL {
            let old = std::mem::replace(&mut self.tables[table], vec![Bucket::new(); new_size]);
            for (index, bucket) in old.iter().enumerate() {
                for slot in bucket.slots() {
                    if slot.is_empty() {
                        break;
                    }
                    let h = rehash(&slot.key);
                    for i in 0..NH {
                        if h.tab(i) == table && scale(h.loc(i), self.factor) == index {
                            let dest = scale(h.loc(i), new_factor);
                            if !self.tables[table][dest].insert(slot.key, slot.data) {
                                self.spill.push(*slot);
                            }
                            break;
                        }
                    }
                }
            }
        }

        self.ll_size = new_size;
        self.factor = new_factor;
        self.thresh = (self.capacity_slots() as f64 / self.beta) as usize;
    }
}

impl<K, D, const TL: usize, const BS: usize, const NH: usize> Layout<K, D, BS>
    for HomogeneousLayout<K, D, TL, BS, NH>
where
    K: TableKey,
    D: TableData,
{
    const NH: usize = NH;

    fn with_config(config: &TableConfig) -> Self {
        let alpha = config.size_constraint;
        let beta = config.beta();
        let ll_size = ((config.capacity as f64 * alpha / (TL * BS) as f64) as usize)
            .max(MIN_SUBTABLE_BUCKETS);
        Self {
            tables: std::array::from_fn(|_| vec![Bucket::new(); ll_size]),
            ll_size,
            factor: ll_size as f64 / Self::FAC_DIV,
            thresh: ((TL * ll_size * BS) as f64 / beta) as usize,
            alpha,
            beta,
            spill: Vec::new(),
        }
    }

    #[inline]
    fn position<C: HashCoords>(&self, h: &C, i: usize) -> BucketPos {
        BucketPos {
            table: h.tab(i),
            index: scale(h.loc(i), self.factor),
        }
    }

    #[inline]
    fn bucket(&self, pos: BucketPos) -> &Bucket<K, D, BS> {
        &self.tables[pos.table][pos.index]
    }

    #[inline]
    fn bucket_mut(&mut self, pos: BucketPos) -> &mut Bucket<K, D, BS> {
        &mut self.tables[pos.table][pos.index]
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity_slots()
    }

    #[inline]
    fn num_tables(&self) -> usize {
        TL
    }

    fn subtable(&self, i: usize) -> Option<&[Bucket<K, D, BS>]> {
        self.tables.get(i).map(|t| t.as_slice())
    }

    fn on_insert_success<C: HashCoords, F: FnMut(&K) -> C>(
        &mut self,
        _h: &C,
        len: usize,
        rehash: F,
    ) -> Vec<Slot<K, D>> {
        if len > self.thresh {
            self.grow(len, rehash);
            std::mem::take(&mut self.spill)
        } else {
            Vec::new()
        }
    }

    fn on_erase_success<C: HashCoords>(&mut self, _h: &C) {}
}
