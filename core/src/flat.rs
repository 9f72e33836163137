//! Flat layout: one bucket array, the `tab` field ignored.
//!
//! Addressing uses the full 32-bit `loc` field scaled by
//! `factor = n_buckets / 2^32`, so the array length is free to be any
//! value, not just a power of two. Growth is the lockstep algorithm
//! with a single sub-table.

use crate::bucket::{Bucket, Slot, TableData, TableKey};
use crate::config::TableConfig;
use crate::layout::{scale, BucketPos, Layout};
use crate::split::HashCoords;

const LOC_RANGE: f64 = (1u64 << 32) as f64;

/// Sizing floor. Arrays of a handful of buckets make the growth
/// trigger land on a completely full table, where seating the last
/// element depends on the hash graph admitting a perfect matching.
const MIN_BUCKETS: usize = 16;

/// Single-array layout.
#[derive(Debug)]
pub struct FlatLayout<K, D, const BS: usize, const NH: usize> {
    buckets: Vec<Bucket<K, D, BS>>,
    factor: f64,
    thresh: usize,
    alpha: f64,
    beta: f64,
    spill: Vec<Slot<K, D>>,
}

impl<K: TableKey, D: TableData, const BS: usize, const NH: usize> FlatLayout<K, D, BS, NH> {
    /// Current growth threshold in elements.
    #[inline]
    pub fn thresh(&self) -> usize {
        self.thresh
    }

    #[inline]
    fn capacity_slots(&self) -> usize {
        self.buckets.len() * BS
    }

    /// Replace the bucket array with a larger one sized for `len`
    /// elements, re-homing every element under the new factor. Elements
    /// whose new bucket is already full land in the spill buffer.
    fn grow<C: HashCoords>(&mut self, len: usize, mut rehash: impl FnMut(&K) -> C) {
        let new_len = (len as f64 * self.alpha / BS as f64) as usize;
        let new_len = new_len.max(self.buckets.len() + 1);
        let new_factor = new_len as f64 / LOC_RANGE;

        let old = std::mem::replace(&mut self.buckets, vec![Bucket::new(); new_len]);
        let old_factor = std::mem::replace(&mut self.factor, new_factor);

        for (index, bucket) in old.iter().enumerate() {
            for slot in bucket.slots() {
                if slot.is_empty() {
                    break;
                }
                let h = rehash(&slot.key);
                // the first coordinate that explains the element's old
                // address decides its new one
                for i in 0..NH {
                    if scale(h.loc(i), old_factor) == index {
                        let dest = scale(h.loc(i), new_factor);
                        if !self.buckets[dest].insert(slot.key, slot.data) {
                            self.spill.push(*slot);
                        }
                        break;
                    }
                }
            }
        }

        self.thresh = (self.capacity_slots() as f64 / self.beta) as usize;
    }
}

impl<K, D, const BS: usize, const NH: usize> Layout<K, D, BS> for FlatLayout<K, D, BS, NH>
where
    K: TableKey,
    D: TableData,
{
    const NH: usize = NH;

    fn with_config(config: &TableConfig) -> Self {
        let alpha = config.size_constraint;
        let n_buckets = ((config.capacity as f64 * alpha / BS as f64) as usize).max(MIN_BUCKETS);
        let beta = config.beta();
        Self {
            buckets: vec![Bucket::new(); n_buckets],
            factor: n_buckets as f64 / LOC_RANGE,
            thresh: (n_buckets as f64 * BS as f64 / beta) as usize,
            alpha,
            beta,
            spill: Vec::new(),
        }
    }

    #[inline]
    fn position<C: HashCoords>(&self, h: &C, i: usize) -> BucketPos {
        BucketPos {
            table: 0,
            index: scale(h.loc(i), self.factor),
        }
    }

    #[inline]
    fn bucket(&self, pos: BucketPos) -> &Bucket<K, D, BS> {
        &self.buckets[pos.index]
    }

    #[inline]
    fn bucket_mut(&mut self, pos: BucketPos) -> &mut Bucket<K, D, BS> {
        &mut self.buckets[pos.index]
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity_slots()
    }

    #[inline]
    fn num_tables(&self) -> usize {
        1
    }

    fn subtable(&self, i: usize) -> Option<&[Bucket<K, D, BS>]> {
        (i == 0).then_some(self.buckets.as_slice())
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Mix64;
    use crate::split::{HashScheme, SplitScheme};

    type Scheme = SplitScheme<Mix64, 1, 2>;
    type L = FlatLayout<u64, u64, 4, 2>;

    fn make(capacity: usize) -> (L, Scheme) {
        let config = TableConfig::new().with_capacity(capacity);
        (L::with_config(&config), Scheme::with_seed(1))
    }

    #[test]
    fn test_zero_capacity_uses_floor() {
        let (layout, _) = make(0);
        assert_eq!(layout.capacity(), 16 * 4);
        assert!(layout.subtable(0).is_some_and(|t| t.len() == 16));
        assert!(layout.subtable(1).is_none());
    }

    #[test]
    fn test_capacity_hint_sizing() {
        let (layout, _) = make(1000);
        // 1000 * 1.1 / 4 = 275 buckets
        assert_eq!(layout.subtable(0).unwrap().len(), 275);
        assert_eq!(layout.capacity(), 275 * 4);
    }

    #[test]
    fn test_positions_in_range() {
        let (layout, scheme) = make(1000);
        let buckets = layout.subtable(0).unwrap().len();
        for key in 0u64..2000 {
            let h = scheme.hash(&key);
            for i in 0..2 {
                let pos = layout.position(&h, i);
                assert_eq!(pos.table, 0);
                assert!(pos.index < buckets);
            }
        }
    }

    #[test]
    fn test_growth_rehomes_elements() {
        let (mut layout, scheme) = make(0);
        let initial = layout.capacity();
        let mut placed_keys: Vec<u64> = Vec::new();

        // drive elements straight through the layout until it grows;
        // skip keys whose candidates are both full (no displacement
        // machinery at this level)
        for key in 1u64..=1000 {
            if placed_keys.len() > 70 {
                break;
            }
            let h = scheme.hash(&key);
            let mut placed = false;
            for i in 0..2 {
                let pos = layout.position(&h, i);
                if layout.bucket_mut(pos).insert(key, key * 10) {
                    placed = true;
                    break;
                }
            }
            if !placed {
                continue;
            }
            placed_keys.push(key);
            let spill = layout.on_insert_success(&h, placed_keys.len(), |k| scheme.hash(k));
            for slot in &spill {
                // no walk at this level; drop a spilled element if both
                // of its candidates are full again
                let h = scheme.hash(&slot.key);
                let ok = (0..2).any(|i| {
                    let pos = layout.position(&h, i);
                    layout.bucket_mut(pos).insert(slot.key, slot.data)
                });
                if !ok {
                    placed_keys.retain(|&k| k != slot.key);
                }
            }

            for &probe in &placed_keys {
                let h = scheme.hash(&probe);
                let found = (0..2).any(|i| {
                    let pos = layout.position(&h, i);
                    layout.bucket(pos).find(&probe) == Some(probe * 10)
                });
                assert!(found, "key {probe} lost after inserting {key}");
            }
        }

        assert!(layout.capacity() > initial, "layout never grew");
        assert!(placed_keys.len() > 70);
    }
}
