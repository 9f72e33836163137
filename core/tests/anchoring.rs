//! Anchoring property of the independent layout: every candidate
//! bucket of a key lives in the sub-table named by the key's first
//! hash coordinate, so per-sub-table growth can never strand a key.

use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use cuckoo_core::{IndependentTable, TableConfig};

#[test]
fn test_candidates_stay_in_anchor_subtable() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
    let mut table = IndependentTable::<u64, u64, 4>::new(TableConfig::new());

    let mut keys = Vec::with_capacity(10_000);
    while keys.len() < 10_000 {
        let key: u64 = rng.random();
        if key == 0 {
            continue;
        }
        if table.insert(key, key) {
            keys.push(key);
        }
    }

    for &key in &keys {
        let positions = table.candidate_positions(&key);
        assert_eq!(positions.len(), 2);
        let anchor = positions[0].table;
        assert!(anchor < 4);
        assert!(
            positions.iter().all(|p| p.table == anchor),
            "key {key} has candidates outside its anchor sub-table"
        );
    }
}

#[test]
fn test_anchoring_survives_growth() {
    let mut table = IndependentTable::<u64, u64, 4>::new(TableConfig::new());

    // enough sequential keys to grow several sub-tables
    for k in 1..=10_000u64 {
        assert!(table.insert(k, k));
    }

    for k in 1..=10_000u64 {
        let positions = table.candidate_positions(&k);
        let anchor = positions[0].table;
        assert!(positions.iter().all(|p| p.table == anchor));

        // the key is physically findable inside its anchor sub-table
        let subtable = table.subtable(anchor).unwrap();
        let found = positions
            .iter()
            .any(|p| subtable[p.index].find(&k) == Some(k));
        assert!(found, "key {k} not at any candidate in its anchor");
    }
}

#[test]
fn test_keys_spread_across_subtables() {
    let mut table = IndependentTable::<u64, u64, 4>::new(TableConfig::new());
    let mut stored = 0usize;
    for k in 1..=4000u64 {
        if table.insert(k, k) {
            stored += 1;
        }
    }

    let mut per_table = [0usize; 4];
    for t in 0..4 {
        for bucket in table.subtable(t).unwrap() {
            per_table[t] += bucket.slots().iter().filter(|s| !s.is_empty()).count();
        }
    }
    assert_eq!(per_table.iter().sum::<usize>(), stored);
    assert!(stored > 3900, "too many inserts failed: {stored}");
    for (t, &count) in per_table.iter().enumerate() {
        assert!(
            count > 700,
            "sub-table {t} holds {count} of {stored} keys, distribution skewed"
        );
    }
}
