//! cuckoo-core: bucketed multi-hash cuckoo dictionary.
//!
//! This crate provides an in-memory map built on a cuckoo hash table
//! with bucketed cells: each key hashes to `NH` candidate buckets of
//! `BS` slots each, collisions are resolved by evicting incumbents
//! toward their alternate homes (a bounded random walk), and tables
//! grow incrementally by migrating one bucket array at a time. The
//! combination sustains load factors of 0.9 and above at O(1) expected
//! cost per operation.
//!
//! - **Bucket**: fixed-capacity left-packed slot group
//! - **Hashing**: one keyed 64-bit hash, split into `(tab, loc)`
//!   coordinate pairs
//! - **Displacement**: seeded random walk with full undo on failure
//! - **Layouts**: flat, homogeneous two-level, independent two-level
//! - **Core**: orchestration, element count, chain-length histogram
//!
//! # Architecture
//!
//! ```text
//!               +----------------------------+
//!               |        CuckooTable         |
//!               | (count, histogram, walk)   |
//!               +-------------+--------------+
//!                             |
//!                   hash -> (tab, loc) x NH
//!                             |
//!               +-------------v--------------+
//!               |           Layout           |
//!               |  flat | lockstep | anchored|
//!               +-------------+--------------+
//!                             |
//!                  +----------+----------+
//!                  v          v          v
//!              [Bucket]   [Bucket]   [Bucket]    x sub-tables
//!               BS slots, left-packed, empty-key sentinel
//! ```
//!
//! # Example
//!
//! ```
//! use cuckoo_core::{FlatTable, TableConfig};
//!
//! let mut table = FlatTable::<u64, u64>::new(
//!     TableConfig::new().with_capacity(1024).with_seed(42),
//! );
//!
//! assert!(table.insert(7, 700));
//! assert!(!table.insert(7, 999)); // duplicate, original kept
//! assert_eq!(table.get(&7), Some(700));
//! assert!(table.remove(&7));
//! assert_eq!(table.get(&7), None);
//! ```
//!
//! The container is single-threaded: all mutation goes through
//! `&mut self`, and growth runs synchronously under the insert that
//! triggered it. The default-constructed key is reserved to mark empty
//! slots and cannot be stored.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod bucket;
mod config;
mod displace;
mod error;
mod flat;
mod hash;
mod histogram;
mod homogeneous;
mod independent;
mod layout;
mod split;
mod table;

pub use bucket::{Bucket, Slot, TableData, TableKey};
pub use config::{TableConfig, DEFAULT_HASH_SEED};
pub use displace::{RandomWalk, MAX_HASHES};
pub use error::{TableError, TableResult};
pub use flat::FlatLayout;
pub use hash::{Ahash64, Hash64, Mix64};
pub use histogram::ChainHistogram;
pub use homogeneous::HomogeneousLayout;
pub use independent::IndependentLayout;
pub use layout::{BucketPos, Layout};
pub use split::{HashCoords, HashScheme, SplitHash, SplitScheme, WideHash, WideScheme};
pub use table::{CuckooTable, FlatTable, HomogeneousTable, IndependentTable};
