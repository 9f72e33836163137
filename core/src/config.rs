//! Construction-time configuration.

/// Default seed for the table's hash functions.
///
/// Hash seeding is separate from the walk seed on purpose: migration
/// must recompute the same hashes across the whole life of the table,
/// while the walk RNG advances freely.
pub const DEFAULT_HASH_SEED: u64 = 0x8A5C_D789_635D_2DFF;

/// Configuration for a cuckoo table.
///
/// `size_constraint` is the capacity inflation factor `alpha`: grown
/// tables are sized to roughly `alpha` slots per stored element. The
/// derived growth threshold factor `beta = (alpha + 1) / 2` splits the
/// difference between "full" and the target inflation.
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Expected number of elements; the initial table is sized for it.
    /// Zero is legal and grows on demand.
    pub capacity: usize,

    /// Capacity inflation factor `alpha` (≥ 1.0). Values close to 1.0
    /// give high load factors and longer displacement chains.
    pub size_constraint: f64,

    /// Step budget for one random-walk displacement before insert
    /// reports failure.
    pub displacement_steps: usize,

    /// Seed for the displacement RNG. Two tables with equal seeds and
    /// equal operation sequences behave identically.
    pub seed: u64,

    /// Seed for the hash functions.
    pub hash_seed: u64,
}

impl TableConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the capacity hint.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the capacity inflation factor `alpha`, clamped to `[1.0, 8.0]`.
    pub fn with_size_constraint(mut self, alpha: f64) -> Self {
        self.size_constraint = alpha.clamp(1.0, 8.0);
        self
    }

    /// Set the displacement step budget.
    pub fn with_displacement_steps(mut self, steps: usize) -> Self {
        self.displacement_steps = steps;
        self
    }

    /// Set the displacement RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the hash-function seed.
    pub fn with_hash_seed(mut self, seed: u64) -> Self {
        self.hash_seed = seed;
        self
    }

    /// Growth threshold factor `beta = (alpha + 1) / 2`.
    #[inline]
    pub fn beta(&self) -> f64 {
        (self.size_constraint + 1.0) / 2.0
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            capacity: 0,
            size_constraint: 1.1,
            displacement_steps: 256,
            seed: 0,
            hash_seed: DEFAULT_HASH_SEED,
        }
    }
}
