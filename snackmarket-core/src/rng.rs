//! Deterministic RNG hierarchy.
//!
//! A master seed generates deterministic sub-seeds per product (for a single
//! run) and per iteration (for a batch of runs). Sub-seeds are derived via
//! BLAKE3 hashing, so a product's path never depends on catalog order, on the
//! other products present, or on thread scheduling.

use rand::rngs::StdRng;
use rand::SeedableRng;

const PRODUCT_DOMAIN: &[u8] = b"snackmarket/product";
const ITERATION_DOMAIN: &[u8] = b"snackmarket/iteration";

/// Deterministic RNG hierarchy rooted at one master seed.
#[derive(Debug, Clone, Copy)]
pub struct RngHierarchy {
    master_seed: u64,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Sub-seed for one product's price path.
    pub fn product_seed(&self, product: &str) -> u64 {
        self.derive(PRODUCT_DOMAIN, product.as_bytes())
    }

    /// Master seed for iteration `i` of a batch rooted at this seed.
    pub fn iteration_seed(&self, iteration: u64) -> u64 {
        self.derive(ITERATION_DOMAIN, &iteration.to_le_bytes())
    }

    /// Seeded StdRng for one product's price path.
    pub fn rng_for_product(&self, product: &str) -> StdRng {
        StdRng::seed_from_u64(self.product_seed(product))
    }

    fn derive(&self, domain: &[u8], key: &[u8]) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(domain);
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(key);
        let hash = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(head)
    }
}
