//! Batch Monte Carlo integration tests.

use proptest::prelude::*;
use snackmarket_core::catalog::{ENERGY_DRINK, TRIANGLE_KIMBAP};
use snackmarket_core::{MarketConfig, PriceSimulator, Product, VolatilityClass};
use snackmarket_runner::batch::run_seed;
use snackmarket_runner::{run_batch, BatchConfig};

#[test]
fn batch_is_reproducible() {
    let sim = PriceSimulator::default();
    let config = BatchConfig { runs: 40, seed: 123 };
    assert_eq!(run_batch(&sim, &config).unwrap(), run_batch(&sim, &config).unwrap());
}

#[test]
fn batch_is_independent_of_thread_count() {
    let sim = PriceSimulator::default();
    let config = BatchConfig { runs: 16, seed: 7 };

    let single = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
    let a = single.install(|| run_batch(&sim, &config).unwrap());
    let b = run_batch(&sim, &config).unwrap();
    assert_eq!(a, b);
}

#[test]
fn each_run_equals_a_plain_seeded_run() {
    let sim = PriceSimulator::default();
    let result = run_batch(&sim, &BatchConfig { runs: 3, seed: 99 }).unwrap();
    for (i, seed) in result.run_seeds.iter().enumerate() {
        assert_eq!(*seed, run_seed(99, i));
    }
    let closes: Vec<f64> = result
        .run_seeds
        .iter()
        .map(|&s| sim.run_with_seed(s).row(sim.days(), TRIANGLE_KIMBAP).unwrap().price_end)
        .collect();
    let kimbap = &result.products[0];
    assert_eq!(kimbap.product, TRIANGLE_KIMBAP);
    let max = closes.iter().copied().fold(f64::MIN, f64::max);
    assert_eq!(kimbap.max, max);
}

#[test]
fn volatile_products_spread_wider_than_stable() {
    let sim = PriceSimulator::default();
    let result = run_batch(&sim, &BatchConfig { runs: 300, seed: 1 }).unwrap();
    let spread = |name: &str| {
        let d = result.products.iter().find(|d| d.product == name).unwrap();
        (d.p90 - d.p10) / d.baseline
    };
    assert!(spread(ENERGY_DRINK) > spread(TRIANGLE_KIMBAP));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn floor_counts_bounded_by_runs(runs in 1usize..20, seed in any::<u64>()) {
        let gum = Product::new("Gum", 2.0, VolatilityClass::Volatile);
        let config = MarketConfig::new(10, vec![gum]).with_price_floor(1.9);
        let sim = PriceSimulator::new(config).unwrap();
        let result = run_batch(&sim, &BatchConfig { runs, seed }).unwrap();
        let d = &result.products[0];
        prop_assert!(d.floor_hit_runs <= runs);
        prop_assert!(d.min >= 1.9);
    }
}
