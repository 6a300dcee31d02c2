//! Batch Monte Carlo: many independent runs of one market, in parallel.
//!
//! Run `i` is seeded from `(batch seed, i)` through the RNG hierarchy, so a
//! batch is reproducible regardless of how rayon schedules the work.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use snackmarket_core::rng::RngHierarchy;
use snackmarket_core::{PriceSimulator, PriceTable};
use thiserror::Error;
use tracing::info;

use crate::metrics::PathStats;

/// Configuration for a batch of simulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of independent runs.
    pub runs: usize,
    /// Root seed of the batch.
    pub seed: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { runs: 100, seed: 42 }
    }
}

/// Distribution of one product's final close across a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDistribution {
    pub product: String,
    pub baseline: f64,
    pub mean: f64,
    pub p10: f64,
    pub median: f64,
    pub p90: f64,
    pub min: f64,
    pub max: f64,
    /// Mean of the per-run total returns.
    pub mean_return: f64,
    /// Mean of the per-run maximum drawdowns.
    pub mean_drawdown: f64,
    /// Runs in which the close hit the price floor at least once.
    pub floor_hit_runs: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub config: BatchConfig,
    /// Master seed of each run, in run order.
    pub run_seeds: Vec<u64>,
    pub products: Vec<ProductDistribution>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("a batch needs at least one run")]
    NoRuns,
}

/// Master seed of run `index` in a batch rooted at `seed`.
pub fn run_seed(seed: u64, index: usize) -> u64 {
    RngHierarchy::new(seed).iteration_seed(index as u64)
}

/// Run `config.runs` simulations in parallel and summarize each product.
pub fn run_batch(sim: &PriceSimulator, config: &BatchConfig) -> Result<BatchResult, BatchError> {
    if config.runs == 0 {
        return Err(BatchError::NoRuns);
    }

    let run_seeds: Vec<u64> = (0..config.runs).map(|i| run_seed(config.seed, i)).collect();
    let floor = sim.config().price_floor;

    let per_run: Vec<Vec<PathStats>> = run_seeds
        .par_iter()
        .map(|&seed| {
            let table: PriceTable = sim.run_with_seed(seed);
            PathStats::for_table(&table, sim.events(), floor)
        })
        .collect();

    let products = sim
        .products()
        .iter()
        .enumerate()
        .map(|(idx, product)| {
            let stats: Vec<&PathStats> = per_run.iter().map(|run| &run[idx]).collect();
            summarize(&product.name, product.baseline_price, &stats)
        })
        .collect();

    info!(runs = config.runs, seed = config.seed, "batch complete");

    Ok(BatchResult { config: *config, run_seeds, products })
}

fn summarize(product: &str, baseline: f64, stats: &[&PathStats]) -> ProductDistribution {
    let n = stats.len() as f64;
    let mut closes: Vec<f64> = stats.iter().map(|s| s.close).collect();
    closes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    ProductDistribution {
        product: product.to_string(),
        baseline,
        mean: closes.iter().sum::<f64>() / n,
        p10: percentile_sorted(&closes, 10.0),
        median: percentile_sorted(&closes, 50.0),
        p90: percentile_sorted(&closes, 90.0),
        min: closes.first().copied().unwrap_or(0.0),
        max: closes.last().copied().unwrap_or(0.0),
        mean_return: stats.iter().map(|s| s.total_return).sum::<f64>() / n,
        mean_drawdown: stats.iter().map(|s| s.max_drawdown).sum::<f64>() / n,
        floor_hit_runs: stats.iter().filter(|s| s.floor_days > 0).count(),
    }
}

/// Linear-interpolated percentile (`p` in 0..=100) of an ascending slice.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_runs_rejected() {
        let sim = PriceSimulator::default();
        let err = run_batch(&sim, &BatchConfig { runs: 0, seed: 1 }).unwrap_err();
        assert_eq!(err, BatchError::NoRuns);
    }

    #[test]
    fn percentile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile_sorted(&v, 0.0), 1.0);
        assert_eq!(percentile_sorted(&v, 50.0), 3.0);
        assert_eq!(percentile_sorted(&v, 100.0), 5.0);
        assert!((percentile_sorted(&v, 10.0) - 1.4).abs() < 1e-12);
        assert_eq!(percentile_sorted(&[], 50.0), 0.0);
        assert_eq!(percentile_sorted(&[7.0], 90.0), 7.0);
    }

    #[test]
    fn distribution_is_ordered() {
        let sim = PriceSimulator::default();
        let result = run_batch(&sim, &BatchConfig { runs: 25, seed: 9 }).unwrap();
        assert_eq!(result.products.len(), sim.products().len());
        assert_eq!(result.run_seeds.len(), 25);
        for d in &result.products {
            assert!(d.min <= d.p10 && d.p10 <= d.median);
            assert!(d.median <= d.p90 && d.p90 <= d.max);
            assert!(d.min <= d.mean && d.mean <= d.max);
            assert!(d.mean_drawdown <= 0.0);
        }
    }

    #[test]
    fn run_seeds_are_distinct() {
        let seeds: std::collections::HashSet<u64> = (0..100).map(|i| run_seed(5, i)).collect();
        assert_eq!(seeds.len(), 100);
    }
}
